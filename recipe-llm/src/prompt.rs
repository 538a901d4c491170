//! Prompt assembly: concatenates the fixed system instruction, an
//! exemplar recipe, the target JSON schema, the cleaned HTML fragment,
//! and — on retry — the prior validation errors.

use recipe_model::SchemaViolation;

const SYSTEM_PROMPT: &str = include_str!("../assets/system_prompt.md");
const EXEMPLAR_RECIPE: &str = include_str!("../assets/exemplar_recipe.yaml");

pub fn build(cleaned_html: &str, schema_json: &str, retry_feedback: &[SchemaViolation]) -> Vec<String> {
    let mut parts = vec![
        SYSTEM_PROMPT.to_string(),
        format!("Example of a valid recipe record, as YAML:\n\n{EXEMPLAR_RECIPE}"),
        format!("JSON schema the response must conform to:\n\n{schema_json}"),
        format!("Cleaned page fragment:\n\n{cleaned_html}"),
    ];

    if !retry_feedback.is_empty() {
        let joined = retry_feedback
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!(
            "Your previous response failed validation with these errors. Fix them and respond again:\n\n{joined}"
        ));
    }

    parts
}
