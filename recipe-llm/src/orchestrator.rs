//! The validation-driven retry state machine described by the design
//! document's `IDLE -> BUILDING_PROMPT -> CALLING_MODEL -> PARSING ->
//! VALIDATING` loop.

use std::sync::Arc;

use recipe_model::{Recipe, SchemaViolation};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::OrchestratorError;
use crate::model::{GenerateRequest, GenerativeModel};
use crate::prompt;
use crate::schema::recipe_json_schema;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    /// Max validation-driven retries per request (default 1, per the
    /// design document's `llm.retry_budget`).
    pub retry_budget: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 1.0,
            max_output_tokens: 4096,
            retry_budget: 1,
        }
    }
}

/// The outcome of a `transform` call, carrying the raw model text for
/// debugging regardless of which variant it produced.
#[derive(Debug, Clone)]
pub enum Response {
    Recipe(Box<Recipe>, String),
    Recipes(Vec<Recipe>, String),
    NotRecipe(String),
}

pub struct Orchestrator {
    model: Arc<dyn GenerativeModel>,
    config: OrchestratorConfig,
    schema_json: Value,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn GenerativeModel>, config: OrchestratorConfig) -> Self {
        let schema_json = recipe_json_schema();
        Self {
            model,
            config,
            schema_json,
        }
    }

    /// Turns a cleaned HTML fragment into a validated [`Response`],
    /// retrying on schema violation up to `retry_budget` times.
    pub async fn transform(
        &self,
        cleaned_html: &str,
        _source_url: &str,
    ) -> Result<Response, OrchestratorError> {
        let schema_str = serde_json::to_string(&self.schema_json)
            .expect("schemars output serializes to a string");

        let mut retry_feedback: Vec<SchemaViolation> = Vec::new();
        let mut attempt = 0u32;

        loop {
            let prompt_parts = prompt::build(cleaned_html, &schema_str, &retry_feedback);

            let request = GenerateRequest {
                prompt_parts,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                max_tokens: self.config.max_output_tokens,
                response_schema: self.schema_json.clone(),
            };

            let response = self.model.generate(request).await?;

            match parse_and_validate(&response.text) {
                Ok(outcome) => {
                    info!(attempt, "model response validated successfully");
                    return Ok(outcome);
                }
                Err(ParseOrValidate::Unparseable(msg)) => {
                    return Err(OrchestratorError::Unparseable(msg));
                }
                Err(ParseOrValidate::Violations(violations)) => {
                    warn!(attempt, violations = ?violations, "model response failed validation");
                    if attempt >= self.config.retry_budget {
                        return Err(OrchestratorError::TransformationFailed { violations });
                    }
                    retry_feedback = violations;
                    attempt += 1;
                }
            }
        }
    }
}

enum ParseOrValidate {
    Unparseable(String),
    Violations(Vec<SchemaViolation>),
}

fn parse_and_validate(text: &str) -> Result<Response, ParseOrValidate> {
    let value: Value =
        serde_json::from_str(text.trim()).map_err(|e| ParseOrValidate::Unparseable(e.to_string()))?;

    match value {
        Value::Array(items) => {
            let mut recipes = Vec::with_capacity(items.len());
            for item in items {
                let recipe: Recipe = serde_json::from_value(item)
                    .map_err(|e| ParseOrValidate::Unparseable(e.to_string()))?;
                recipe_model::validate(&recipe).map_err(ParseOrValidate::Violations)?;
                recipes.push(recipe);
            }
            Ok(Response::Recipes(recipes, text.to_string()))
        }
        single => {
            let recipe: Recipe = serde_json::from_value(single)
                .map_err(|e| ParseOrValidate::Unparseable(e.to_string()))?;
            if !recipe.is_recipe {
                return Ok(Response::NotRecipe(text.to_string()));
            }
            recipe_model::validate(&recipe).map_err(ParseOrValidate::Violations)?;
            Ok(Response::Recipe(Box::new(recipe), text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::ModelError;
    use crate::model::GenerateResponse;

    struct ScriptedModel {
        responses: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, ModelError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            let text = self.responses[idx.min(self.responses.len() - 1)].to_string();
            Ok(GenerateResponse {
                text,
                raw_bytes: Vec::new(),
            })
        }
    }

    const VALID_RECIPE: &str = r#"{
        "is_recipe": true, "schema_version": "1.0.0", "recipe_version": "1.0.0",
        "metadata": {"title": "Soup", "source": null, "author": null, "language": "en",
                     "date_created": null, "category": [], "tags": [], "servings": 2,
                     "prep_time": null, "cook_time": null, "total_time": null,
                     "difficulty": "easy", "cover_image": null},
        "description": "", "ingredients": [{"item": "water", "amount": null, "unit": null,
        "notes": null, "optional": false, "substitutions": null, "component": "main"}],
        "equipment": [], "instructions": [{"step": 1, "description": "Boil.", "time": null,
        "temperature": null, "media": null}], "nutrition": null, "notes": "", "storage": null
    }"#;

    const NOT_RECIPE: &str = r#"{
        "is_recipe": false, "schema_version": "1.0.0", "recipe_version": "1.0.0",
        "metadata": {"title": "", "source": null, "author": null, "language": "en",
                     "date_created": null, "category": [], "tags": [], "servings": null,
                     "prep_time": null, "cook_time": null, "total_time": null,
                     "difficulty": "medium", "cover_image": null},
        "description": "", "ingredients": [], "equipment": [], "instructions": [],
        "nutrition": null, "notes": "", "storage": null
    }"#;

    const INVALID_THEN_VALID: [&str; 2] = [
        r#"{
            "is_recipe": true, "schema_version": "1.0.0", "recipe_version": "1.0.0",
            "metadata": {"title": "Soup", "source": null, "author": null, "language": "en",
                         "date_created": null, "category": [], "tags": [], "servings": null,
                         "prep_time": null, "cook_time": null, "total_time": null,
                         "difficulty": "easy", "cover_image": null},
            "description": "", "ingredients": [], "equipment": [], "instructions": [],
            "nutrition": null, "notes": "", "storage": null
        }"#,
        VALID_RECIPE,
    ];

    #[tokio::test]
    async fn accepts_valid_recipe_on_first_try() {
        let model = Arc::new(ScriptedModel {
            responses: vec![VALID_RECIPE],
            calls: AtomicUsize::new(0),
        });
        let orchestrator = Orchestrator::new(model.clone(), OrchestratorConfig::default());
        let response = orchestrator.transform("<p>soup</p>", "https://ex/r1").await.unwrap();
        assert!(matches!(response, Response::Recipe(_, _)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn short_circuits_on_not_a_recipe() {
        let model = Arc::new(ScriptedModel {
            responses: vec![NOT_RECIPE],
            calls: AtomicUsize::new(0),
        });
        let orchestrator = Orchestrator::new(model, OrchestratorConfig::default());
        let response = orchestrator.transform("<p>blog post</p>", "https://ex/r2").await.unwrap();
        assert!(matches!(response, Response::NotRecipe(_)));
    }

    #[tokio::test]
    async fn retries_once_on_violation_then_succeeds() {
        let model = Arc::new(ScriptedModel {
            responses: INVALID_THEN_VALID.to_vec(),
            calls: AtomicUsize::new(0),
        });
        let orchestrator = Orchestrator::new(model.clone(), OrchestratorConfig::default());
        let response = orchestrator.transform("<p>soup</p>", "https://ex/r3").await.unwrap();
        assert!(matches!(response, Response::Recipe(_, _)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausts_retry_budget_and_fails() {
        let model = Arc::new(ScriptedModel {
            responses: vec![INVALID_THEN_VALID[0]],
            calls: AtomicUsize::new(0),
        });
        let orchestrator = Orchestrator::new(
            model.clone(),
            OrchestratorConfig {
                retry_budget: 1,
                ..OrchestratorConfig::default()
            },
        );
        let result = orchestrator.transform("<p>soup</p>", "https://ex/r4").await;
        assert!(matches!(result, Err(OrchestratorError::TransformationFailed { .. })));
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }
}
