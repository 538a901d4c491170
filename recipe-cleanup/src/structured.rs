//! Strategy 1: structured-data (`schema.org/Recipe` JSON-LD) extraction.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::CleanupError;
use crate::strategy::{CleanupStrategy, StrategyName};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StructuredConfig {
    pub enabled: bool,
    pub min_completeness: u8,
}

impl Default for StructuredConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_completeness: 50,
        }
    }
}

pub struct StructuredDataStrategy {
    pub config: StructuredConfig,
}

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector"));

impl CleanupStrategy for StructuredDataStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::StructuredData
    }

    fn run(&self, html: &str) -> Result<Option<String>, CleanupError> {
        if !self.config.enabled {
            return Ok(None);
        }

        let document = Html::parse_document(html);
        let mut best: Option<(u8, Value)> = None;

        for script in document.select(&SCRIPT_SELECTOR) {
            let text: String = script.text().collect();
            let Ok(value) = serde_json::from_str::<Value>(&text) else {
                continue;
            };
            for candidate in recipe_candidates(&value) {
                let score = completeness(candidate);
                if score >= self.config.min_completeness {
                    // first candidate meeting the threshold wins
                    return Ok(Some(serde_json::to_string_pretty(candidate)?));
                }
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((score, candidate.clone()));
                }
            }
        }

        Ok(None)
    }
}

/// Walks a JSON-LD payload (possibly a single object, an array, or an
/// object with a `@graph` array) looking for entries whose `@type` is or
/// contains `"Recipe"`.
fn recipe_candidates(value: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_candidates(value, &mut out);
    out
}

fn collect_candidates<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_candidates(item, out);
            }
        }
        Value::Object(map) => {
            if is_recipe_type(value) {
                out.push(value);
            }
            if let Some(graph) = map.get("@graph") {
                collect_candidates(graph, out);
            }
        }
        _ => {}
    }
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Scores completeness on a 0-100 scale: 20 points each for `name`,
/// `recipeIngredient`, `recipeInstructions`; 10 each for `totalTime`,
/// `recipeYield`, `description`, `image`.
fn completeness(value: &Value) -> u8 {
    let mut score: u32 = 0;
    for key in ["name", "recipeIngredient", "recipeInstructions"] {
        if has_field(value, key) {
            score += 20;
        }
    }
    for key in ["totalTime", "recipeYield", "description", "image"] {
        if has_field(value, key) {
            score += 10;
        }
    }
    score.min(100) as u8
}

fn has_field(value: &Value, key: &str) -> bool {
    match value.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}
