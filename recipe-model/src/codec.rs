//! Deterministic bidirectional mapping between [`Recipe`] and its
//! line-oriented YAML text form, plus structural validation.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::duration;
use crate::recipe::{Media, Recipe};

const MAX_EXCERPT: usize = 500;

/// A single structural-validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub field: String,
    pub reason: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed recipe at {line}:{column}: {excerpt}")]
    Malformed {
        line: usize,
        column: usize,
        excerpt: String,
    },
    #[error("schema violation: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Schema(Vec<SchemaViolation>),
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Parses a recipe from a YAML string.
pub fn parse_str(text: &str) -> Result<Recipe, CodecError> {
    let recipe: Recipe = serde_yaml::from_str(text).map_err(|e| malformed(e, text))?;
    validate(&recipe).map_err(CodecError::Schema)?;
    Ok(recipe)
}

/// Parses a recipe from anything implementing [`Read`].
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Recipe, CodecError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_str(&text)
}

/// Parses a recipe from a file on disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Recipe, CodecError> {
    let text = std::fs::read_to_string(path)?;
    parse_str(&text)
}

fn malformed(err: serde_yaml::Error, source: &str) -> CodecError {
    let (line, column) = err
        .location()
        .map(|l| (l.line(), l.column()))
        .unwrap_or((0, 0));
    let excerpt: String = source.chars().take(MAX_EXCERPT).collect();
    CodecError::Malformed {
        line,
        column,
        excerpt,
    }
}

/// Serializes a recipe to its canonical YAML form.
///
/// No document-start marker is emitted; key ordering follows each
/// record's declaration order since that's `serde_yaml`'s default for
/// structs. `parse(serialize(r)) == r` for all valid `r`.
pub fn serialize(recipe: &Recipe) -> Result<String, CodecError> {
    serde_yaml::to_string(recipe).map_err(|e| CodecError::Serialize(e.to_string()))
}

static SEMVER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"));

/// Runs structural validation against the schema described in the design
/// document. Returns every violation found rather than stopping at the
/// first one, so callers (notably the LLM orchestrator's retry prompt)
/// can report everything wrong at once.
pub fn validate(recipe: &Recipe) -> Result<(), Vec<SchemaViolation>> {
    let mut violations = Vec::new();

    if !SEMVER_RE.is_match(&recipe.schema_version) {
        violations.push(SchemaViolation {
            field: "schema_version".to_string(),
            reason: "must match MAJOR.MINOR.PATCH".to_string(),
        });
    }
    if !SEMVER_RE.is_match(&recipe.recipe_version) {
        violations.push(SchemaViolation {
            field: "recipe_version".to_string(),
            reason: "must match MAJOR.MINOR.PATCH".to_string(),
        });
    }
    if recipe.metadata.title.trim().is_empty() {
        violations.push(SchemaViolation {
            field: "metadata.title".to_string(),
            reason: "must not be blank".to_string(),
        });
    }
    if let Some(servings) = recipe.metadata.servings {
        if servings < 1 {
            violations.push(SchemaViolation {
                field: "metadata.servings".to_string(),
                reason: "must be >= 1 when present".to_string(),
            });
        }
    }
    for (field, value) in [
        ("metadata.prep_time", &recipe.metadata.prep_time),
        ("metadata.cook_time", &recipe.metadata.cook_time),
        ("metadata.total_time", &recipe.metadata.total_time),
    ] {
        if let Some(v) = value {
            if !duration::is_valid(v) {
                violations.push(SchemaViolation {
                    field: field.to_string(),
                    reason: "must match (Nd )?(Nh )?(Nm)?".to_string(),
                });
            }
        }
    }
    if recipe.is_recipe {
        if recipe.ingredients.is_empty() {
            violations.push(SchemaViolation {
                field: "ingredients".to_string(),
                reason: "non-empty required when is_recipe is true".to_string(),
            });
        }
        if recipe.instructions.is_empty() {
            violations.push(SchemaViolation {
                field: "instructions".to_string(),
                reason: "non-empty required when is_recipe is true".to_string(),
            });
        }
        for (i, instruction) in recipe.instructions.iter().enumerate() {
            let expected = (i + 1) as u32;
            if instruction.step != expected {
                violations.push(SchemaViolation {
                    field: format!("instructions[{i}].step"),
                    reason: format!("expected step {expected}, found {}", instruction.step),
                });
            }
        }
        for (i, instruction) in recipe.instructions.iter().enumerate() {
            if let Some(time) = &instruction.time {
                if !duration::is_valid(time) {
                    violations.push(SchemaViolation {
                        field: format!("instructions[{i}].time"),
                        reason: "must match (Nd )?(Nh )?(Nm)?".to_string(),
                    });
                }
            }
            for (j, media) in instruction.media.iter().flatten().enumerate() {
                if let Media::Video { duration: Some(duration), .. } = media {
                    if !duration::is_valid_timestamp(duration) {
                        violations.push(SchemaViolation {
                            field: format!("instructions[{i}].media[{j}].duration"),
                            reason: "must match MM:SS".to_string(),
                        });
                    }
                }
            }
        }
    }

    if let Some(nutrition) = &recipe.nutrition {
        for (field, value) in [
            ("nutrition.protein", nutrition.protein),
            ("nutrition.carbohydrates", nutrition.carbohydrates),
            ("nutrition.fat", nutrition.fat),
            ("nutrition.fiber", nutrition.fiber),
            ("nutrition.sugar", nutrition.sugar),
            ("nutrition.sodium", nutrition.sodium),
        ] {
            if value.is_some_and(|v| v < 0.0) {
                violations.push(SchemaViolation {
                    field: field.to_string(),
                    reason: "must be >= 0 when present".to_string(),
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
