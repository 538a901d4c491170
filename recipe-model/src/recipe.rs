//! The canonical recipe record.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Coerces an empty string to `None` for optional scalar fields, on top
/// of serde's usual "field absent" handling (hence the paired
/// `#[serde(default, ...)]` everywhere this is used) — upstream
/// extractors often emit `""` rather than omitting the field entirely.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// The root record produced by the extraction pipeline.
///
/// `is_recipe = false` means the source was classified as non-recipe
/// content; in that case the remaining fields may be empty and callers
/// must not assume `ingredients`/`instructions` are populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recipe {
    pub is_recipe: bool,
    pub schema_version: String,
    pub recipe_version: String,
    pub metadata: RecipeMetadata,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub notes: String,
    pub storage: Option<Storage>,
}

/// A single piece of equipment, kept as a plain string per the spec.
pub type Equipment = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecipeMetadata {
    pub title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub author: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    pub date_created: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub servings: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub prep_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub cook_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub total_time: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub cover_image: Option<CoverImage>,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverImage {
    pub path: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ingredient {
    pub item: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub optional: bool,
    pub substitutions: Option<Vec<Substitution>>,
    #[serde(default = "default_component")]
    pub component: String,
}

fn default_component() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Substitution {
    pub item: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub ratio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Instruction {
    pub step: u32,
    pub description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub temperature: Option<String>,
    pub media: Option<Vec<Media>>,
}

/// Polymorphic media attached to an instruction step.
///
/// Modeled as a tagged variant rather than an open class hierarchy, per
/// the design note in the specification: the `type` discriminator is
/// mandatory on both serialization and deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Media {
    Image { path: String, alt: String },
    Video {
        path: String,
        #[serde(default, deserialize_with = "empty_string_as_none")]
        thumbnail: Option<String>,
        #[serde(default, deserialize_with = "empty_string_as_none")]
        duration: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Nutrition {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub serving_size: Option<String>,
    pub calories: Option<u32>,
    pub protein: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Storage {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub refrigerator: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub freezer: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub room_temperature: Option<String>,
}
