//! Canonical recipe record and its YAML round-trip.
//!
//! This crate owns the data model described in the service's design
//! document: [`Recipe`] and its nested types, the [`CachedEntry`] cache
//! value, and the [`codec`] that maps between the in-memory record and its
//! line-oriented YAML text form.

pub mod cache_entry;
pub mod codec;
pub mod duration;
pub mod recipe;

pub use cache_entry::CachedEntry;
pub use codec::{parse_file, parse_reader, parse_str, serialize, validate, CodecError, SchemaViolation};
pub use recipe::{
    CoverImage, Difficulty, Equipment, Ingredient, Instruction, Media, Nutrition, Recipe,
    RecipeMetadata, Storage, Substitution,
};

/// Schema version emitted by this crate's serializer.
pub const SCHEMA_VERSION: &str = "1.0.0";
