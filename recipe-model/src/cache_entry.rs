//! The cache store's value type.

use serde::{Deserialize, Serialize};

/// A previously transformed result, keyed externally by fingerprint.
///
/// Owned by the cache store; each write increments `version` and refreshes
/// `last_updated_at` while preserving `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub fingerprint: String,
    pub source_url: String,
    /// Present iff `valid`.
    pub recipe_yaml: Option<String>,
    pub valid: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_updated_at: chrono::DateTime<chrono::Utc>,
    pub version: u64,
}

impl CachedEntry {
    /// Builds the first version of an entry for a brand-new fingerprint.
    pub fn new_valid(fingerprint: String, source_url: String, recipe_yaml: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            fingerprint,
            source_url,
            recipe_yaml: Some(recipe_yaml),
            valid: true,
            created_at: now,
            last_updated_at: now,
            version: 1,
        }
    }

    /// Builds the first version of an invalid-recipe memoization entry.
    pub fn new_invalid(fingerprint: String, source_url: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            fingerprint,
            source_url,
            recipe_yaml: None,
            valid: false,
            created_at: now,
            last_updated_at: now,
            version: 1,
        }
    }

    /// Produces the next version of this entry, preserving `created_at`.
    pub fn next_version(&self, recipe_yaml: Option<String>, valid: bool) -> Self {
        Self {
            fingerprint: self.fingerprint.clone(),
            source_url: self.source_url.clone(),
            recipe_yaml,
            valid,
            created_at: self.created_at,
            last_updated_at: chrono::Utc::now(),
            version: self.version + 1,
        }
    }
}
