use async_trait::async_trait;
use recipe_model::CachedEntry;

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;

/// Maps a request fingerprint to a previously produced cached entry, and
/// is the single authority backing the single-flight registry's published
/// results.
///
/// Implementations must be cheap to clone (an `Arc` handle to shared
/// state) since every request holds its own handle.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedEntry>, CacheError>;

    async fn store_valid(
        &self,
        fingerprint: &Fingerprint,
        source_url: &str,
        recipe_yaml: String,
    ) -> Result<(), CacheError>;

    async fn store_invalid(
        &self,
        fingerprint: &Fingerprint,
        source_url: &str,
    ) -> Result<(), CacheError>;

    async fn exists(&self, fingerprint: &Fingerprint) -> Result<bool, CacheError>;

    async fn delete(&self, fingerprint: &Fingerprint) -> Result<(), CacheError>;

    async fn count(&self) -> Result<usize, CacheError>;
}
