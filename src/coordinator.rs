//! End-to-end orchestration of a single `POST /recipe` request:
//! acquire HTML, fingerprint, consult the cache, clean, transform,
//! store, persist.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use recipe_cache::{CacheStore, Fingerprint, JoinOutcome, SingleFlight};
use recipe_filestore::FileStore;
use recipe_llm::{Orchestrator, Response as ModelResponse};
use recipe_model::CachedEntry;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CoordinatorError;
use crate::http_client::{decompress_html, fetch_html};

/// Joins multiple recipes' YAML documents into the single string
/// [`CachedEntry::recipe_yaml`] can carry, and splits it back apart on
/// cache hit. Not a valid multi-document YAML stream on purpose — each
/// document is re-parsed independently via `recipe_model::parse_str`.
const CACHED_YAML_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Auto,
    None,
}

impl Compression {
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("none") => Compression::None,
            _ => Compression::Auto,
        }
    }
}

pub struct RecipeRequest {
    pub identity: String,
    pub url: String,
    pub html: Option<String>,
    pub compression: Compression,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub url: String,
    pub title: String,
    pub is_recipe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_ref: Option<String>,
    /// The full set of file refs when a page yielded more than one
    /// recipe; absent when there was zero or one, so existing callers
    /// that only read `storage_ref` see no change in shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_warning: Option<String>,
}

/// Outcome of a completed (leader or cache-hit) transform, published to
/// any followers waiting on the same fingerprint. Public only because it
/// names the `SingleFlight` type parameter on [`Coordinator`]'s public
/// field; nothing outside this module constructs one.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    is_recipe: bool,
    recipe_yamls: Vec<String>,
}

pub struct Coordinator {
    pub cache: Arc<dyn CacheStore>,
    pub single_flight: Arc<SingleFlight<TransformOutcome>>,
    pub cleanup: Arc<recipe_cleanup::CleanupEngine>,
    pub orchestrator: Arc<Orchestrator>,
    pub filestore: Arc<dyn FileStore>,
    pub http_client: reqwest::Client,
    pub default_folder_name: String,
    pub cache_enabled: bool,
    pub cache_lookup_timeout: Duration,
    pub cache_save_timeout: Duration,
}

impl Coordinator {
    pub async fn handle(&self, request: RecipeRequest) -> Result<RecipeResponse, CoordinatorError> {
        if request.url.trim().is_empty() || request.title.trim().is_empty() {
            return Err(CoordinatorError::BadRequest(
                "url and title are required and must be non-blank".to_string(),
            ));
        }

        let fingerprint = Fingerprint::of_url(&request.url);

        if self.cache_enabled {
            match self.lookup_cache(&fingerprint).await {
                Some(entry) if entry.valid => {
                    return self.respond_from_cached_entry(&request, entry).await;
                }
                Some(_) => {
                    return Ok(RecipeResponse {
                        url: request.url,
                        title: request.title,
                        is_recipe: false,
                        storage_ref: None,
                        storage_refs: None,
                        storage_warning: None,
                    });
                }
                None => {}
            }
        }

        let outcome = match self.single_flight.join(fingerprint.clone()).await {
            JoinOutcome::Leader => {
                let result = self.build(&request, &fingerprint).await;
                match &result {
                    Ok(outcome) => self.single_flight.complete(fingerprint.clone(), outcome.clone()).await,
                    Err(_) => self.single_flight.abort(fingerprint.clone()).await,
                }
                result?
            }
            JoinOutcome::Follower(rx) => rx.await.map_err(|_| {
                CoordinatorError::Internal("single-flight leader aborted without a result".to_string())
            })?,
        };

        if !outcome.is_recipe {
            return Ok(RecipeResponse {
                url: request.url,
                title: request.title,
                is_recipe: false,
                storage_ref: None,
                storage_refs: None,
                storage_warning: None,
            });
        }

        self.persist(&request, outcome.recipe_yamls).await
    }

    /// Looks up the cache bounded by `cache_lookup_timeout`; a timeout or
    /// a backend error is treated the same as a miss, since the
    /// coordinator can always fall through to a fresh transform.
    async fn lookup_cache(&self, fingerprint: &Fingerprint) -> Option<CachedEntry> {
        match tokio::time::timeout(self.cache_lookup_timeout, self.cache.lookup(fingerprint)).await {
            Ok(Ok(entry)) => entry,
            Ok(Err(err)) => {
                warn!(error = %err, "cache lookup failed, proceeding as on miss");
                None
            }
            Err(_) => {
                warn!(timeout_ms = self.cache_lookup_timeout.as_millis(), "cache lookup timed out, treating as miss");
                None
            }
        }
    }

    async fn respond_from_cached_entry(
        &self,
        request: &RecipeRequest,
        entry: CachedEntry,
    ) -> Result<RecipeResponse, CoordinatorError> {
        let joined = entry
            .recipe_yaml
            .expect("cache entries marked valid always carry recipe_yaml");
        let recipe_yamls = split_cached_yaml(&joined);
        self.persist(request, recipe_yamls).await
    }

    /// Leader-only work: acquire HTML, clean, transform, store to cache.
    /// Does not persist to the FileStore — that happens for every
    /// caller (leader and followers alike) once the outcome is known,
    /// since each caller may carry a different `title`.
    async fn build(
        &self,
        request: &RecipeRequest,
        fingerprint: &Fingerprint,
    ) -> Result<TransformOutcome, CoordinatorError> {
        let html = self.acquire_html(request).await?;
        let report = self.cleanup.clean(&html);
        info!(
            winning_strategy = ?report.stats.winning_strategy,
            input_len = report.stats.input_len,
            output_len = report.stats.output_len,
            "cleanup finished"
        );

        let response = self
            .orchestrator
            .transform(&report.html, &request.url)
            .await?;

        let outcome = match response {
            ModelResponse::Recipe(recipe, _raw) => {
                let yaml = recipe_model::serialize(recipe.as_ref())
                    .map_err(|e| CoordinatorError::Internal(e.to_string()))?;
                self.store_cache_entry(fingerprint, &request.url, Some(yaml.clone())).await;
                TransformOutcome {
                    is_recipe: true,
                    recipe_yamls: vec![yaml],
                }
            }
            ModelResponse::Recipes(recipes, _raw) => {
                if recipes.is_empty() {
                    return Err(CoordinatorError::Internal(
                        "model returned an empty recipe array".to_string(),
                    ));
                }
                let yamls = recipes
                    .iter()
                    .map(|recipe| recipe_model::serialize(recipe))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| CoordinatorError::Internal(e.to_string()))?;
                let joined = yamls.join(CACHED_YAML_SEPARATOR);
                self.store_cache_entry(fingerprint, &request.url, Some(joined)).await;
                TransformOutcome {
                    is_recipe: true,
                    recipe_yamls: yamls,
                }
            }
            ModelResponse::NotRecipe(_raw) => {
                self.store_cache_entry(fingerprint, &request.url, None).await;
                TransformOutcome {
                    is_recipe: false,
                    recipe_yamls: Vec::new(),
                }
            }
        };

        Ok(outcome)
    }

    /// Stores the outcome bounded by `cache_save_timeout`; a timeout or
    /// backend error only costs a repeated transform on the next
    /// request for the same URL, so it's logged and swallowed.
    async fn store_cache_entry(&self, fingerprint: &Fingerprint, url: &str, recipe_yaml: Option<String>) {
        if !self.cache_enabled {
            return;
        }
        let stored = tokio::time::timeout(self.cache_save_timeout, async {
            match recipe_yaml {
                Some(yaml) => self.cache.store_valid(fingerprint, url, yaml).await,
                None => self.cache.store_invalid(fingerprint, url).await,
            }
        })
        .await;

        match stored {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "cache store failed; outcome was not memoized"),
            Err(_) => warn!(
                timeout_ms = self.cache_save_timeout.as_millis(),
                "cache store timed out; outcome was not memoized"
            ),
        }
    }

    async fn acquire_html(&self, request: &RecipeRequest) -> Result<String, CoordinatorError> {
        if let Some(html) = request.html.as_ref().filter(|h| !h.trim().is_empty()) {
            let decompressed = match request.compression {
                Compression::None => Ok(html.clone()),
                Compression::Auto => decompress_html(html).map_err(|e| e.to_string()),
            };
            match decompressed {
                Ok(html) => return Ok(html),
                Err(err) => {
                    warn!(error = %err, "html decompression failed, falling back to fetch");
                }
            }
        }

        fetch_html(&self.http_client, &request.url)
            .await
            .map_err(|err| match err {
                crate::http_client::FetchError::BadStatus { url, status } => {
                    CoordinatorError::FetchFailed {
                        url,
                        status: status.to_string(),
                    }
                }
                crate::http_client::FetchError::Request { url, source } => {
                    CoordinatorError::FetchFailed {
                        url,
                        status: source.to_string(),
                    }
                }
            })
    }

    /// Persists one file per recipe. A single-recipe result keeps using
    /// the request's own title (preserving the historical single-file
    /// response shape); a multi-recipe result derives each file's slug
    /// from that recipe's own title, falling back to the request title
    /// only if a cached document fails to re-parse. Slugs that collide
    /// within the same batch get a numeric suffix.
    async fn persist(
        &self,
        request: &RecipeRequest,
        recipe_yamls: Vec<String>,
    ) -> Result<RecipeResponse, CoordinatorError> {
        let folder = match self
            .filestore
            .get_or_create_folder(&request.identity, &self.default_folder_name)
            .await
        {
            Ok(folder) => folder,
            Err(err) => {
                warn!(error = %err, "filestore folder lookup failed");
                return Ok(RecipeResponse {
                    url: request.url.clone(),
                    title: request.title.clone(),
                    is_recipe: true,
                    storage_ref: None,
                    storage_refs: None,
                    storage_warning: Some(err.to_string()),
                });
            }
        };

        let titled = self.title_each(request, &recipe_yamls);

        let mut slug_counts: HashMap<String, usize> = HashMap::new();
        let mut storage_refs = Vec::with_capacity(titled.len());
        let mut warning = None;

        for (title, yaml) in titled {
            let slug = recipe_filestore::slugify(&title);
            let n = slug_counts.entry(slug.clone()).or_insert(0);
            *n += 1;
            let filename = recipe_filestore::with_numeric_suffix(&slug, "yaml", *n);

            match self
                .filestore
                .put(&request.identity, &folder, &filename, yaml.as_bytes(), "application/yaml")
                .await
            {
                Ok(file_ref) => storage_refs.push(file_ref.0),
                Err(err) => {
                    warn!(error = %err, "filestore write failed after a successful transform");
                    warning = Some(err.to_string());
                }
            }
        }

        let storage_ref = storage_refs.first().cloned();
        let storage_refs = if storage_refs.len() > 1 { Some(storage_refs) } else { None };

        Ok(RecipeResponse {
            url: request.url.clone(),
            title: request.title.clone(),
            is_recipe: true,
            storage_ref,
            storage_refs,
            storage_warning: warning,
        })
    }

    fn title_each(&self, request: &RecipeRequest, recipe_yamls: &[String]) -> Vec<(String, String)> {
        if recipe_yamls.len() <= 1 {
            return recipe_yamls
                .iter()
                .map(|yaml| (request.title.clone(), yaml.clone()))
                .collect();
        }
        recipe_yamls
            .iter()
            .map(|yaml| {
                let title = recipe_model::parse_str(yaml)
                    .map(|recipe| recipe.metadata.title)
                    .unwrap_or_else(|_| request.title.clone());
                (title, yaml.clone())
            })
            .collect()
    }
}

fn split_cached_yaml(joined: &str) -> Vec<String> {
    joined.split(CACHED_YAML_SEPARATOR).map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_and_splits_multi_recipe_yaml_round_trips() {
        let yamls = vec!["a: 1".to_string(), "b: 2".to_string()];
        let joined = yamls.join(CACHED_YAML_SEPARATOR);
        assert_eq!(split_cached_yaml(&joined), yamls);
    }

    #[test]
    fn single_document_splits_to_one_entry() {
        assert_eq!(split_cached_yaml("a: 1"), vec!["a: 1".to_string()]);
    }
}
