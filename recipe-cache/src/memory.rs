//! An in-process cache store backed by a single actor task, following the
//! request/responder-channel shape of this workspace's async index.
//!
//! No TTL or eviction is implemented — entries live for the process's
//! lifetime. The design explicitly leaves expiration unspecified; an
//! operator who needs one should wrap `sweep` logic around the
//! `HashMap` this actor owns.

use std::collections::HashMap;

use async_trait::async_trait;
use recipe_model::CachedEntry;
use tokio::sync::{mpsc, oneshot};

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use crate::store::CacheStore;

type Responder<T> = oneshot::Sender<T>;

enum Call {
    Lookup {
        fp: Fingerprint,
        resp: Responder<Option<CachedEntry>>,
    },
    StoreValid {
        fp: Fingerprint,
        source_url: String,
        recipe_yaml: String,
        resp: Responder<()>,
    },
    StoreInvalid {
        fp: Fingerprint,
        source_url: String,
        resp: Responder<()>,
    },
    Exists {
        fp: Fingerprint,
        resp: Responder<bool>,
    },
    Delete {
        fp: Fingerprint,
        resp: Responder<()>,
    },
    Count {
        resp: Responder<usize>,
    },
}

/// A process-local cache store. Cloning is cheap: every clone shares the
/// same actor task through its `mpsc::Sender`.
#[derive(Clone)]
pub struct InMemoryCacheStore {
    calls_tx: mpsc::Sender<Call>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        let (calls_tx, mut calls_rx) = mpsc::channel::<Call>(64);

        tokio::spawn(async move {
            let mut entries: HashMap<Fingerprint, CachedEntry> = HashMap::new();
            while let Some(call) = calls_rx.recv().await {
                match call {
                    Call::Lookup { fp, resp } => {
                        let _ = resp.send(entries.get(&fp).cloned());
                    }
                    Call::StoreValid {
                        fp,
                        source_url,
                        recipe_yaml,
                        resp,
                    } => {
                        let entry = match entries.get(&fp) {
                            Some(existing) => existing.next_version(Some(recipe_yaml), true),
                            None => CachedEntry::new_valid(fp.to_string(), source_url, recipe_yaml),
                        };
                        entries.insert(fp, entry);
                        let _ = resp.send(());
                    }
                    Call::StoreInvalid {
                        fp,
                        source_url,
                        resp,
                    } => {
                        let entry = match entries.get(&fp) {
                            Some(existing) => existing.next_version(None, false),
                            None => CachedEntry::new_invalid(fp.to_string(), source_url),
                        };
                        entries.insert(fp, entry);
                        let _ = resp.send(());
                    }
                    Call::Exists { fp, resp } => {
                        let _ = resp.send(entries.contains_key(&fp));
                    }
                    Call::Delete { fp, resp } => {
                        entries.remove(&fp);
                        let _ = resp.send(());
                    }
                    Call::Count { resp } => {
                        let _ = resp.send(entries.len());
                    }
                }
            }
        });

        Self { calls_tx }
    }

    async fn call<T>(&self, make: impl FnOnce(Responder<T>) -> Call) -> Result<T, CacheError> {
        let (tx, rx) = oneshot::channel();
        self.calls_tx
            .send(make(tx))
            .await
            .map_err(|_| CacheError::StoreUnavailable("actor channel closed".into()))?;
        rx.await
            .map_err(|_| CacheError::StoreUnavailable("actor dropped response".into()))
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedEntry>, CacheError> {
        let fp = fingerprint.clone();
        self.call(|resp| Call::Lookup { fp, resp }).await
    }

    async fn store_valid(
        &self,
        fingerprint: &Fingerprint,
        source_url: &str,
        recipe_yaml: String,
    ) -> Result<(), CacheError> {
        let fp = fingerprint.clone();
        let source_url = source_url.to_string();
        self.call(|resp| Call::StoreValid {
            fp,
            source_url,
            recipe_yaml,
            resp,
        })
        .await
    }

    async fn store_invalid(
        &self,
        fingerprint: &Fingerprint,
        source_url: &str,
    ) -> Result<(), CacheError> {
        let fp = fingerprint.clone();
        let source_url = source_url.to_string();
        self.call(|resp| Call::StoreInvalid {
            fp,
            source_url,
            resp,
        })
        .await
    }

    async fn exists(&self, fingerprint: &Fingerprint) -> Result<bool, CacheError> {
        let fp = fingerprint.clone();
        self.call(|resp| Call::Exists { fp, resp }).await
    }

    async fn delete(&self, fingerprint: &Fingerprint) -> Result<(), CacheError> {
        let fp = fingerprint.clone();
        self.call(|resp| Call::Delete { fp, resp }).await
    }

    async fn count(&self) -> Result<usize, CacheError> {
        self.call(|resp| Call::Count { resp }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_lookup_round_trips() {
        let store = InMemoryCacheStore::new();
        let fp = Fingerprint::of_url("https://ex/r1");
        store
            .store_valid(&fp, "https://ex/r1", "title: Cookies".into())
            .await
            .unwrap();

        let entry = store.lookup(&fp).await.unwrap().unwrap();
        assert!(entry.valid);
        assert_eq!(entry.version, 1);
        assert_eq!(entry.recipe_yaml.as_deref(), Some("title: Cookies"));
    }

    #[tokio::test]
    async fn repeated_writes_bump_version_and_preserve_created_at() {
        let store = InMemoryCacheStore::new();
        let fp = Fingerprint::of_url("https://ex/r1");
        store
            .store_valid(&fp, "https://ex/r1", "v1".into())
            .await
            .unwrap();
        let first = store.lookup(&fp).await.unwrap().unwrap();

        store
            .store_valid(&fp, "https://ex/r1", "v2".into())
            .await
            .unwrap();
        let second = store.lookup(&fp).await.unwrap().unwrap();

        assert_eq!(second.version, 2);
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn invalid_entries_memoize_not_a_recipe() {
        let store = InMemoryCacheStore::new();
        let fp = Fingerprint::of_url("https://ex/not-food");
        store
            .store_invalid(&fp, "https://ex/not-food")
            .await
            .unwrap();

        let entry = store.lookup(&fp).await.unwrap().unwrap();
        assert!(!entry.valid);
        assert!(entry.recipe_yaml.is_none());
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = InMemoryCacheStore::new();
        let fp = Fingerprint::of_url("https://ex/r1");
        store.store_valid(&fp, "https://ex/r1", "v".into()).await.unwrap();
        assert!(store.exists(&fp).await.unwrap());

        store.delete(&fp).await.unwrap();
        assert!(!store.exists(&fp).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
