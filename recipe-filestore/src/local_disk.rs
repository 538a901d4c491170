//! A local-disk [`FileStore`], rooted at a configured base directory and
//! keyed by `<identity>/<folder>/<filename>`.
//!
//! Adapted from this workspace's async file-store precedent, swapping
//! `async-std` for `tokio::fs` to match the rest of the service's
//! runtime.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};

use crate::error::FileStoreError;
use crate::slug::slugify;
use crate::store::{FileEntry, FileRef, FileStore, FolderRef, ListPage};

#[derive(Clone, Debug)]
pub struct LocalDiskFileStore {
    root: PathBuf,
}

impl LocalDiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn identity_root(&self, identity: &str) -> PathBuf {
        self.root.join(slugify(identity))
    }

    fn folder_path(&self, identity: &str, folder: &FolderRef) -> PathBuf {
        self.identity_root(identity).join(&folder.0)
    }
}

#[async_trait]
impl FileStore for LocalDiskFileStore {
    #[instrument(skip(self))]
    async fn get_or_create_folder(&self, identity: &str, name: &str) -> Result<FolderRef, FileStoreError> {
        let folder_name = slugify(name);
        let path = self.identity_root(identity).join(&folder_name);
        fs::create_dir_all(&path).await?;
        debug!(?path, "ensured folder exists");
        Ok(FolderRef(folder_name))
    }

    async fn put(
        &self,
        identity: &str,
        folder: &FolderRef,
        filename: &str,
        bytes: &[u8],
        _mime_type: &str,
    ) -> Result<FileRef, FileStoreError> {
        let dir = self.folder_path(identity, folder);
        fs::create_dir_all(&dir).await?;
        let path = dir.join(filename);
        fs::write(&path, bytes).await?;
        Ok(FileRef(format!("{}/{}", folder.0, filename)))
    }

    async fn list(
        &self,
        identity: &str,
        folder: &FolderRef,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<ListPage, FileStoreError> {
        let dir = self.folder_path(identity, folder);
        let mut names = Vec::new();
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ListPage {
                    entries: Vec::new(),
                    next_page_token: None,
                })
            }
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = read_dir.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();

        let start = match page_token {
            Some(token) => names.iter().position(|n| n == token).map(|i| i + 1).unwrap_or(0),
            None => 0,
        };

        let mut entries = Vec::new();
        for name in names.iter().skip(start).take(page_size) {
            let path = dir.join(name);
            let size_bytes = fs::metadata(&path).await?.len();
            entries.push(FileEntry {
                file_ref: FileRef(format!("{}/{}", folder.0, name)),
                name: name.clone(),
                size_bytes,
            });
        }

        let next_page_token = if start + entries.len() < names.len() {
            entries.last().map(|e| e.name.clone())
        } else {
            None
        };

        Ok(ListPage {
            entries,
            next_page_token,
        })
    }

    async fn get_bytes(&self, identity: &str, file_ref: &FileRef) -> Result<Vec<u8>, FileStoreError> {
        let path = self.identity_root(identity).join(&file_ref.0);
        Ok(fs::read(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_bytes_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskFileStore::new(dir.path());
        let folder = store.get_or_create_folder("user-1", "Recipes").await.unwrap();
        let file_ref = store
            .put("user-1", &folder, "cookies.yaml", b"title: Cookies", "application/yaml")
            .await
            .unwrap();

        let bytes = store.get_bytes("user-1", &file_ref).await.unwrap();
        assert_eq!(bytes, b"title: Cookies");
    }

    #[tokio::test]
    async fn list_paginates_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskFileStore::new(dir.path());
        let folder = store.get_or_create_folder("user-1", "recipes").await.unwrap();
        for name in ["b.yaml", "a.yaml", "c.yaml"] {
            store.put("user-1", &folder, name, b"x", "application/yaml").await.unwrap();
        }

        let page1 = store.list("user-1", &folder, 2, None).await.unwrap();
        assert_eq!(page1.entries.iter().map(|e| &e.name).collect::<Vec<_>>(), vec!["a.yaml", "b.yaml"]);
        assert!(page1.next_page_token.is_some());

        let page2 = store
            .list("user-1", &folder, 2, page1.next_page_token.as_deref())
            .await
            .unwrap();
        assert_eq!(page2.entries.iter().map(|e| &e.name).collect::<Vec<_>>(), vec!["c.yaml"]);
        assert!(page2.next_page_token.is_none());
    }

    #[tokio::test]
    async fn missing_folder_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskFileStore::new(dir.path());
        let page = store
            .list("user-1", &FolderRef("nope".into()), 10, None)
            .await
            .unwrap();
        assert!(page.entries.is_empty());
    }
}
