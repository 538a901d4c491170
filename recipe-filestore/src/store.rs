use async_trait::async_trait;

use crate::error::FileStoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderRef(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef(pub String);

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub file_ref: FileRef,
    pub name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ListPage {
    pub entries: Vec<FileEntry>,
    pub next_page_token: Option<String>,
}

/// Abstract hierarchical per-identity blob store used to persist
/// serialized recipe artifacts.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn get_or_create_folder(&self, identity: &str, name: &str) -> Result<FolderRef, FileStoreError>;

    async fn put(
        &self,
        identity: &str,
        folder: &FolderRef,
        filename: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<FileRef, FileStoreError>;

    async fn list(
        &self,
        identity: &str,
        folder: &FolderRef,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<ListPage, FileStoreError>;

    async fn get_bytes(&self, identity: &str, file_ref: &FileRef) -> Result<Vec<u8>, FileStoreError>;

    async fn get_text(&self, identity: &str, file_ref: &FileRef) -> Result<String, FileStoreError> {
        let bytes = self.get_bytes(identity, file_ref).await?;
        Ok(String::from_utf8(bytes)?)
    }
}
