//! Abstract hierarchical per-identity blob store used to persist
//! serialized recipe artifacts, plus a local-disk implementation.

mod error;
mod local_disk;
mod slug;
mod store;

pub use error::FileStoreError;
pub use local_disk::LocalDiskFileStore;
pub use slug::{slugify, with_numeric_suffix};
pub use store::{FileEntry, FileRef, FileStore, FolderRef, ListPage};
