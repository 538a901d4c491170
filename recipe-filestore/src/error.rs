use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file contents are not valid utf-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
    #[error("unknown folder: {0}")]
    UnknownFolder(String),
    #[error("unknown file: {0}")]
    UnknownFile(String),
}
