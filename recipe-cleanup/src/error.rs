use thiserror::Error;

/// An error raised by a single cleanup strategy.
///
/// Caught and counted by [`crate::CleanupEngine`]; never aborts the
/// cascade, the next strategy always runs.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("strategy failed to parse html: {0}")]
    Parse(String),
    #[error("strategy produced invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
