use recipe_model::SchemaViolation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error contacting generative model: {0}")]
    Network(String),
    #[error("generative model refused or errored: {0}")]
    Provider(String),
    #[error("prompt exceeded the model's context limit")]
    ContextLimit,
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model response was not valid json: {0}")]
    Unparseable(String),
    #[error("validation retries exhausted: {violations:?}")]
    TransformationFailed { violations: Vec<SchemaViolation> },
}
