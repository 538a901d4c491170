//! The coordinator's error taxonomy and its mapping onto HTTP responses.
//!
//! User-visible failures carry an HTTP status, a short machine-readable
//! code, and a human message — never a bearer token or a secret.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("{0}")]
    BadRequest(String),

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("fetch of {url} failed: {status}")]
    FetchFailed { url: String, status: String },

    #[error("model call failed: {0}")]
    ModelError(String),

    #[error("transformation failed after retries: {0:?}")]
    TransformationFailed(Vec<recipe_model::SchemaViolation>),

    #[error("unexpected internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl CoordinatorError {
    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::FetchFailed { .. } => "FETCH_FAILED",
            Self::ModelError(_) => "MODEL_ERROR",
            Self::TransformationFailed(_) => "TRANSFORMATION_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::ModelError(_) | Self::TransformationFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal error handling request");
        } else {
            tracing::warn!(error = %self, "request failed");
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<recipe_llm::OrchestratorError> for CoordinatorError {
    fn from(err: recipe_llm::OrchestratorError) -> Self {
        match err {
            recipe_llm::OrchestratorError::Model(model_err) => {
                Self::ModelError(model_err.to_string())
            }
            recipe_llm::OrchestratorError::Unparseable(msg) => Self::ModelError(msg),
            recipe_llm::OrchestratorError::TransformationFailed { violations } => {
                Self::TransformationFailed(violations)
            }
        }
    }
}
