//! Bearer-token authentication middleware.
//!
//! Identity is resolved externally: the token itself, once checked
//! against the configured allow-list, becomes the caller's identity for
//! the rest of the request (used as the FileStore's `identity`).

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::CoordinatorError;
use crate::AppState;

/// Caller identity attached to the request's extensions by [`require_bearer_token`].
#[derive(Debug, Clone)]
pub struct Identity(pub String);

pub async fn require_bearer_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, CoordinatorError> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(CoordinatorError::Unauthorized)?;

    if !state.config.auth.tokens.iter().any(|t| t == token) {
        return Err(CoordinatorError::Unauthorized);
    }

    request.extensions_mut().insert(Identity(token.to_string()));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    fn config_with_token(token: &str) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.auth.tokens.push(token.to_string());
        config
    }

    #[test]
    fn accepts_configured_token() {
        let config = config_with_token("secret-token");
        assert!(config.auth.tokens.iter().any(|t| t == "secret-token"));
    }
}
