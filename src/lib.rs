//! Library surface for the recipe extraction service, split out from
//! `main.rs` so integration tests can drive the router and coordinator
//! directly.

use std::sync::Arc;

pub mod args;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod http_client;
pub mod server;

use config::ServiceConfig;
use coordinator::Coordinator;

/// Shared application state, cheap to clone: every field is an `Arc`
/// handle, mirroring the pool/config sharing pattern the rest of this
/// workspace follows for its server state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub coordinator: Arc<Coordinator>,
}
