//! Turns a cleaned HTML fragment into a validated recipe record via a
//! schema-constrained remote generative model, retrying on validation
//! failure up to a configured budget.

mod error;
mod model;
mod orchestrator;
mod prompt;
mod schema;

pub use error::{ModelError, OrchestratorError};
pub use model::{GenerateRequest, GenerateResponse, GenerativeModel, HttpGenerativeModel};
pub use orchestrator::{Orchestrator, OrchestratorConfig, Response};
pub use schema::recipe_json_schema;
