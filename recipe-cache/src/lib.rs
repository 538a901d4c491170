//! Fingerprinted cache store plus the single process-wide in-flight
//! registry that guarantees at most one build per fingerprint.

mod error;
mod fingerprint;
mod memory;
mod single_flight;
mod store;

pub use error::CacheError;
pub use fingerprint::Fingerprint;
pub use memory::InMemoryCacheStore;
pub use single_flight::{JoinOutcome, SingleFlight};
pub use store::CacheStore;
