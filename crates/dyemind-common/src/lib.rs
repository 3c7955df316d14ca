//! dyemind-common — Shared error types and the capped HTTP client used
//! across all DyeMind crates.

pub mod error;
pub mod sandbox;

pub use error::{DyeMindError, Result};
pub use sandbox::SandboxClient;
