//! HTTP handlers for all web routes.

pub mod ask;
pub mod search;
pub mod system;
