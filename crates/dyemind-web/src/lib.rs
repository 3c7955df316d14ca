//! dyemind-web — HTTP front end for the DyeMind pipeline.
//! Exposes a JSON API:
//!   - POST /api/search — run the full aggregation pipeline for a query
//!   - POST /api/search/download — same report rendered as downloadable text
//!   - POST /api/ask — free-form question answering
//!   - GET  /health — liveness probe

pub mod handlers;
pub mod router;
pub mod state;
