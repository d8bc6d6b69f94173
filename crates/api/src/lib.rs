//! Firewatch API server library.
//!
//! Exposes config, state, error handling, the pipeline orchestrator, and
//! routes so integration tests and the binary entrypoint can both use them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod router;
pub mod routes;
pub mod state;
