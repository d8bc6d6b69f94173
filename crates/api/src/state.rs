use std::sync::Arc;

use firewatch_core::ledger::Ledger;

use crate::config::ServerConfig;
use crate::pipeline::Pipeline;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Alert and analysis history, shared with the pipeline.
    pub ledger: Arc<Ledger>,
    pub pipeline: Arc<Pipeline>,
}
