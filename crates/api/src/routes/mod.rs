pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree.
///
/// ```text
/// /                        landing page (GET)
///
/// /alert                   sensor reading (POST)
/// /api/test-alert          synthetic alert + notification (POST)
///
/// /upload/{kind}           multipart evidence upload, kind = photo|video|audio (POST)
/// /analyze                 classify uploaded evidence (POST)
/// /send-result             forward operator feedback (POST)
///
/// /status                  liveness + totals (GET)
/// /alertas                 last 10 alerts (GET)
/// /api/dashboard-data      dashboard aggregates (GET)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home::index))
        .route("/alert", post(handlers::alerts::receive_alert))
        .route("/api/test-alert", post(handlers::alerts::test_alert))
        .route("/upload/{kind}", post(handlers::uploads::upload))
        .route("/analyze", post(handlers::analysis::analyze))
        .route("/send-result", post(handlers::analysis::send_result))
        .route("/status", get(handlers::dashboard::status))
        .route("/alertas", get(handlers::dashboard::list_alerts))
        .route("/api/dashboard-data", get(handlers::dashboard::dashboard_data))
}
