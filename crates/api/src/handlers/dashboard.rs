//! Read-only views over the ledger.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use firewatch_core::alert::{AlertRecord, SensorState};
use firewatch_core::analysis::AnalysisRecord;
use firewatch_core::types::Timestamp;

use crate::state::AppState;

/// Alerts returned by `GET /alertas`.
pub const ALERT_HISTORY_WINDOW: usize = 10;

/// Alerts and analyses returned by `GET /api/dashboard-data`.
pub const DASHBOARD_WINDOW: usize = 20;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub timestamp: Timestamp,
    pub total_alertas: usize,
    pub total_analisis: usize,
}

/// GET /status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        timestamp: firewatch_core::types::now_seconds(),
        total_alertas: state.ledger.total_alerts().await,
        total_analisis: state.ledger.total_analyses().await,
    })
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub total: usize,
    pub alertas: Vec<AlertRecord>,
}

/// GET /alertas
pub async fn list_alerts(State(state): State<AppState>) -> Json<AlertListResponse> {
    Json(AlertListResponse {
        total: state.ledger.total_alerts().await,
        alertas: state.ledger.recent_alerts(ALERT_HISTORY_WINDOW).await,
    })
}

#[derive(Debug, Serialize)]
pub struct AlertStateCounts {
    pub alert: usize,
    pub normal: usize,
    pub unknown: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub total_alerts: usize,
    pub total_analyses: usize,
    pub alerts_by_state: AlertStateCounts,
    pub fire_detections: usize,
    pub recent_alerts: Vec<AlertRecord>,
    pub recent_analyses: Vec<AnalysisRecord>,
}

/// GET /api/dashboard-data
pub async fn dashboard_data(State(state): State<AppState>) -> Json<DashboardData> {
    let ledger = &state.ledger;
    let count_state =
        |wanted: SensorState| ledger.count_alerts_where(move |a| a.state == wanted);

    Json(DashboardData {
        total_alerts: ledger.total_alerts().await,
        total_analyses: ledger.total_analyses().await,
        alerts_by_state: AlertStateCounts {
            alert: count_state(SensorState::Alert).await,
            normal: count_state(SensorState::Normal).await,
            unknown: count_state(SensorState::Unknown).await,
        },
        fire_detections: ledger.count_analyses_where(|a| a.fire_detected).await,
        recent_alerts: ledger.recent_alerts(DASHBOARD_WINDOW).await,
        recent_analyses: ledger.recent_analyses(DASHBOARD_WINDOW).await,
    })
}
