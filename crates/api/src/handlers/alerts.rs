//! Handlers for sensor alerts.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use firewatch_core::alert::SensorState;
use firewatch_core::media::MediaKind;
use firewatch_core::types::{RecordId, Timestamp};

use crate::error::{AppError, AppResult};
use crate::pipeline::SensorReading;
use crate::state::AppState;

/// Body posted by the sensor. Missing readings default to zero and a missing
/// or unrecognized status to `unknown`. An empty object is rejected.
#[derive(Debug, Deserialize)]
pub struct SensorPayload {
    #[serde(default)]
    pub temp: f64,
    #[serde(default)]
    pub light: f64,
    #[serde(default)]
    pub status: SensorState,
}

#[derive(Debug, Serialize)]
pub struct AlertReceivedResponse {
    pub status: &'static str,
    pub alerta_id: RecordId,
    pub message: String,
    pub timestamp: Timestamp,
    /// Kinds captured from the device for this alert (push-capture mode).
    pub archivos_capturados: Vec<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_detected: Option<bool>,
}

/// POST /alert
pub async fn receive_alert(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> AppResult<Json<AlertReceivedResponse>> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if body.is_empty() {
        return Err(AppError::BadRequest("No data received".to_string()));
    }
    let payload: SensorPayload = serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::BadRequest(format!("Invalid sensor payload: {e}")))?;

    let outcome = state
        .pipeline
        .receive_alert(SensorReading {
            temperature: payload.temp,
            light_level: payload.light,
            state: payload.status,
        })
        .await;

    Ok(Json(AlertReceivedResponse {
        status: "received",
        alerta_id: outcome.alert.id,
        message: "Alert processed".to_string(),
        timestamp: outcome.alert.timestamp,
        archivos_capturados: outcome
            .analysis
            .as_ref()
            .map(|a| a.record.files.keys().copied().collect())
            .unwrap_or_default(),
        analysis_id: outcome.analysis.as_ref().map(|a| a.record.id),
        fire_detected: outcome.analysis.as_ref().map(|a| a.record.fire_detected),
    }))
}

#[derive(Debug, Serialize)]
pub struct TestAlertResponse {
    pub status: &'static str,
    pub alerta_id: RecordId,
    pub notification_sent: bool,
}

/// POST /api/test-alert
pub async fn test_alert(State(state): State<AppState>) -> Json<TestAlertResponse> {
    let (alert, notification_sent) = state.pipeline.send_test_alert().await;
    Json(TestAlertResponse {
        status: "success",
        alerta_id: alert.id,
        notification_sent,
    })
}
