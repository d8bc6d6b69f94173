//! Handlers for evidence analysis and operator feedback.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use firewatch_core::media::MediaKind;
use firewatch_core::types::RecordId;
use firewatch_core::verdict::Verdict;
use firewatch_events::ResultStatus;

use crate::error::{AppError, AppResult};
use crate::pipeline::{AnalysisInput, UserResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /analyze
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub photo_gcs_uri: Option<String>,
    pub video_gcs_uri: Option<String>,
    pub photo_url: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
}

/// Per-asset verdicts; absent when the asset was not submitted.
#[derive(Debug, Serialize)]
pub struct AnalysisResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Verdict>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis_id: RecordId,
    pub fire_detected: bool,
    pub confidence: f64,
    pub results: AnalysisResults,
    pub notification_sent: bool,
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalyzeResponse>> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let files = file_map(req.photo_url, req.video_url, req.audio_url);
    let outcome = state
        .pipeline
        .analyze(AnalysisInput {
            photo_uri: non_empty(req.photo_gcs_uri),
            video_uri: non_empty(req.video_gcs_uri),
            files,
        })
        .await;

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis_id: outcome.record.id,
        fire_detected: outcome.record.fire_detected,
        confidence: outcome.record.confidence,
        results: AnalysisResults {
            photo: outcome.photo,
            video: outcome.video,
        },
        notification_sent: outcome.record.notification_sent,
    }))
}

// ---------------------------------------------------------------------------
// POST /send-result
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SendResultRequest {
    #[serde(default)]
    pub user_confirmed: bool,
    #[serde(default)]
    pub is_false_alarm: bool,
    pub user_response: Option<String>,
    pub photo_url: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendResultResponse {
    pub status: &'static str,
    pub message: String,
}

pub async fn send_result(
    State(state): State<AppState>,
    payload: Result<Json<SendResultRequest>, JsonRejection>,
) -> AppResult<Json<SendResultResponse>> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (status, sent) = state
        .pipeline
        .send_result(UserResponse {
            user_confirmed: req.user_confirmed,
            is_false_alarm: req.is_false_alarm,
            message: non_empty(req.user_response),
            files: file_map(req.photo_url, req.video_url, req.audio_url),
        })
        .await;

    let label = match status {
        ResultStatus::FalseAlarm => "FALSE_ALARM",
        ResultStatus::Confirmed => "CONFIRMED",
        _ => "UNCONFIRMED",
    };

    Ok(Json(if sent {
        SendResultResponse {
            status: "success",
            message: format!("Result sent ({label})"),
        }
    } else {
        SendResultResponse {
            status: "error",
            message: format!("Result could not be delivered ({label})"),
        }
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn file_map(
    photo: Option<String>,
    video: Option<String>,
    audio: Option<String>,
) -> BTreeMap<MediaKind, String> {
    [
        (MediaKind::Photo, photo),
        (MediaKind::Video, video),
        (MediaKind::Audio, audio),
    ]
    .into_iter()
    .filter_map(|(kind, url)| non_empty(url).map(|u| (kind, u)))
    .collect()
}
