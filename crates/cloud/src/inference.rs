//! Client for the remote fire/smoke classification endpoint.
//!
//! The endpoint takes a storage URI (image or video) and answers with the
//! `predictions` shape normalized by [`Verdict::from_json`]. Every failure
//! (missing credential, transport error, non-200, undecodable body) becomes
//! an error verdict; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

use firewatch_core::verdict::Verdict;

use crate::credentials::{CredentialError, CredentialProvider};

/// Per-request timeout for single-image classification.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-request timeout for video classification (frame-by-frame on the server).
pub const VIDEO_TIMEOUT: Duration = Duration::from_secs(300);

/// Minimum detection confidence requested for images.
const IMAGE_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Maximum predictions requested for images.
const IMAGE_MAX_PREDICTIONS: u32 = 10;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Inference endpoint is not configured")]
    NotConfigured,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Inference endpoint returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Inference response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl InferenceError {
    /// Short description safe to hand back to API clients. Response bodies
    /// and transport details stay in the log.
    pub fn label(&self) -> String {
        match self {
            InferenceError::NotConfigured => "Inference endpoint is not configured".into(),
            InferenceError::Credential(_) => "Inference credentials unavailable".into(),
            InferenceError::Request(_) => "Inference request failed".into(),
            InferenceError::HttpStatus { status, .. } => {
                format!("Inference endpoint returned HTTP {status}")
            }
            InferenceError::Decode(_) => "Inference response could not be decoded".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Video analysis parameters sent with every video request.
#[derive(Debug, Clone, Serialize)]
pub struct VideoOptions {
    pub frame_interval: u32,
    pub max_detections: u32,
    pub analyze_audio: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            frame_interval: 30,
            max_detections: 10,
            analyze_audio: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Full prediction URL. `None` disables classification (error verdicts).
    pub endpoint_url: Option<String>,
    pub video: VideoOptions,
}

impl InferenceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `INFERENCE_ENDPOINT_URL` | unset   |
    /// | `VIDEO_FRAME_INTERVAL`   | `30`    |
    /// | `VIDEO_MAX_DETECTIONS`   | `10`    |
    /// | `VIDEO_ANALYZE_AUDIO`    | `false` |
    pub fn from_env() -> Self {
        let defaults = VideoOptions::default();
        let endpoint_url = std::env::var("INFERENCE_ENDPOINT_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            endpoint_url,
            video: VideoOptions {
                frame_interval: env_parse("VIDEO_FRAME_INTERVAL", defaults.frame_interval),
                max_detections: env_parse("VIDEO_MAX_DETECTIONS", defaults.max_detections),
                analyze_audio: std::env::var("VIDEO_ANALYZE_AUDIO")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(defaults.analyze_audio),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Anything that can turn a storage URI into a [`Verdict`].
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify_image(&self, storage_uri: &str) -> Verdict;

    async fn classify_video(&self, storage_uri: &str, options: &VideoOptions) -> Verdict;
}

pub struct InferenceClient {
    client: reqwest::Client,
    endpoint_url: Option<String>,
    credentials: Arc<CredentialProvider>,
}

impl InferenceClient {
    pub fn new(endpoint_url: Option<String>, credentials: Arc<CredentialProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint_url,
            credentials,
        }
    }

    async fn predict(
        &self,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<Verdict, InferenceError> {
        let url = self
            .endpoint_url
            .as_deref()
            .ok_or(InferenceError::NotConfigured)?;
        let token = self.credentials.ensure_valid().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response.json().await?;
        Ok(Verdict::from_json(&raw)?)
    }

    async fn classify(&self, storage_uri: &str, body: serde_json::Value, timeout: Duration) -> Verdict {
        match self.predict(&body, timeout).await {
            Ok(verdict) => {
                tracing::info!(
                    storage_uri,
                    fire_detected = verdict.fire_detected,
                    confidence = verdict.confidence,
                    detections = verdict.detections_count,
                    "Classification complete"
                );
                verdict
            }
            Err(e) => {
                tracing::error!(storage_uri, error = %e, "Classification failed");
                Verdict::failed(e.label())
            }
        }
    }
}

#[async_trait]
impl Classifier for InferenceClient {
    async fn classify_image(&self, storage_uri: &str) -> Verdict {
        let body = json!({
            "instances": [{ "gcs_uri": storage_uri, "mime_type": "image/jpeg" }],
            "parameters": {
                "confidence_threshold": IMAGE_CONFIDENCE_THRESHOLD,
                "max_predictions": IMAGE_MAX_PREDICTIONS,
            },
        });
        self.classify(storage_uri, body, IMAGE_TIMEOUT).await
    }

    async fn classify_video(&self, storage_uri: &str, options: &VideoOptions) -> Verdict {
        let body = json!({
            "instances": [{ "gcs_uri": storage_uri, "mime_type": "video/mp4" }],
            "parameters": options,
        });
        self.classify(storage_uri, body, VIDEO_TIMEOUT).await
    }
}
