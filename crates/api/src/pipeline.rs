//! Alert-to-verdict orchestration.
//!
//! One cycle runs `Idle -> SensorAlertReceived -> EvidenceCaptured -> Uploaded
//! -> Classified -> NotificationSent -> Idle`. Every cycle is independent: no
//! de-duplication, no debouncing. External failures never abort a cycle; they
//! surface as missing assets, error verdicts, or `notification_sent = false`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use firewatch_capture::DeviceCapture;
use firewatch_cloud::inference::{Classifier, InferenceConfig, VideoOptions};
use firewatch_cloud::storage::{StoredObject, Uploader};
use firewatch_core::alert::{AlertRecord, NewAlert, SensorState};
use firewatch_core::analysis::{combine_verdicts, AnalysisRecord, NewAnalysis};
use firewatch_core::ledger::Ledger;
use firewatch_core::media::MediaKind;
use firewatch_core::storage::object_key;
use firewatch_core::types::now_seconds;
use firewatch_core::verdict::Verdict;
use firewatch_events::{
    AlertNotification, NotificationConfig, Notifier, ResultNotification, ResultStatus,
};

/// Readings of the synthetic alert raised by the test endpoint.
pub const TEST_ALERT_TEMPERATURE: f64 = 75.0;
pub const TEST_ALERT_LIGHT_LEVEL: f64 = 900.0;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    SensorAlertReceived,
    EvidenceCaptured,
    Uploaded,
    Classified,
    NotificationSent,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::SensorAlertReceived => "sensor_alert_received",
            PipelineStage::EvidenceCaptured => "evidence_captured",
            PipelineStage::Uploaded => "uploaded",
            PipelineStage::Classified => "classified",
            PipelineStage::NotificationSent => "notification_sent",
        };
        f.write_str(name)
    }
}

fn enter(stage: PipelineStage) {
    tracing::debug!(stage = %stage, "Pipeline stage");
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Externally reachable base URL, used for capture links in alert emails.
    pub public_base_url: String,
    /// Pull evidence from the device as soon as an `alert` arrives.
    pub auto_capture: bool,
    /// `to` address stamped on every notification.
    pub recipient: Option<String>,
    pub video: VideoOptions,
}

impl PipelineSettings {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                  |
    /// |-------------------|--------------------------|
    /// | `PUBLIC_BASE_URL` | `http://localhost:8080`  |
    /// | `AUTO_CAPTURE`    | `false`                  |
    ///
    /// The recipient and video options come from [`NotificationConfig`] and
    /// [`InferenceConfig`].
    pub fn from_env() -> Self {
        Self {
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
            auto_capture: firewatch_capture::config::env_flag("AUTO_CAPTURE", false),
            recipient: NotificationConfig::from_env().recipient,
            video: InferenceConfig::from_env().video,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Sensor reading as posted to `/alert`.
#[derive(Debug, Clone)]
pub struct SensorReading {
    pub temperature: f64,
    pub light_level: f64,
    pub state: SensorState,
}

/// Result of one `/alert`: the stored record plus, in push-capture mode, the
/// analysis run on the captured evidence.
#[derive(Debug)]
pub struct AlertOutcome {
    pub alert: AlertRecord,
    pub analysis: Option<AnalysisOutcome>,
}

/// What to classify. URIs are storage URIs; `files` are public URLs.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub photo_uri: Option<String>,
    pub video_uri: Option<String>,
    pub files: BTreeMap<MediaKind, String>,
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub record: AnalysisRecord,
    pub photo: Option<Verdict>,
    pub video: Option<Verdict>,
}

/// Operator feedback posted to `/send-result`.
#[derive(Debug, Clone, Default)]
pub struct UserResponse {
    pub user_confirmed: bool,
    pub is_false_alarm: bool,
    pub message: Option<String>,
    pub files: BTreeMap<MediaKind, String>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    settings: PipelineSettings,
    ledger: Arc<Ledger>,
    uploader: Uploader,
    classifier: Arc<dyn Classifier>,
    notifier: Arc<dyn Notifier>,
    device: DeviceCapture,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        ledger: Arc<Ledger>,
        uploader: Uploader,
        classifier: Arc<dyn Classifier>,
        notifier: Arc<dyn Notifier>,
        device: DeviceCapture,
    ) -> Self {
        Self {
            settings,
            ledger,
            uploader,
            classifier,
            notifier,
            device,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn device_config(&self) -> &firewatch_capture::DeviceConfig {
        self.device.config()
    }

    /// Record a sensor reading. For an `alert`, dispatch the alert
    /// notification in the background and, in push-capture mode, pull,
    /// upload, and classify evidence before returning.
    ///
    /// The alert is appended before any capture starts, so concurrent
    /// readers see it immediately. Captured evidence is only referenced by
    /// the resulting analysis.
    pub async fn receive_alert(&self, reading: SensorReading) -> AlertOutcome {
        enter(PipelineStage::SensorAlertReceived);

        tracing::info!(
            temperature = reading.temperature,
            light_level = reading.light_level,
            state = ?reading.state,
            "Sensor reading received"
        );

        let alert = self
            .ledger
            .append_alert(NewAlert {
                timestamp: now_seconds(),
                temperature: reading.temperature,
                light_level: reading.light_level,
                state: reading.state,
            })
            .await;
        tracing::info!(alert_id = alert.id, "Alert recorded");

        if !alert.is_alert() {
            enter(PipelineStage::Idle);
            return AlertOutcome {
                alert,
                analysis: None,
            };
        }

        self.spawn_alert_notification(&alert);

        let stored = if self.settings.auto_capture {
            self.capture_evidence().await
        } else {
            BTreeMap::new()
        };

        let analysis = if stored.is_empty() {
            enter(PipelineStage::Idle);
            None
        } else {
            let input = AnalysisInput {
                photo_uri: stored.get(&MediaKind::Photo).map(|o| o.storage_uri.clone()),
                video_uri: stored.get(&MediaKind::Video).map(|o| o.storage_uri.clone()),
                files: public_urls(&stored),
            };
            Some(self.analyze(input).await)
        };

        AlertOutcome { alert, analysis }
    }

    /// Record a synthetic alert and await its notification.
    pub async fn send_test_alert(&self) -> (AlertRecord, bool) {
        let alert = self
            .ledger
            .append_alert(NewAlert {
                timestamp: now_seconds(),
                temperature: TEST_ALERT_TEMPERATURE,
                light_level: TEST_ALERT_LIGHT_LEVEL,
                state: SensorState::Alert,
            })
            .await;
        tracing::info!(alert_id = alert.id, "Test alert recorded");

        let payload = self.alert_payload(&alert);
        let sent = self.notifier.send_alert_notification(&payload).await;
        (alert, sent)
    }

    /// Upload one operator-supplied asset under a fresh timestamped key.
    pub async fn upload_evidence(&self, kind: MediaKind, bytes: Vec<u8>) -> Option<StoredObject> {
        let key = object_key(kind, now_seconds());
        let stored = self.uploader.upload(bytes, &key, kind.content_type()).await;
        if stored.is_some() {
            enter(PipelineStage::Uploaded);
        }
        stored
    }

    /// Classify photo and video concurrently, combine, notify, and record.
    pub async fn analyze(&self, input: AnalysisInput) -> AnalysisOutcome {
        let AnalysisInput {
            photo_uri,
            video_uri,
            files,
        } = input;

        let photo_fut = async {
            match photo_uri.as_deref() {
                Some(uri) => Some(self.classifier.classify_image(uri).await),
                None => None,
            }
        };
        let video_fut = async {
            match video_uri.as_deref() {
                Some(uri) => Some(
                    self.classifier
                        .classify_video(uri, &self.settings.video)
                        .await,
                ),
                None => None,
            }
        };
        let (photo, video) = tokio::join!(photo_fut, video_fut);
        enter(PipelineStage::Classified);

        let combined = combine_verdicts(photo.iter().chain(video.iter()));
        let timestamp = now_seconds();
        tracing::info!(
            fire_detected = combined.fire_detected,
            confidence = combined.confidence,
            photo = photo.is_some(),
            video = video.is_some(),
            "Evidence classified"
        );

        let payload = ResultNotification::for_analysis(
            combined.fire_detected,
            combined.confidence,
            files.clone(),
            timestamp,
            self.settings.recipient.clone(),
        );
        let notification_sent = self.notifier.send_result_notification(&payload).await;
        enter(PipelineStage::NotificationSent);

        let record = self
            .ledger
            .append_analysis(NewAnalysis {
                timestamp,
                files,
                fire_detected: combined.fire_detected,
                confidence: combined.confidence,
                notification_sent,
            })
            .await;
        tracing::info!(analysis_id = record.id, notification_sent, "Analysis recorded");
        enter(PipelineStage::Idle);

        AnalysisOutcome {
            record,
            photo,
            video,
        }
    }

    /// Forward operator feedback. Returns whether the webhook accepted it.
    pub async fn send_result(&self, response: UserResponse) -> (ResultStatus, bool) {
        let status =
            ResultStatus::from_user_response(response.user_confirmed, response.is_false_alarm);
        let payload = ResultNotification::for_user_response(
            status,
            response.message,
            response.files,
            now_seconds(),
            self.settings.recipient.clone(),
        );
        let sent = self.notifier.send_result_notification(&payload).await;
        tracing::info!(status = ?status, sent, "User response forwarded");
        (status, sent)
    }

    // -- internals --

    fn alert_payload(&self, alert: &AlertRecord) -> AlertNotification {
        AlertNotification::new(
            alert,
            self.settings.recipient.clone(),
            &self.settings.public_base_url,
        )
    }

    fn spawn_alert_notification(&self, alert: &AlertRecord) {
        let notifier = Arc::clone(&self.notifier);
        let payload = self.alert_payload(alert);
        let alert_id = alert.id;
        tokio::spawn(async move {
            let sent = notifier.send_alert_notification(&payload).await;
            tracing::debug!(alert_id, sent, "Alert notification finished");
        });
    }

    /// Pull the enabled assets from the device and upload each one.
    /// Failed captures or uploads are simply missing from the result.
    async fn capture_evidence(&self) -> BTreeMap<MediaKind, StoredObject> {
        let config = self.device.config();
        let mut kinds = vec![MediaKind::Photo];
        if config.capture_video {
            kinds.push(MediaKind::Video);
        }
        if config.capture_audio {
            kinds.push(MediaKind::Audio);
        }

        tracing::info!(kinds = ?kinds, "Capturing evidence from device");
        let mut captured = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if let Some(bytes) = self.device.capture(kind, config.duration).await {
                captured.push((kind, bytes));
            }
        }
        enter(PipelineStage::EvidenceCaptured);

        let uploads = captured
            .into_iter()
            .map(|(kind, bytes)| async move { (kind, self.upload_evidence(kind, bytes).await) });
        futures::future::join_all(uploads)
            .await
            .into_iter()
            .filter_map(|(kind, stored)| stored.map(|s| (kind, s)))
            .collect()
    }
}

fn public_urls(stored: &BTreeMap<MediaKind, StoredObject>) -> BTreeMap<MediaKind, String> {
    stored
        .iter()
        .map(|(kind, object)| (*kind, object.public_url.clone()))
        .collect()
}
