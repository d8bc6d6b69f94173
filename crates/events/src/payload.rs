//! Webhook payloads.
//!
//! The webhook side (an email workflow engine) keys on the `type` field:
//! `fire_alert` for sensor alerts, `analysis_result` for automated verdicts,
//! and `user_response` for operator feedback on a verdict.

use std::collections::BTreeMap;

use serde::Serialize;

use firewatch_core::alert::{AlertRecord, SensorState};
use firewatch_core::media::MediaKind;
use firewatch_core::types::{RecordId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FireAlert,
    AnalysisResult,
    UserResponse,
}

/// Status label carried by result notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    FireDetected,
    NoFire,
    Confirmed,
    FalseAlarm,
    Unconfirmed,
}

impl ResultStatus {
    /// Label for an operator response. A false-alarm flag wins over confirmation.
    pub fn from_user_response(user_confirmed: bool, is_false_alarm: bool) -> Self {
        if is_false_alarm {
            ResultStatus::FalseAlarm
        } else if user_confirmed {
            ResultStatus::Confirmed
        } else {
            ResultStatus::Unconfirmed
        }
    }
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AlertNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub to: Option<String>,
    pub alert_id: RecordId,
    pub temperature: f64,
    pub light_level: f64,
    pub state: SensorState,
    pub timestamp: Timestamp,
    /// Link the recipient follows to capture evidence for this alert.
    pub capture_url: String,
    pub message: String,
}

impl AlertNotification {
    pub fn new(alert: &AlertRecord, recipient: Option<String>, public_base_url: &str) -> Self {
        Self {
            kind: NotificationKind::FireAlert,
            to: recipient,
            alert_id: alert.id,
            temperature: alert.temperature,
            light_level: alert.light_level,
            state: alert.state,
            timestamp: alert.timestamp,
            capture_url: format!(
                "{}/capture?alert_id={}",
                public_base_url.trim_end_matches('/'),
                alert.id
            ),
            message: format!(
                "Possible fire: temperature {} and light level {} reported by the sensor",
                alert.temperature, alert.light_level
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ResultNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub to: Option<String>,
    pub status: ResultStatus,
    pub message: String,
    pub fire_detected: bool,
    pub confidence: f64,
    pub files: BTreeMap<MediaKind, String>,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_response: Option<String>,
}

impl ResultNotification {
    /// Verdict of an automated analysis.
    pub fn for_analysis(
        fire_detected: bool,
        confidence: f64,
        files: BTreeMap<MediaKind, String>,
        timestamp: Timestamp,
        recipient: Option<String>,
    ) -> Self {
        let (status, message) = if fire_detected {
            (
                ResultStatus::FireDetected,
                format!(
                    "Fire detected in the evidence ({:.0}% confidence)",
                    confidence * 100.0
                ),
            )
        } else {
            (
                ResultStatus::NoFire,
                "No fire detected in the evidence".to_string(),
            )
        };

        Self {
            kind: NotificationKind::AnalysisResult,
            to: recipient,
            status,
            message,
            fire_detected,
            confidence,
            files,
            timestamp,
            user_response: None,
        }
    }

    /// Operator feedback on a verdict.
    pub fn for_user_response(
        status: ResultStatus,
        user_response: Option<String>,
        files: BTreeMap<MediaKind, String>,
        timestamp: Timestamp,
        recipient: Option<String>,
    ) -> Self {
        let message = match status {
            ResultStatus::FalseAlarm => "Operator marked the alert as a false alarm",
            ResultStatus::Confirmed => "Operator confirmed the fire",
            _ => "Operator did not confirm the fire",
        }
        .to_string();

        Self {
            kind: NotificationKind::UserResponse,
            to: recipient,
            status,
            message,
            fire_detected: status == ResultStatus::Confirmed,
            confidence: if status == ResultStatus::Confirmed { 1.0 } else { 0.0 },
            files,
            timestamp,
            user_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn alert_payload_links_to_capture_page() {
        let alert = AlertRecord {
            id: 7,
            timestamp: at(),
            temperature: 75.0,
            light_level: 900.0,
            state: SensorState::Alert,
        };
        let payload = AlertNotification::new(
            &alert,
            Some("ops@example.com".into()),
            "https://relay.example/",
        );
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["type"], "fire_alert");
        assert_eq!(value["to"], "ops@example.com");
        assert_eq!(value["alert_id"], 7);
        assert_eq!(value["state"], "alert");
        assert_eq!(
            value["capture_url"],
            "https://relay.example/capture?alert_id=7"
        );
    }

    #[test]
    fn analysis_payload_status_follows_fire_flag() {
        let mut files = BTreeMap::new();
        files.insert(MediaKind::Photo, "https://public/photo.jpg".to_string());

        let positive = ResultNotification::for_analysis(true, 0.82, files.clone(), at(), None);
        let value = serde_json::to_value(&positive).unwrap();
        assert_eq!(value["type"], "analysis_result");
        assert_eq!(value["status"], "FIRE_DETECTED");
        assert_eq!(value["files"], json!({ "photo": "https://public/photo.jpg" }));
        assert!(value.get("user_response").is_none());

        let negative = ResultNotification::for_analysis(false, 0.95, files, at(), None);
        assert_eq!(negative.status, ResultStatus::NoFire);
    }

    #[test]
    fn false_alarm_wins_over_confirmation() {
        assert_eq!(
            ResultStatus::from_user_response(true, true),
            ResultStatus::FalseAlarm
        );
        assert_eq!(
            ResultStatus::from_user_response(true, false),
            ResultStatus::Confirmed
        );
        assert_eq!(
            ResultStatus::from_user_response(false, false),
            ResultStatus::Unconfirmed
        );
    }

    #[test]
    fn user_response_payload_carries_label() {
        let payload = ResultNotification::for_user_response(
            ResultStatus::FalseAlarm,
            Some("it was a candle".into()),
            BTreeMap::new(),
            at(),
            None,
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "user_response");
        assert_eq!(value["status"], "FALSE_ALARM");
        assert_eq!(value["user_response"], "it was a candle");
        assert_eq!(value["fire_detected"], false);
    }
}
