//! Inference response normalization.
//!
//! The classification endpoint answers with `{"predictions": [...]}` where each
//! prediction carries a `detections` list. An entry in that list is either a
//! detection itself (`{"class", "confidence"}`) or a wrapper holding another
//! `detections` list. [`Verdict::from_response`] flattens that one level and
//! produces the canonical [`Verdict`]; nothing downstream sees the raw shape.

use serde::{Deserialize, Serialize};

/// Case-insensitive substrings that mark a class as fire-positive.
pub const FIRE_KEYWORDS: &[&str] = &["fire", "smoke", "fuego", "humo"];

/// Maximum number of detections retained on a verdict.
pub const MAX_REPORTED_DETECTIONS: usize = 10;

// ---------------------------------------------------------------------------
// Raw response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub predictions: Vec<RawPrediction>,
}

#[derive(Debug, Deserialize)]
pub struct RawPrediction {
    #[serde(default)]
    pub detections: Vec<RawDetectionEntry>,
}

/// One element of a prediction's `detections` list.
///
/// `Nested` must stay first: `Direct` has only defaulted fields and would
/// otherwise match every object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawDetectionEntry {
    Nested { detections: Vec<Detection> },
    Direct(Detection),
}

// ---------------------------------------------------------------------------
// Canonical shapes
// ---------------------------------------------------------------------------

/// A single class/confidence pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub confidence: f64,
}

impl Detection {
    pub fn is_fire(&self) -> bool {
        is_fire_class(&self.class)
    }
}

/// Normalized classification result for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub fire_detected: bool,
    pub confidence: f64,
    pub detections_count: usize,
    pub detections: Vec<Detection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verdict {
    /// A verdict for an inference that could not be completed.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            fire_detected: false,
            confidence: 0.0,
            detections_count: 0,
            detections: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Flatten and interpret a raw endpoint response.
    ///
    /// `confidence` is the maximum over every detection examined, positive or
    /// not.
    pub fn from_response(response: RawResponse) -> Self {
        let detections: Vec<Detection> = response
            .predictions
            .into_iter()
            .flat_map(|prediction| prediction.detections)
            .flat_map(|entry| match entry {
                RawDetectionEntry::Nested { detections } => detections,
                RawDetectionEntry::Direct(detection) => vec![detection],
            })
            .collect();

        let fire_detected = detections.iter().any(Detection::is_fire);
        let confidence = detections
            .iter()
            .map(|d| d.confidence)
            .fold(0.0_f64, f64::max);
        let detections_count = detections.len();

        Self {
            fire_detected,
            confidence,
            detections_count,
            detections: detections
                .into_iter()
                .take(MAX_REPORTED_DETECTIONS)
                .collect(),
            error: None,
        }
    }

    /// Parse a response body and normalize it.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let raw = RawResponse::deserialize(body)?;
        Ok(Self::from_response(raw))
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Whether a class label names fire or smoke.
pub fn is_fire_class(class: &str) -> bool {
    let lower = class.to_lowercase();
    FIRE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_predictions_yield_clean_negative() {
        let verdict = Verdict::from_json(&json!({ "predictions": [] })).unwrap();
        assert!(!verdict.fire_detected);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.detections_count, 0);
        assert!(verdict.error.is_none());
    }

    #[test]
    fn missing_predictions_key_is_empty() {
        let verdict = Verdict::from_json(&json!({})).unwrap();
        assert_eq!(verdict.detections_count, 0);
    }

    #[test]
    fn smoke_detection_is_positive() {
        let body = json!({
            "predictions": [{ "detections": [{ "class": "Smoke", "confidence": 0.82 }] }]
        });
        let verdict = Verdict::from_json(&body).unwrap();
        assert!(verdict.fire_detected);
        assert_eq!(verdict.confidence, 0.82);
        assert_eq!(verdict.detections_count, 1);
    }

    #[test]
    fn non_fire_confidence_still_reported() {
        let body = json!({
            "predictions": [{ "detections": [{ "class": "person", "confidence": 0.95 }] }]
        });
        let verdict = Verdict::from_json(&body).unwrap();
        assert!(!verdict.fire_detected);
        assert_eq!(verdict.confidence, 0.95);
    }

    #[test]
    fn nested_detections_are_flattened_one_level() {
        let body = json!({
            "predictions": [{
                "detections": [
                    { "class": "car", "confidence": 0.4 },
                    { "detections": [
                        { "class": "HUMO denso", "confidence": 0.6 },
                        { "class": "tree", "confidence": 0.7 }
                    ]}
                ]
            }]
        });
        let verdict = Verdict::from_json(&body).unwrap();
        assert!(verdict.fire_detected);
        assert_eq!(verdict.confidence, 0.7);
        assert_eq!(verdict.detections_count, 3);
        assert_eq!(verdict.detections[1].class, "HUMO denso");
    }

    #[test]
    fn detections_truncated_to_ten_in_order() {
        let entries: Vec<_> = (0..14)
            .map(|i| json!({ "class": format!("obj{i}"), "confidence": 0.01 * i as f64 }))
            .collect();
        let body = json!({ "predictions": [{ "detections": entries }] });
        let verdict = Verdict::from_json(&body).unwrap();

        assert_eq!(verdict.detections_count, 14);
        assert_eq!(verdict.detections.len(), MAX_REPORTED_DETECTIONS);
        assert_eq!(verdict.detections[0].class, "obj0");
        assert_eq!(verdict.detections[9].class, "obj9");
        assert!((verdict.confidence - 0.13).abs() < 1e-9);
    }

    #[test]
    fn failed_verdict_is_negative_with_error() {
        let verdict = Verdict::failed("Inference endpoint returned HTTP 503");
        assert!(!verdict.fire_detected);
        assert_eq!(verdict.confidence, 0.0);
        assert!(verdict.is_error());
    }

    #[test]
    fn fire_keywords_match_case_insensitively() {
        assert!(is_fire_class("FIRE"));
        assert!(is_fire_class("wildfire"));
        assert!(is_fire_class("Fuego"));
        assert!(!is_fire_class("person"));
    }
}
