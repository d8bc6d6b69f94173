//! Sensor alert records.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, Timestamp};

/// State reported by the sensor. Unrecognized strings collapse to `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SensorState {
    Alert,
    Normal,
    #[default]
    Unknown,
}

impl From<String> for SensorState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "alert" => SensorState::Alert,
            "normal" => SensorState::Normal,
            _ => SensorState::Unknown,
        }
    }
}

/// Alert data before the ledger assigns it an id.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub timestamp: Timestamp,
    pub temperature: f64,
    pub light_level: f64,
    pub state: SensorState,
}

/// An alert as stored in the ledger. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub id: RecordId,
    pub timestamp: Timestamp,
    pub temperature: f64,
    pub light_level: f64,
    pub state: SensorState,
}

impl AlertRecord {
    pub fn is_alert(&self) -> bool {
        self.state == SensorState::Alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_states_pass_through_as_unknown() {
        let state: SensorState = serde_json::from_value(serde_json::json!("smouldering")).unwrap();
        assert_eq!(state, SensorState::Unknown);
    }

    #[test]
    fn known_states_round_trip_lowercase() {
        let state: SensorState = serde_json::from_value(serde_json::json!("alert")).unwrap();
        assert_eq!(state, SensorState::Alert);
        assert_eq!(serde_json::to_value(SensorState::Normal).unwrap(), "normal");
    }

    #[test]
    fn missing_state_defaults_to_unknown() {
        assert_eq!(SensorState::default(), SensorState::Unknown);
    }
}
