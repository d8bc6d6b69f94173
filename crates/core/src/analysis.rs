//! Analysis records and the multi-asset verdict combination policy.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::media::MediaKind;
use crate::types::{RecordId, Timestamp};
use crate::verdict::Verdict;

/// Analysis data before the ledger assigns it an id.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub timestamp: Timestamp,
    pub files: BTreeMap<MediaKind, String>,
    pub fire_detected: bool,
    pub confidence: f64,
    pub notification_sent: bool,
}

/// One `/analyze` outcome as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub id: RecordId,
    pub timestamp: Timestamp,
    pub files: BTreeMap<MediaKind, String>,
    pub fire_detected: bool,
    pub confidence: f64,
    pub notification_sent: bool,
}

/// Combined fire flag and confidence across the classified assets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedVerdict {
    pub fire_detected: bool,
    pub confidence: f64,
}

/// Combine per-asset verdicts into one flag/confidence pair.
///
/// `fire_detected` is the OR of every verdict. When at least one verdict is
/// positive, `confidence` is the maximum among the positive verdicts;
/// otherwise it is the maximum raw confidence across all verdicts. No
/// verdicts yields `false, 0.0`.
pub fn combine_verdicts<'a>(verdicts: impl IntoIterator<Item = &'a Verdict>) -> CombinedVerdict {
    let mut any_max = 0.0_f64;
    let mut positive_max: Option<f64> = None;

    for verdict in verdicts {
        any_max = any_max.max(verdict.confidence);
        if verdict.fire_detected {
            positive_max = Some(positive_max.unwrap_or(0.0).max(verdict.confidence));
        }
    }

    match positive_max {
        Some(confidence) => CombinedVerdict {
            fire_detected: true,
            confidence,
        },
        None => CombinedVerdict {
            fire_detected: false,
            confidence: any_max,
        },
    }
}
