//! In-memory, append-only ledger of alerts and analyses.
//!
//! Both lists live behind one `tokio::sync::Mutex` so that id assignment and
//! append happen atomically; concurrent handlers never observe a torn list or
//! reuse an id. Nothing is persisted: the ledger lives as long as the process.

use tokio::sync::Mutex;

use crate::alert::{AlertRecord, NewAlert};
use crate::analysis::{AnalysisRecord, NewAnalysis};
use crate::types::RecordId;

#[derive(Default)]
struct LedgerInner {
    alerts: Vec<AlertRecord>,
    analyses: Vec<AnalysisRecord>,
    last_alert_id: RecordId,
    last_analysis_id: RecordId,
}

/// Process-lifetime record store, designed to be shared via `Arc<Ledger>`.
#[derive(Default)]
pub struct Ledger {
    inner: Mutex<LedgerInner>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next alert id and append. Returns the stored record.
    pub async fn append_alert(&self, alert: NewAlert) -> AlertRecord {
        let mut inner = self.inner.lock().await;
        inner.last_alert_id += 1;
        let record = AlertRecord {
            id: inner.last_alert_id,
            timestamp: alert.timestamp,
            temperature: alert.temperature,
            light_level: alert.light_level,
            state: alert.state,
        };
        inner.alerts.push(record.clone());
        record
    }

    /// Assign the next analysis id and append. Returns the stored record.
    pub async fn append_analysis(&self, analysis: NewAnalysis) -> AnalysisRecord {
        let mut inner = self.inner.lock().await;
        inner.last_analysis_id += 1;
        let record = AnalysisRecord {
            id: inner.last_analysis_id,
            timestamp: analysis.timestamp,
            files: analysis.files,
            fire_detected: analysis.fire_detected,
            confidence: analysis.confidence,
            notification_sent: analysis.notification_sent,
        };
        inner.analyses.push(record.clone());
        record
    }

    /// The last `n` alerts in insertion order.
    pub async fn recent_alerts(&self, n: usize) -> Vec<AlertRecord> {
        let inner = self.inner.lock().await;
        tail(&inner.alerts, n)
    }

    /// The last `n` analyses in insertion order.
    pub async fn recent_analyses(&self, n: usize) -> Vec<AnalysisRecord> {
        let inner = self.inner.lock().await;
        tail(&inner.analyses, n)
    }

    pub async fn count_alerts_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&AlertRecord) -> bool,
    {
        let inner = self.inner.lock().await;
        inner.alerts.iter().filter(|&a| predicate(a)).count()
    }

    pub async fn count_analyses_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&AnalysisRecord) -> bool,
    {
        let inner = self.inner.lock().await;
        inner.analyses.iter().filter(|&a| predicate(a)).count()
    }

    pub async fn total_alerts(&self) -> usize {
        self.inner.lock().await.alerts.len()
    }

    pub async fn total_analyses(&self) -> usize {
        self.inner.lock().await.analyses.len()
    }
}

fn tail<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::alert::SensorState;
    use crate::types::now_seconds;

    fn new_alert(state: SensorState) -> NewAlert {
        NewAlert {
            timestamp: now_seconds(),
            temperature: 41.5,
            light_level: 620.0,
            state,
        }
    }

    fn new_analysis(fire: bool) -> NewAnalysis {
        NewAnalysis {
            timestamp: now_seconds(),
            files: BTreeMap::new(),
            fire_detected: fire,
            confidence: 0.5,
            notification_sent: false,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let ledger = Ledger::new();
        let first = ledger.append_alert(new_alert(SensorState::Alert)).await;
        let second = ledger.append_alert(new_alert(SensorState::Normal)).await;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let analysis = ledger.append_analysis(new_analysis(true)).await;
        assert_eq!(analysis.id, 1, "analysis ids use their own sequence");
    }

    #[tokio::test]
    async fn recent_returns_last_n_in_insertion_order() {
        let ledger = Ledger::new();
        for _ in 0..25 {
            ledger.append_alert(new_alert(SensorState::Normal)).await;
        }

        let recent = ledger.recent_alerts(10).await;
        let ids: Vec<_> = recent.iter().map(|a| a.id).collect();
        assert_eq!(ids, (16..=25).collect::<Vec<_>>());

        assert_eq!(ledger.recent_alerts(100).await.len(), 25);
        assert!(ledger.recent_analyses(10).await.is_empty());
    }

    #[tokio::test]
    async fn counts_filter_by_predicate() {
        let ledger = Ledger::new();
        ledger.append_alert(new_alert(SensorState::Alert)).await;
        ledger.append_alert(new_alert(SensorState::Normal)).await;
        ledger.append_alert(new_alert(SensorState::Alert)).await;
        ledger.append_analysis(new_analysis(true)).await;
        ledger.append_analysis(new_analysis(false)).await;

        assert_eq!(ledger.count_alerts_where(AlertRecord::is_alert).await, 2);
        assert_eq!(ledger.count_analyses_where(|a| a.fire_detected).await, 1);
        assert_eq!(ledger.total_alerts().await, 3);
        assert_eq!(ledger.total_analyses().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_yield_contiguous_ids() {
        let ledger = Arc::new(Ledger::new());
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move { ledger.append_alert(new_alert(SensorState::Alert)).await.id })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=64).collect::<Vec<_>>());
        assert_eq!(ledger.total_alerts().await, 64);
    }
}
