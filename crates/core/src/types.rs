/// Ledger record identifiers, assigned sequentially from 1.
pub type RecordId = u64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current instant truncated to whole seconds.
pub fn now_seconds() -> Timestamp {
    use chrono::SubsecRound;
    chrono::Utc::now().trunc_subsecs(0)
}
