//! Firewatch domain core.
//!
//! Pure types and logic shared by the capture, cloud, events, and API crates:
//! ledger records, the in-memory ledger, storage key scheme, inference
//! response normalization, and the ffmpeg transcoder wrapper.

pub mod alert;
pub mod analysis;
pub mod error;
pub mod ffmpeg;
pub mod ledger;
pub mod media;
pub mod storage;
pub mod types;
pub mod verdict;
