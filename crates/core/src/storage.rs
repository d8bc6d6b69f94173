//! Object key scheme and storage URI derivation.
//!
//! Keys look like `photos/photo_20240101_120000.jpg`; the storage URI handed
//! to the classifier is `<scheme>://<bucket>/<key>`.

use crate::media::MediaKind;
use crate::types::Timestamp;

/// URI scheme for Google Cloud Storage objects.
pub const SCHEME_GCS: &str = "gs";

/// URI scheme for Amazon S3 objects.
pub const SCHEME_S3: &str = "s3";

/// Timestamp layout embedded in object keys.
const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build the object key for an evidence asset captured at `at`.
pub fn object_key(kind: MediaKind, at: Timestamp) -> String {
    format!(
        "{}/{}_{}.{}",
        kind.category(),
        kind.as_str(),
        at.format(KEY_TIMESTAMP_FORMAT),
        kind.extension()
    )
}

/// Derive the scheme-qualified storage URI for `key` in `bucket`.
pub fn storage_uri(scheme: &str, bucket: &str, key: &str) -> String {
    format!("{scheme}://{bucket}/{key}")
}
