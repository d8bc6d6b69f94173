//! Evidence media kinds and their storage/content-type conventions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The three kinds of evidence an operator or the device can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Photo, MediaKind::Video, MediaKind::Audio];

    /// Lowercase name, also used as the multipart field name and key prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    /// Top-level folder in the bucket.
    pub fn category(self) -> &'static str {
        match self {
            MediaKind::Photo => "photos",
            MediaKind::Video => "videos",
            MediaKind::Audio => "audio",
        }
    }

    /// File extension of the normalized container.
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            MediaKind::Photo => "image/jpeg",
            MediaKind::Video => "video/mp4",
            MediaKind::Audio => "audio/mpeg",
        }
    }

    /// Only photos and videos are sent to the classifier.
    pub fn is_classified(self) -> bool {
        !matches!(self, MediaKind::Audio)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(MediaKind::Photo),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            other => Err(CoreError::Validation(format!(
                "Unknown media kind '{other}'. Must be one of: photo, video, audio"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        for kind in MediaKind::ALL {
            assert_eq!(kind.as_str().parse::<MediaKind>().unwrap(), kind);
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "thermal".parse::<MediaKind>().unwrap_err();
        assert!(err.to_string().contains("thermal"));
    }

    #[test]
    fn audio_is_never_classified() {
        assert!(MediaKind::Photo.is_classified());
        assert!(MediaKind::Video.is_classified());
        assert!(!MediaKind::Audio.is_classified());
    }
}
