use std::path::PathBuf;
use std::time::Duration;

/// Default phone endpoint when `PHONE_IP` is unset.
const DEFAULT_DEVICE_URL: &str = "http://192.168.1.100:8080";

/// Default capture window in seconds.
const DEFAULT_DURATION_SECS: u64 = 5;

/// Configuration for pulling evidence from the capture device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Base URL of the phone's camera server, without a trailing slash.
    pub base_url: String,
    /// Whether video is pulled on an alert.
    pub capture_video: bool,
    /// Whether audio is pulled on an alert.
    pub capture_audio: bool,
    /// Upper bound on the video/audio recording window.
    pub duration: Duration,
    /// Scratch directory for raw and transcoded files.
    pub capture_dir: PathBuf,
}

impl DeviceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var         | Default                      |
    /// |-----------------|------------------------------|
    /// | `PHONE_IP`      | `http://192.168.1.100:8080`  |
    /// | `CAPTURE_VIDEO` | `true`                       |
    /// | `CAPTURE_AUDIO` | `true`                       |
    /// | `DURATION`      | `5`                          |
    /// | `CAPTURE_DIR`   | `captures`                   |
    pub fn from_env() -> Self {
        let base_url = std::env::var("PHONE_IP")
            .unwrap_or_else(|_| DEFAULT_DEVICE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let duration_secs = std::env::var("DURATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DURATION_SECS);

        Self {
            base_url,
            capture_video: env_flag("CAPTURE_VIDEO", true),
            capture_audio: env_flag("CAPTURE_AUDIO", true),
            duration: Duration::from_secs(duration_secs),
            capture_dir: std::env::var("CAPTURE_DIR")
                .unwrap_or_else(|_| "captures".into())
                .into(),
        }
    }
}

/// Read a boolean toggle; only a case-insensitive `true` enables it.
pub fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => value.trim().eq_ignore_ascii_case("true"),
        Err(_) => default,
    }
}
