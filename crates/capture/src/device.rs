//! Evidence capture from the phone camera server.
//!
//! Photos are a single `GET /photo.jpg`. Video (`/video`, MJPEG) and audio
//! (`/audio.wav`) are streamed into a scratch file until the stream ends or
//! the capture window elapses, then normalized with ffmpeg. The window is a
//! ceiling: the chunk that crosses it is written in full.
//!
//! Public capture methods never fail: errors are logged and the asset is
//! reported as absent so the pipeline can carry on with what it has.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;

use firewatch_core::ffmpeg::{self, FfmpegError, AUDIO_CODEC_ARGS, VIDEO_CODEC_ARGS};
use firewatch_core::media::MediaKind;

use crate::config::DeviceConfig;

/// Timeout for the photo request and for connecting/reading streams.
const DEVICE_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Network failure talking to the device.
    #[error("Device unreachable: {0}")]
    DeviceUnreachable(#[from] reqwest::Error),

    /// The device answered with something other than 200.
    #[error("Device returned HTTP {0}")]
    DeviceStatus(u16),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(#[from] FfmpegError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Stream descriptors
// ---------------------------------------------------------------------------

struct StreamSpec {
    path: &'static str,
    raw_extension: &'static str,
    codec_args: &'static [&'static str],
}

fn stream_spec(kind: MediaKind) -> Option<StreamSpec> {
    match kind {
        MediaKind::Photo => None,
        MediaKind::Video => Some(StreamSpec {
            path: "/video",
            raw_extension: "mjpeg",
            codec_args: VIDEO_CODEC_ARGS,
        }),
        MediaKind::Audio => Some(StreamSpec {
            path: "/audio.wav",
            raw_extension: "wav",
            codec_args: AUDIO_CODEC_ARGS,
        }),
    }
}

// ---------------------------------------------------------------------------
// DeviceCapture
// ---------------------------------------------------------------------------

/// Pulls photo, video, and audio evidence from the configured device.
pub struct DeviceCapture {
    client: reqwest::Client,
    config: DeviceConfig,
}

impl DeviceCapture {
    pub fn new(config: DeviceConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(DEVICE_TIMEOUT)
            .read_timeout(DEVICE_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Capture one asset of `kind`. `duration` is ignored for photos.
    pub async fn capture(&self, kind: MediaKind, duration: Duration) -> Option<Vec<u8>> {
        let result = match stream_spec(kind) {
            None => self.fetch_photo().await,
            Some(spec) => self.record_stream(kind, &spec, duration).await,
        };

        match result {
            Ok(bytes) => {
                tracing::info!(kind = %kind, bytes = bytes.len(), "Captured evidence from device");
                Some(bytes)
            }
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "Evidence capture failed");
                None
            }
        }
    }

    pub async fn capture_photo(&self) -> Option<Vec<u8>> {
        self.capture(MediaKind::Photo, Duration::ZERO).await
    }

    pub async fn capture_video(&self, duration: Duration) -> Option<Vec<u8>> {
        self.capture(MediaKind::Video, duration).await
    }

    pub async fn capture_audio(&self, duration: Duration) -> Option<Vec<u8>> {
        self.capture(MediaKind::Audio, duration).await
    }

    async fn fetch_photo(&self) -> Result<Vec<u8>, CaptureError> {
        let url = format!("{}/photo.jpg", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(DEVICE_TIMEOUT)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(CaptureError::DeviceStatus(response.status().as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn record_stream(
        &self,
        kind: MediaKind,
        spec: &StreamSpec,
        duration: Duration,
    ) -> Result<Vec<u8>, CaptureError> {
        tokio::fs::create_dir_all(&self.config.capture_dir).await?;

        let stem = format!("{}_{}", kind.as_str(), uuid::Uuid::new_v4().simple());
        let raw_path = self
            .config
            .capture_dir
            .join(format!("{stem}.{}", spec.raw_extension));
        let final_path = self
            .config
            .capture_dir
            .join(format!("{stem}.{}", kind.extension()));

        let result = self
            .record_and_transcode(spec, duration, &raw_path, &final_path)
            .await;

        remove_if_present(&raw_path).await;
        remove_if_present(&final_path).await;

        result
    }

    async fn record_and_transcode(
        &self,
        spec: &StreamSpec,
        duration: Duration,
        raw_path: &Path,
        final_path: &Path,
    ) -> Result<Vec<u8>, CaptureError> {
        let url = format!("{}{}", self.config.base_url, spec.path);
        let written = self.stream_to_file(&url, duration, raw_path).await?;
        tracing::debug!(url = %url, bytes = written, "Stream captured, transcoding");

        ffmpeg::transcode(raw_path, final_path, duration.as_secs(), spec.codec_args).await?;

        Ok(tokio::fs::read(final_path).await?)
    }

    /// Copy the response body into `path` until it ends or `duration` passes.
    async fn stream_to_file(
        &self,
        url: &str,
        duration: Duration,
        path: &Path,
    ) -> Result<u64, CaptureError> {
        let mut response = self.client.get(url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(CaptureError::DeviceStatus(response.status().as_u16()));
        }

        let mut file = tokio::fs::File::create(path).await?;
        let started = Instant::now();
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if started.elapsed() >= duration {
                break;
            }
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Best-effort cleanup; a missing file just means an earlier step failed.
async fn remove_if_present(path: &Path) {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove capture file");
        }
    }
}
