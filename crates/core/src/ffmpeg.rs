//! FFmpeg transcoding for captured device streams.
//!
//! The device hands out an MJPEG stream for video and WAV for audio; both are
//! normalized into upload-friendly containers with a fixed argument template:
//! `ffmpeg -y -loglevel error -t <duration> -i <raw> <codec-args> <output>`.

use std::path::Path;

/// Codec arguments for MJPEG → H.264 MP4.
pub const VIDEO_CODEC_ARGS: &[&str] = &["-c:v", "libx264", "-pix_fmt", "yuv420p"];

/// Codec arguments for WAV → MP3.
pub const AUDIO_CODEC_ARGS: &[&str] = &["-codec:a", "libmp3lame", "-qscale:a", "4"];

/// Error type for FFmpeg operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("ffmpeg produced no output at {0}")]
    EmptyOutput(String),

    #[error("input file not found: {0}")]
    InputNotFound(String),
}

/// Build the full argument list for one transcode.
pub fn transcode_args(
    input: &Path,
    output: &Path,
    duration_secs: u64,
    codec_args: &[&str],
) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-loglevel", "error", "-t"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(duration_secs.to_string());
    args.push("-i".into());
    args.push(input.to_string_lossy().into_owned());
    args.extend(codec_args.iter().map(|s| s.to_string()));
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Run ffmpeg to completion and verify it produced a non-empty file.
pub async fn transcode(
    input: &Path,
    output: &Path,
    duration_secs: u64,
    codec_args: &[&str],
) -> Result<(), FfmpegError> {
    if !input.exists() {
        return Err(FfmpegError::InputNotFound(
            input.to_string_lossy().to_string(),
        ));
    }

    let result = tokio::process::Command::new("ffmpeg")
        .args(transcode_args(input, output, duration_secs, codec_args))
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !result.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: result.status.code(),
            stderr: String::from_utf8_lossy(&result.stderr).to_string(),
        });
    }

    let written = tokio::fs::metadata(output)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if written == 0 {
        return Err(FfmpegError::EmptyOutput(
            output.to_string_lossy().to_string(),
        ));
    }

    Ok(())
}
