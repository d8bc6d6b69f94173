//! Integration tests for [`DeviceCapture`] against a mocked camera server.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firewatch_capture::{DeviceCapture, DeviceConfig};

fn config_for(base_url: &str, capture_dir: &std::path::Path) -> DeviceConfig {
    DeviceConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        capture_video: true,
        capture_audio: true,
        duration: Duration::from_secs(1),
        capture_dir: capture_dir.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Photo
// ---------------------------------------------------------------------------

#[tokio::test]
async fn photo_returns_device_bytes() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/photo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .expect(1)
        .mount(&server)
        .await;

    let capture = DeviceCapture::new(config_for(&server.uri(), dir.path()));
    let bytes = capture.capture_photo().await.expect("photo should be captured");

    assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
}

#[tokio::test]
async fn photo_non_200_is_absent_and_not_retried() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/photo.jpg"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let capture = DeviceCapture::new(config_for(&server.uri(), dir.path()));
    assert!(capture.capture_photo().await.is_none());
}

#[tokio::test]
async fn unreachable_device_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    // Port 9 (discard) on localhost is not expected to serve HTTP.
    let capture = DeviceCapture::new(config_for("http://127.0.0.1:9", dir.path()));
    assert!(capture.capture_photo().await.is_none());
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_video_stream_is_absent() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/video"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let capture = DeviceCapture::new(config_for(&server.uri(), dir.path()));
    assert!(capture.capture_video(Duration::from_secs(1)).await.is_none());
}

#[tokio::test]
async fn untranscodable_audio_is_absent_and_scratch_files_removed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Not a WAV file: ffmpeg (if installed) rejects it; if ffmpeg is missing
    // the capture fails earlier. Either way the asset must be absent.
    Mock::given(method("GET"))
        .and(path("/audio.wav"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not audio".to_vec()))
        .mount(&server)
        .await;

    let capture = DeviceCapture::new(config_for(&server.uri(), dir.path()));
    assert!(capture.capture_audio(Duration::from_secs(1)).await.is_none());

    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "scratch files must be cleaned up");
}
