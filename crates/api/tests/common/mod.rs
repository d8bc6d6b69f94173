#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use firewatch_api::config::ServerConfig;
use firewatch_api::pipeline::{Pipeline, PipelineSettings};
use firewatch_api::router::build_app_router;
use firewatch_api::state::AppState;
use firewatch_capture::{DeviceCapture, DeviceConfig};
use firewatch_cloud::inference::{Classifier, VideoOptions};
use firewatch_cloud::storage::{ObjectStore, StorageError, Uploader};
use firewatch_core::ledger::Ledger;
use firewatch_core::verdict::{Detection, Verdict};
use firewatch_events::{AlertNotification, Notifier, ResultNotification};

pub const TEST_BUCKET: &str = "evidence";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// In-memory object store that counts uploads.
pub struct FakeStore {
    pub fail: bool,
    pub uploads: AtomicUsize,
}

#[async_trait]
impl ObjectStore for FakeStore {
    fn scheme(&self) -> &'static str {
        "gs"
    }

    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    async fn put_public(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::HttpStatus {
                status: 403,
                body: "denied".into(),
            });
        }
        Ok(format!("https://storage.test/{TEST_BUCKET}/{key}"))
    }
}

/// Classifier returning canned verdicts.
pub struct FakeClassifier {
    pub image: Verdict,
    pub video: Verdict,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify_image(&self, _storage_uri: &str) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.image.clone()
    }

    async fn classify_video(&self, _storage_uri: &str, _options: &VideoOptions) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.video.clone()
    }
}

/// Notifier that records payloads and answers with a fixed outcome.
pub struct FakeNotifier {
    pub deliver: bool,
    pub alerts: Mutex<Vec<serde_json::Value>>,
    pub results: Mutex<Vec<serde_json::Value>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_alert_notification(&self, payload: &AlertNotification) -> bool {
        self.alerts
            .lock()
            .unwrap()
            .push(serde_json::to_value(payload).unwrap());
        self.deliver
    }

    async fn send_result_notification(&self, payload: &ResultNotification) -> bool {
        self.results
            .lock()
            .unwrap()
            .push(serde_json::to_value(payload).unwrap());
        self.deliver
    }
}

pub fn verdict(class: &str, confidence: f64) -> Verdict {
    Verdict {
        fire_detected: firewatch_core::verdict::is_fire_class(class),
        confidence,
        detections_count: 1,
        detections: vec![Detection {
            class: class.to_string(),
            confidence,
        }],
        error: None,
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

/// Knobs for [`build_test_app`].
pub struct TestOptions {
    pub store_fails: bool,
    pub image: Verdict,
    pub video: Verdict,
    pub deliver: bool,
    pub auto_capture: bool,
    pub device_url: String,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            store_fails: false,
            image: verdict("person", 0.4),
            video: verdict("person", 0.3),
            deliver: true,
            auto_capture: false,
            // Discard port: nothing listens there.
            device_url: "http://127.0.0.1:9".to_string(),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub ledger: Arc<Ledger>,
    pub store: Arc<FakeStore>,
    pub classifier: Arc<FakeClassifier>,
    pub notifier: Arc<FakeNotifier>,
    /// Keeps the capture scratch directory alive for the test's duration.
    pub capture_dir: tempfile::TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

/// Build the full application router, with fakes for every external service.
pub fn build_test_app(options: TestOptions) -> TestApp {
    let config = test_config();
    let capture_dir = tempfile::tempdir().unwrap();

    let ledger = Arc::new(Ledger::new());
    let store = Arc::new(FakeStore {
        fail: options.store_fails,
        uploads: AtomicUsize::new(0),
    });
    let classifier = Arc::new(FakeClassifier {
        image: options.image,
        video: options.video,
        calls: AtomicUsize::new(0),
    });
    let notifier = Arc::new(FakeNotifier {
        deliver: options.deliver,
        alerts: Mutex::new(Vec::new()),
        results: Mutex::new(Vec::new()),
    });

    let settings = PipelineSettings {
        public_base_url: "http://relay.test".to_string(),
        auto_capture: options.auto_capture,
        recipient: Some("ops@example.com".to_string()),
        video: VideoOptions::default(),
    };
    let device = DeviceCapture::new(DeviceConfig {
        base_url: options.device_url,
        capture_video: false,
        capture_audio: false,
        duration: Duration::from_secs(1),
        capture_dir: capture_dir.path().to_path_buf(),
    });

    let pipeline = Pipeline::new(
        settings,
        Arc::clone(&ledger),
        Uploader::new(store.clone()),
        classifier.clone(),
        notifier.clone(),
        device,
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        ledger: Arc::clone(&ledger),
        pipeline: Arc::new(pipeline),
    };

    TestApp {
        router: build_app_router(state, &config),
        ledger,
        store,
        classifier,
        notifier,
        capture_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST with no body and no content type.
pub async fn post_empty(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST a multipart form with a single file field.
pub async fn post_multipart(app: &Router, uri: &str, field: &str, data: &[u8]) -> Response {
    let boundary = "firewatch-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{field}.bin\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Wait until the background alert notification has been recorded.
pub async fn wait_for_alert_notifications(notifier: &FakeNotifier, expected: usize) {
    for _ in 0..100 {
        if notifier.alerts.lock().unwrap().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} alert notifications");
}
