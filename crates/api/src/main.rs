use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firewatch_api::config::ServerConfig;
use firewatch_api::pipeline::{Pipeline, PipelineSettings};
use firewatch_api::router::build_app_router;
use firewatch_api::state::AppState;
use firewatch_capture::{DeviceCapture, DeviceConfig};
use firewatch_cloud::credentials::{CredentialProvider, CredentialSource};
use firewatch_cloud::inference::{InferenceClient, InferenceConfig};
use firewatch_cloud::storage::{build_store, StorageConfig, Uploader};
use firewatch_core::ledger::Ledger;
use firewatch_events::{NotificationConfig, NotificationDispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let (json_layer, text_layer) = if json_logs {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firewatch_api=debug,tower_http=debug".into()),
        )
        .with(json_layer)
        .with(text_layer)
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let settings = PipelineSettings::from_env();
    let device_config = DeviceConfig::from_env();
    let storage_config = StorageConfig::from_env();
    let inference_config = InferenceConfig::from_env();
    let notification_config = NotificationConfig::from_env();

    if inference_config.endpoint_url.is_none() {
        tracing::warn!("INFERENCE_ENDPOINT_URL not set, every classification will fail");
    }

    // --- Collaborators ---
    let credentials = Arc::new(CredentialProvider::new(CredentialSource::from_env()));
    let store = build_store(&storage_config, Arc::clone(&credentials)).await;
    tracing::info!(
        backend = ?storage_config.backend,
        bucket = %storage_config.bucket,
        "Object store ready"
    );
    let classifier = Arc::new(InferenceClient::new(
        inference_config.endpoint_url.clone(),
        Arc::clone(&credentials),
    ));
    let notifier = Arc::new(NotificationDispatcher::new(&notification_config));

    // --- App state ---
    let ledger = Arc::new(Ledger::new());
    let pipeline = Pipeline::new(
        settings,
        Arc::clone(&ledger),
        Uploader::new(store),
        classifier,
        notifier,
        DeviceCapture::new(device_config),
    );
    let state = AppState {
        config: Arc::new(config.clone()),
        ledger,
        pipeline: Arc::new(pipeline),
    };

    log_startup_banner(&state, &config);

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Log the capture setup and the URL the sensor has to post to.
fn log_startup_banner(state: &AppState, config: &ServerConfig) {
    let settings = state.pipeline.settings();
    let device = state.pipeline.device_config();
    tracing::info!(
        device_url = %device.base_url,
        auto_capture = settings.auto_capture,
        capture_video = device.capture_video,
        capture_audio = device.capture_audio,
        duration_secs = device.duration.as_secs(),
        "Capture configuration"
    );

    match local_ip() {
        Some(ip) => tracing::info!(
            local_ip = %ip,
            sensor_url = %format!("http://{ip}:{}/alert", config.port),
            "Sensor must post alerts to this URL"
        ),
        None => tracing::warn!("Could not determine local IP address"),
    }
}

/// Address of the interface used for outbound traffic. No packet is sent.
fn local_ip() -> Option<std::net::IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
