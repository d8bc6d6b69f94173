//! Bearer credential provider for the storage and inference APIs.
//!
//! One [`CredentialProvider`] is shared by every authenticated client. Callers
//! invoke [`CredentialProvider::ensure_valid`] right before each request; the
//! provider hands back a cached token or fetches a fresh one. A failed fetch
//! is reported once and not retried.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

/// GCE/Cloud Run metadata endpoint for the default service account token.
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Timeout for the metadata token request.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Auth token unavailable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Auth token unavailable: metadata server returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where bearer tokens come from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// A fixed token, e.g. from `gcloud auth print-access-token`.
    Static(String),
    /// The instance metadata server at the given URL.
    MetadataServer { token_url: String },
}

impl CredentialSource {
    /// `GCP_ACCESS_TOKEN` wins when set; otherwise the metadata server
    /// (`GCP_METADATA_TOKEN_URL`, defaulting to the well-known address).
    pub fn from_env() -> Self {
        match std::env::var("GCP_ACCESS_TOKEN") {
            Ok(token) if !token.trim().is_empty() => CredentialSource::Static(token.trim().into()),
            _ => CredentialSource::MetadataServer {
                token_url: std::env::var("GCP_METADATA_TOKEN_URL")
                    .unwrap_or_else(|_| DEFAULT_METADATA_TOKEN_URL.into()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CredentialProvider
// ---------------------------------------------------------------------------

pub struct CredentialProvider {
    client: reqwest::Client,
    source: CredentialSource,
    cache: RwLock<Option<CachedToken>>,
}

impl CredentialProvider {
    pub fn new(source: CredentialSource) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            source,
            cache: RwLock::new(None),
        }
    }

    /// Return a token that is valid for at least the expiry margin.
    pub async fn ensure_valid(&self) -> Result<String, CredentialError> {
        let token_url = match &self.source {
            CredentialSource::Static(token) => return Ok(token.clone()),
            CredentialSource::MetadataServer { token_url } => token_url,
        };

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Utc::now() + chrono::Duration::seconds(EXPIRY_MARGIN_SECS) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        let fresh = self.fetch_metadata_token(token_url).await?;
        let token = fresh.access_token.clone();
        *cache = Some(CachedToken {
            token: fresh.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(fresh.expires_in),
        });
        tracing::debug!(expires_in = fresh.expires_in, "Refreshed access token");
        Ok(token)
    }

    async fn fetch_metadata_token(
        &self,
        token_url: &str,
    ) -> Result<MetadataTokenResponse, CredentialError> {
        let response = self
            .client
            .get(token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CredentialError::HttpStatus(response.status().as_u16()));
        }

        Ok(response.json::<MetadataTokenResponse>().await?)
    }
}
