//! Google Cloud Storage backend via the JSON upload API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use firewatch_core::storage::SCHEME_GCS;

use super::{ObjectStore, StorageError};
use crate::credentials::CredentialProvider;

/// Upload timeout; video clips can be several megabytes.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

pub struct GcsStore {
    client: reqwest::Client,
    api_base: String,
    bucket: String,
    credentials: Arc<CredentialProvider>,
}

impl GcsStore {
    pub fn new(api_base: String, bucket: String, credentials: Arc<CredentialProvider>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bucket,
            credentials,
        }
    }

    /// Public HTTP URL of an object with a public-read ACL.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.api_base, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    fn scheme(&self) -> &'static str {
        SCHEME_GCS
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_public(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let token = self.credentials.ensure_valid().await?;
        let url = format!("{}/upload/storage/v1/b/{}/o", self.api_base, self.bucket);

        let response = self
            .client
            .post(&url)
            .query(&[
                ("uploadType", "media"),
                ("name", key),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.public_url(key))
    }
}
