//! Amazon S3 backend.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use firewatch_core::storage::SCHEME_S3;

use super::{ObjectStore, StorageError};

/// Region assumed when the AWS environment does not name one.
const FALLBACK_REGION: &str = "us-east-1";

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl S3Store {
    /// Build a client from the standard AWS environment/profile chain.
    pub async fn from_env(bucket: String) -> Self {
        let sdk_config = aws_config::load_from_env().await;
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| FALLBACK_REGION.to_string());
        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket,
            region,
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn scheme(&self) -> &'static str {
        SCHEME_S3
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
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::S3(DisplayErrorContext(e).to_string()))?;

        Ok(self.public_url(key))
    }
}
