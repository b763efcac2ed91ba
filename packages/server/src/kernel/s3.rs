//! S3-backed object store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use super::traits::BaseObjectStore;

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl S3ObjectStore {
    /// Build a store using the ambient AWS credential chain.
    pub async fn from_env(bucket: String, region: String) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket,
            region,
        }
    }
}

#[async_trait]
impl BaseObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .with_context(|| format!("failed to upload s3://{}/{}", self.bucket, key))?;

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }
}
