//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from tnb-core.
//! The client is bound to one bucket for its lifetime; the pipeline never
//! touches more than one.

use async_trait::async_trait;
use jiff::Timestamp;

use tnb_core::{Error, ObjectStore, Result, StoredObject};

/// Object store connection settings for one run
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

/// S3 client wrapper bound to one bucket
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from store settings
    ///
    /// Uses static credentials, a custom endpoint, and path-style
    /// addressing for compatibility with MinIO and friends.
    pub async fn new(store: &StoreConfig) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            store.access_key.clone(),
            store.secret_key.clone(),
            None, // session token
            None, // expiry
            "tnb-static-credentials",
        );

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(store.region.clone()))
            .endpoint_url(&store.endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: store.bucket.clone(),
        })
    }

    /// Bucket this client writes to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Format AWS SDK error into a detailed error message
    fn format_sdk_error<E: std::fmt::Display>(error: &aws_sdk_s3::error::SdkError<E>) -> String {
        match error {
            aws_sdk_s3::error::SdkError::ServiceError(service_err) => {
                format!("service error: {}", service_err.err())
            }
            aws_sdk_s3::error::SdkError::ConstructionFailure(err) => {
                format!("request construction failed: {err:?}")
            }
            aws_sdk_s3::error::SdkError::TimeoutError(_) => "request timeout".to_string(),
            aws_sdk_s3::error::SdkError::DispatchFailure(err) => {
                format!("network dispatch error: {err:?}")
            }
            aws_sdk_s3::error::SdkError::ResponseError(err) => {
                format!("response error: {err:?}")
            }
            _ => error.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);

        self.inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| Error::Upload(Self::format_sdk_error(&e)))?;

        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>> {
        let mut request = self.inner.list_objects_v2().bucket(&self.bucket);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        let mut objects = Vec::new();
        let mut pages = request.into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page
                .map_err(|e| Error::Store(format!("listing objects: {}", Self::format_sdk_error(&e))))?;
            for object in page.contents() {
                objects.push(StoredObject {
                    key: object.key().unwrap_or_default().to_string(),
                    last_modified: object
                        .last_modified()
                        .and_then(|dt| Timestamp::from_second(dt.secs()).ok()),
                });
            }
        }

        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Error::Store(Self::format_sdk_error(&e)))?;

        Ok(())
    }
}
