use std::str::Utf8Error;
use std::time::Instant;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStreamError;
use aws_sdk_s3::Client;
use percent_encoding::percent_decode_str;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("object key is not valid UTF-8 once decoded: {0}")]
    InvalidKey(#[from] Utf8Error),
    #[error("get_object s3://{bucket}/{key} failed: {message}")]
    Request {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("failed reading object body: {0}")]
    Body(#[from] ByteStreamError),
}

/// Read-only access to the bucket holding the original images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl ObjectStore for Client {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError> {
        tracing::info!(bucket, key, "fetching original image");
        let start_time = Instant::now();
        let response = self
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        tracing::info!(
            "Received response from S3 in {}ms",
            start_time.elapsed().as_millis()
        );

        let capacity = response
            .content_length
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(1024 * 1024);
        let mut data = Vec::with_capacity(capacity);
        let mut body = response.body;
        while let Some(result) = body.next().await {
            let bytes = result?;
            data.extend_from_slice(&bytes[..]);
        }

        tracing::info!(
            "Downloaded {} from S3 in {}ms. Actual size: {} bytes",
            key,
            start_time.elapsed().as_millis(),
            data.len()
        );

        Ok(data)
    }
}

/// Object key for a CloudFront request path: percent-decoded, without the
/// leading `/`. Unlike S3 event keys, `+` is kept literally.
pub fn object_key_from_uri(uri: &str) -> Result<String, FetchError> {
    let decoded = percent_decode_str(uri).decode_utf8()?;
    let key = decoded.strip_prefix('/').unwrap_or(&decoded);
    Ok(key.to_string())
}
