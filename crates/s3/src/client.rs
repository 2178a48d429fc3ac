//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from kv-core.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::primitives::ByteStream;

use kv_core::{
    Error, ListPage, ListRequest, ObjectBody, ObjectStore, ObjectSummary, Reply, Result,
    STATUS_NO_CONTENT,
};

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Wrap an SDK client
    pub fn new(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }
}

/// Map an SDK failure onto the kv-core taxonomy
///
/// Failures that came with an HTTP response keep their status; anything
/// else (dispatch, timeout, construction) is a transport error.
fn map_sdk_error<E>(err: SdkError<E>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = DisplayErrorContext(&err).to_string();

    match status {
        Some(401 | 403) => Error::Auth(format!("{code}: {message}")),
        Some(404) => Error::NotFound(format!("{code}: {message}")),
        Some(status) => Error::Status {
            status,
            message: format!("{code}: {message}"),
        },
        None => Error::Network(message),
    }
}

fn summary_from(object: &aws_sdk_s3::types::Object) -> ObjectSummary {
    let key = object.key().unwrap_or_default();
    let mut summary = match object.size() {
        Some(size) => ObjectSummary::with_size(key, size),
        None => ObjectSummary::new(key),
    };

    if let Some(modified) = object.last_modified() {
        summary.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
    }

    if let Some(etag) = object.e_tag() {
        summary.etag = Some(etag.trim_matches('"').to_string());
    }

    if let Some(sc) = object.storage_class() {
        summary.storage_class = Some(sc.as_str().to_string());
    }

    summary
}

fn page_from(output: &ListObjectsV2Output) -> ListPage {
    ListPage {
        items: output.contents().iter().map(summary_from).collect(),
        truncated: output.is_truncated().unwrap_or(false),
        continuation_token: output.next_continuation_token().map(|s| s.to_string()),
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<Reply<()>> {
        self.inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(Reply::ok(()))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Reply<ObjectBody>> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let body: ObjectBody = Box::new(Box::pin(response.body.into_async_read()));
        Ok(Reply::ok(body))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<Reply<()>> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(Reply::with_status(STATUS_NO_CONTENT, ()))
    }

    async fn list_objects(&self, bucket: &str, request: ListRequest) -> Result<Reply<ListPage>> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .prefix(request.prefix)
            .set_max_keys(request.max_keys)
            .set_continuation_token(request.continuation_token)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(Reply::ok(page_from(&response)))
    }
}
