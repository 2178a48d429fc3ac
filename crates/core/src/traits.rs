//! ObjectStore and ClientFactory trait definitions
//!
//! These traits are the seam between the storage proxy and a concrete
//! object-storage SDK. They allow the proxy to be tested against mocks
//! and the in-memory backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::error::Result;

/// HTTP status a backend uses for a successful read, write or listing
pub const STATUS_OK: u16 = 200;

/// HTTP status a backend may use for a successful delete
pub const STATUS_NO_CONTENT: u16 = 204;

/// Object payload stream returned by a read
///
/// The stream is owned by the caller and released when dropped.
pub type ObjectBody = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// Listing metadata for a stored item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,

    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<jiff::Timestamp>,

    /// ETag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Storage class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectSummary {
    /// Create a summary carrying only a key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
            size_human: None,
            last_modified: None,
            etag: None,
            storage_class: None,
        }
    }

    /// Create a summary with a known size
    pub fn with_size(key: impl Into<String>, size: i64) -> Self {
        Self {
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size.max(0) as u64, humansize::BINARY)),
            ..Self::new(key)
        }
    }
}

/// Caller-facing list query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Key prefix; empty matches every key
    pub prefix: String,

    /// Upper bound used to stop paginating
    #[serde(default)]
    pub limit: usize,
}

/// One backend listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Prefix to filter by
    pub prefix: String,

    /// Maximum number of keys per page; `None` uses the backend default
    pub max_keys: Option<i32>,

    /// Continuation marker from the previous page
    pub continuation_token: Option<String>,
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects on this page
    pub items: Vec<ObjectSummary>,

    /// Whether more objects exist beyond this page
    pub truncated: bool,

    /// Marker for requesting the next page
    pub continuation_token: Option<String>,
}

/// A backend response together with the status it was delivered with
#[derive(Debug)]
pub struct Reply<T> {
    /// HTTP status code
    pub status: u16,

    /// Response payload
    pub body: T,
}

impl<T> Reply<T> {
    /// Create a reply with status 200
    pub fn ok(body: T) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    /// Create a reply with an explicit status
    pub fn with_status(status: u16, body: T) -> Self {
        Self { status, body }
    }
}

/// Trait for object-storage operations used by the proxy
///
/// `Ok` means the backend answered (with any status); `Err` means the call
/// raised a service or transport exception.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object, replacing any existing one
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<Reply<()>>;

    /// Open an object for reading
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Reply<ObjectBody>>;

    /// Delete one object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<Reply<()>>;

    /// Fetch one page of a listing
    async fn list_objects(&self, bucket: &str, request: ListRequest) -> Result<Reply<ListPage>>;
}

/// Builds a client scoped to a single proxy operation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Construct a client bound to the given credentials and region
    ///
    /// Fails with [`crate::Error::Config`] when the region is unknown.
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn ObjectStore>>;
}
