//! Storage proxy
//!
//! Translates key/value/prefix operations into object-storage requests.
//! Each operation resolves fresh credentials, builds its own client, and
//! drops that client (and any response stream) before returning.
//!
//! Every operation returns `Result<Option<T>>`: `Err` only for configuration
//! errors, `Ok(None)` for any other failure.

use std::sync::Arc;

use tokio::io::AsyncReadExt;

use crate::config::Settings;
use crate::credentials::CredentialResolver;
use crate::error::{Error, Result};
use crate::report::{Operation, absorb, ensure_status, report_status};
use crate::traits::{
    ClientFactory, ListPage, ListRequest, ObjectStore, ObjectSummary, STATUS_NO_CONTENT,
    STATUS_OK,
};

/// Statuses accepted for a delete
const DELETE_ACCEPTED: &[u16] = &[STATUS_NO_CONTENT, STATUS_OK];

/// Key-value facade over a single bucket
pub struct StorageProxy {
    bucket: String,
    resolver: CredentialResolver,
    factory: Arc<dyn ClientFactory>,
}

impl StorageProxy {
    /// Create a proxy from its parts
    pub fn new(
        bucket: impl Into<String>,
        resolver: CredentialResolver,
        factory: Arc<dyn ClientFactory>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            resolver,
            factory,
        }
    }

    /// Create a proxy from validated settings
    pub fn from_settings(settings: &Settings, factory: Arc<dyn ClientFactory>) -> Result<Self> {
        settings.validate()?;
        Ok(Self::new(
            settings.bucket.clone(),
            CredentialResolver::from_settings(settings),
            factory,
        ))
    }

    /// Bucket this proxy reads and writes
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// Returns the key on success. An empty key is rejected without any
    /// backend call.
    pub async fn put(&self, key: &str, value: &str) -> Result<Option<String>> {
        if let Err(e) = validate_key(key) {
            return absorb(Operation::Put, Err(e));
        }

        tracing::info!(bucket = %self.bucket, key, "Put object");
        absorb(Operation::Put, self.put_inner(key, value).await)
    }

    /// Read the value stored under `key`
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Err(e) = validate_key(key) {
            return absorb(Operation::Get, Err(e));
        }

        tracing::info!(bucket = %self.bucket, key, "Get object");
        absorb(Operation::Get, self.get_inner(key).await)
    }

    /// Remove the item stored under `key`
    ///
    /// Returns the key when the backend acknowledged the delete.
    pub async fn delete_one(&self, key: &str) -> Result<Option<String>> {
        if let Err(e) = validate_key(key) {
            return absorb(Operation::Delete, Err(e));
        }

        tracing::info!(bucket = %self.bucket, key, "Delete object");
        absorb(Operation::Delete, self.delete_inner(key).await)
    }

    /// List summaries of items whose key starts with `prefix`
    ///
    /// Pages are requested with `limit` as the backend page size. Truncated
    /// pages accumulate until more than `limit` summaries are held; a page
    /// that is not truncated replaces whatever was accumulated before it.
    /// A failure on any page discards the whole listing.
    pub async fn list(&self, prefix: &str, limit: usize) -> Result<Option<Vec<ObjectSummary>>> {
        tracing::info!(bucket = %self.bucket, prefix, limit, "List objects");
        absorb(Operation::List, self.list_inner(prefix, limit).await)
    }

    /// Delete every item whose key starts with `prefix`
    ///
    /// Best effort: objects are deleted one by one, a failed delete stops the
    /// current page, and nothing is rolled back. Returns the prefix unless the
    /// very first listing fails.
    pub async fn clear(&self, prefix: &str) -> Result<Option<String>> {
        tracing::info!(bucket = %self.bucket, prefix, "Delete objects by prefix");
        absorb(Operation::Clear, self.clear_inner(prefix).await)
    }

    /// Acquire a client for the duration of one operation
    async fn scoped_client(&self) -> Result<Box<dyn ObjectStore>> {
        let credentials = self.resolver.resolve();
        self.factory.connect(&credentials).await
    }

    async fn put_inner(&self, key: &str, value: &str) -> Result<String> {
        let client = self.scoped_client().await?;
        let reply = client
            .put_object(&self.bucket, key, value.as_bytes().to_vec())
            .await?;
        ensure_status(Operation::Put, reply.status, &[STATUS_OK])?;
        Ok(key.to_string())
    }

    async fn get_inner(&self, key: &str) -> Result<String> {
        let client = self.scoped_client().await?;
        let reply = client.get_object(&self.bucket, key).await?;

        let status = reply.status;
        let mut body = reply.body;
        ensure_status(Operation::Get, status, &[STATUS_OK])?;

        let mut contents = Vec::new();
        body.read_to_end(&mut contents).await?;
        Ok(String::from_utf8_lossy(&contents).into_owned())
    }

    async fn delete_inner(&self, key: &str) -> Result<String> {
        let client = self.scoped_client().await?;
        let reply = client.delete_object(&self.bucket, key).await?;
        ensure_status(Operation::Delete, reply.status, DELETE_ACCEPTED)?;
        Ok(key.to_string())
    }

    async fn list_inner(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectSummary>> {
        let client = self.scoped_client().await?;
        let mut request = ListRequest {
            prefix: prefix.to_string(),
            max_keys: page_size(limit),
            continuation_token: None,
        };

        let mut objects = Vec::new();
        loop {
            let page = self
                .fetch_page(client.as_ref(), Operation::List, request.clone())
                .await?;

            if !page.truncated {
                objects = page.items;
                break;
            }

            objects.extend(page.items);
            if objects.len() > limit {
                break;
            }

            match page.continuation_token {
                Some(token) => request.continuation_token = Some(token),
                None => {
                    tracing::warn!(prefix, "Truncated page without continuation marker");
                    break;
                }
            }
        }

        tracing::debug!(prefix, count = objects.len(), "Listing finished");
        Ok(objects)
    }

    async fn clear_inner(&self, prefix: &str) -> Result<String> {
        let client = self.scoped_client().await?;
        let mut request = ListRequest {
            prefix: prefix.to_string(),
            ..Default::default()
        };

        let mut first_page = true;
        loop {
            let page = match self
                .fetch_page(client.as_ref(), Operation::Clear, request.clone())
                .await
            {
                Ok(page) => page,
                Err(e) if first_page => return Err(e),
                Err(e) => {
                    tracing::error!(prefix, error = %e, "Listing failed part-way through clear");
                    break;
                }
            };
            first_page = false;

            for object in &page.items {
                match client.delete_object(&self.bucket, &object.key).await {
                    Ok(reply) => {
                        if !report_status(Operation::Clear, reply.status, DELETE_ACCEPTED) {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            key = %object.key,
                            error = %e,
                            "Error encountered when {}",
                            Operation::Clear.activity()
                        );
                        break;
                    }
                }
            }

            if !page.truncated {
                break;
            }

            match page.continuation_token {
                Some(token) => request.continuation_token = Some(token),
                None => {
                    tracing::warn!(prefix, "Truncated page without continuation marker");
                    break;
                }
            }
        }

        Ok(prefix.to_string())
    }

    async fn fetch_page(
        &self,
        client: &dyn ObjectStore,
        op: Operation,
        request: ListRequest,
    ) -> Result<ListPage> {
        let reply = client.list_objects(&self.bucket, request).await?;
        ensure_status(op, reply.status, &[STATUS_OK])?;
        Ok(reply.body)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey("key must not be empty".into()));
    }
    Ok(())
}

/// Backend page size for a list limit; 0 leaves the backend default
fn page_size(limit: usize) -> Option<i32> {
    (limit > 0).then(|| i32::try_from(limit).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credentials, SecretSource};
    use crate::traits::{MockClientFactory, MockObjectStore, ObjectBody, Reply};
    use mockall::Sequence;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    struct TrackedBody {
        inner: Cursor<Vec<u8>>,
        dropped: Arc<AtomicBool>,
        fail_reads: bool,
    }

    impl AsyncRead for TrackedBody {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if self.fail_reads {
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset mid-body",
                )));
            }
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl Drop for TrackedBody {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn resolver() -> CredentialResolver {
        CredentialResolver::new(
            "AKID",
            "us-east-1",
            vec![SecretSource::Value(Some("secret".into()))],
        )
    }

    fn proxy_with(store: MockObjectStore) -> StorageProxy {
        let mut factory = MockClientFactory::new();
        factory
            .expect_connect()
            .times(1)
            .return_once(move |_| Ok(Box::new(store) as Box<dyn ObjectStore>));
        StorageProxy::new("kv-bucket", resolver(), Arc::new(factory))
    }

    fn proxy_without_backend() -> StorageProxy {
        let mut factory = MockClientFactory::new();
        factory.expect_connect().never();
        StorageProxy::new("kv-bucket", resolver(), Arc::new(factory))
    }

    fn page(keys: &[&str], token: Option<&str>) -> ListPage {
        ListPage {
            items: keys.iter().map(|k| ObjectSummary::new(*k)).collect(),
            truncated: token.is_some(),
            continuation_token: token.map(str::to_string),
        }
    }

    fn keys(objects: &[ObjectSummary]) -> Vec<&str> {
        objects.iter().map(|o| o.key.as_str()).collect()
    }

    #[tokio::test]
    async fn test_put_returns_key_on_ok() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|bucket, key, body| bucket == "kv-bucket" && key == "a/1" && body == b"v1")
            .times(1)
            .returning(|_, _, _| Ok(Reply::ok(())));

        let proxy = proxy_with(store);
        assert_eq!(proxy.put("a/1", "v1").await.unwrap(), Some("a/1".to_string()));
    }

    #[tokio::test]
    async fn test_put_empty_key_skips_backend() {
        let proxy = proxy_without_backend();
        assert_eq!(proxy.put("", "v").await.unwrap(), None);
        assert_eq!(proxy.get("").await.unwrap(), None);
        assert_eq!(proxy.delete_one("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_non_ok_status_is_empty() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .times(1)
            .returning(|_, _, _| Ok(Reply::with_status(500, ())));

        let proxy = proxy_with(store);
        assert_eq!(proxy.put("a/1", "v1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_exception_is_empty() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .times(1)
            .returning(|_, _, _| Err(Error::Network("connection reset".into())));

        let proxy = proxy_with(store);
        assert_eq!(proxy.put("a/1", "v1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_factory_receives_resolved_credentials() {
        let mut factory = MockClientFactory::new();
        factory
            .expect_connect()
            .withf(|creds: &Credentials| {
                creds.access_key_id == "AKID"
                    && creds.secret_access_key == "secret"
                    && creds.region == "us-east-1"
            })
            .times(1)
            .return_once(|_| {
                let mut store = MockObjectStore::new();
                store
                    .expect_delete_object()
                    .returning(|_, _| Ok(Reply::with_status(STATUS_NO_CONTENT, ())));
                Ok(Box::new(store) as Box<dyn ObjectStore>)
            });

        let proxy = StorageProxy::new("kv-bucket", resolver(), Arc::new(factory));
        assert_eq!(proxy.delete_one("k").await.unwrap(), Some("k".to_string()));
    }

    #[tokio::test]
    async fn test_config_error_propagates() {
        let mut factory = MockClientFactory::new();
        factory
            .expect_connect()
            .times(1)
            .return_once(|_| Err(Error::Config("unknown region 'mars-1'".into())));

        let proxy = StorageProxy::new("kv-bucket", resolver(), Arc::new(factory));
        let result = proxy.put("a/1", "v").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_get_reads_body_and_releases_it() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = dropped.clone();

        let mut store = MockObjectStore::new();
        store.expect_get_object().times(1).return_once(move |_, _| {
            let body = TrackedBody {
                inner: Cursor::new(b"hello".to_vec()),
                dropped: flag,
                fail_reads: false,
            };
            Ok(Reply::ok(Box::new(body) as ObjectBody))
        });

        let proxy = proxy_with(store);
        assert_eq!(proxy.get("greeting").await.unwrap(), Some("hello".to_string()));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_get_non_ok_releases_body() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = dropped.clone();

        let mut store = MockObjectStore::new();
        store.expect_get_object().times(1).return_once(move |_, _| {
            let body = TrackedBody {
                inner: Cursor::new(b"<Error/>".to_vec()),
                dropped: flag,
                fail_reads: false,
            };
            Ok(Reply::with_status(404, Box::new(body) as ObjectBody))
        });

        let proxy = proxy_with(store);
        assert_eq!(proxy.get("missing").await.unwrap(), None);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_get_read_failure_releases_body() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = dropped.clone();

        let mut store = MockObjectStore::new();
        store.expect_get_object().times(1).return_once(move |_, _| {
            let body = TrackedBody {
                inner: Cursor::new(b"partial".to_vec()),
                dropped: flag,
                fail_reads: true,
            };
            Ok(Reply::ok(Box::new(body) as ObjectBody))
        });

        let proxy = proxy_with(store);
        assert_eq!(proxy.get("greeting").await.unwrap(), None);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_delete_accepts_ok_and_no_content() {
        for status in [STATUS_OK, STATUS_NO_CONTENT] {
            let mut store = MockObjectStore::new();
            store
                .expect_delete_object()
                .times(1)
                .returning(move |_, _| Ok(Reply::with_status(status, ())));

            let proxy = proxy_with(store);
            assert_eq!(proxy.delete_one("k").await.unwrap(), Some("k".to_string()));
        }

        let mut store = MockObjectStore::new();
        store
            .expect_delete_object()
            .times(1)
            .returning(|_, _| Ok(Reply::with_status(403, ())));
        let proxy = proxy_with(store);
        assert_eq!(proxy.delete_one("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_single_page() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .withf(|_, req| req.prefix == "a/" && req.max_keys == Some(10))
            .times(1)
            .returning(|_, _| Ok(Reply::ok(page(&["a/1", "a/2"], None))));

        let proxy = proxy_with(store);
        let objects = proxy.list("a/", 10).await.unwrap().unwrap();
        assert_eq!(keys(&objects), vec!["a/1", "a/2"]);
    }

    #[tokio::test]
    async fn test_list_final_page_replaces_truncated_pages() {
        let mut seq = Sequence::new();
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .withf(|_, req| req.continuation_token.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["a/1"], Some("t1")))));
        store
            .expect_list_objects()
            .withf(|_, req| req.continuation_token.as_deref() == Some("t1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["a/2"], None))));

        let proxy = proxy_with(store);
        let objects = proxy.list("a/", 10).await.unwrap().unwrap();
        assert_eq!(keys(&objects), vec!["a/2"]);
    }

    #[tokio::test]
    async fn test_list_stops_once_accumulated_exceeds_limit() {
        let mut seq = Sequence::new();
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["a/1", "a/2"], Some("t1")))));
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["a/3", "a/4"], Some("t2")))));

        let proxy = proxy_with(store);
        let objects = proxy.list("a/", 2).await.unwrap().unwrap();
        assert_eq!(keys(&objects), vec!["a/1", "a/2", "a/3", "a/4"]);
    }

    #[tokio::test]
    async fn test_list_failure_mid_pagination_is_empty() {
        let mut seq = Sequence::new();
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["a/1"], Some("t1")))));
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::with_status(500, ListPage::default())));

        let proxy = proxy_with(store);
        assert_eq!(proxy.list("a/", 10).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_truncated_without_marker_stops() {
        let mut store = MockObjectStore::new();
        store.expect_list_objects().times(1).returning(|_, _| {
            Ok(Reply::ok(ListPage {
                items: vec![ObjectSummary::new("a/1")],
                truncated: true,
                continuation_token: None,
            }))
        });

        let proxy = proxy_with(store);
        let objects = proxy.list("a/", 10).await.unwrap().unwrap();
        assert_eq!(keys(&objects), vec!["a/1"]);
    }

    #[tokio::test]
    async fn test_list_zero_limit_uses_backend_page_size() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .withf(|_, req| req.max_keys.is_none())
            .times(1)
            .returning(|_, _| Ok(Reply::ok(page(&["a/1"], None))));

        let proxy = proxy_with(store);
        assert_eq!(proxy.list("a/", 0).await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_deletes_every_page() {
        let mut seq = Sequence::new();
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .withf(|_, req| req.max_keys.is_none() && req.continuation_token.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["p/1", "p/2"], Some("t1")))));
        store
            .expect_delete_object()
            .withf(|_, key| key == "p/1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::with_status(STATUS_NO_CONTENT, ())));
        store
            .expect_delete_object()
            .withf(|_, key| key == "p/2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::with_status(STATUS_NO_CONTENT, ())));
        store
            .expect_list_objects()
            .withf(|_, req| req.continuation_token.as_deref() == Some("t1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["p/3"], None))));
        store
            .expect_delete_object()
            .withf(|_, key| key == "p/3")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(())));

        let proxy = proxy_with(store);
        assert_eq!(proxy.clear("p/").await.unwrap(), Some("p/".to_string()));
    }

    #[tokio::test]
    async fn test_clear_first_listing_failure_is_empty() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .times(1)
            .returning(|_, _| Ok(Reply::with_status(403, ListPage::default())));
        store.expect_delete_object().never();

        let proxy = proxy_with(store);
        assert_eq!(proxy.clear("p/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_failed_delete_stops_page_but_reports_prefix() {
        let mut seq = Sequence::new();
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["p/1", "p/1b"], Some("t1")))));
        store
            .expect_delete_object()
            .withf(|_, key| key == "p/1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::with_status(500, ())));
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["p/2"], None))));
        store
            .expect_delete_object()
            .withf(|_, key| key == "p/2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::with_status(STATUS_NO_CONTENT, ())));

        // p/1b is never attempted and the outcome still looks like success
        let proxy = proxy_with(store);
        assert_eq!(proxy.clear("p/").await.unwrap(), Some("p/".to_string()));
    }

    #[tokio::test]
    async fn test_clear_delete_exception_stops_page() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .times(1)
            .returning(|_, _| Ok(Reply::ok(page(&["p/1", "p/2"], None))));
        store
            .expect_delete_object()
            .withf(|_, key| key == "p/1")
            .times(1)
            .returning(|_, _| Err(Error::Network("timeout".into())));

        let proxy = proxy_with(store);
        assert_eq!(proxy.clear("p/").await.unwrap(), Some("p/".to_string()));
    }

    #[tokio::test]
    async fn test_clear_later_listing_failure_keeps_prefix() {
        let mut seq = Sequence::new();
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::ok(page(&["p/1"], Some("t1")))));
        store
            .expect_delete_object()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Reply::with_status(STATUS_NO_CONTENT, ())));
        store
            .expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(Error::Network("connection reset".into())));

        let proxy = proxy_with(store);
        assert_eq!(proxy.clear("p/").await.unwrap(), Some("p/".to_string()));
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(0), None);
        assert_eq!(page_size(10), Some(10));
        assert_eq!(page_size(usize::MAX), Some(i32::MAX));
    }

    #[test]
    fn test_from_settings_requires_bucket() {
        let factory = Arc::new(MockClientFactory::new());
        let result = StorageProxy::from_settings(&Settings::new("", "AKID"), factory);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
