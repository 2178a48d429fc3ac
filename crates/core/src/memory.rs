//! In-memory object store
//!
//! A process-local backend with S3-like listing semantics: keys are
//! returned in lexical order, pages are capped by `max_keys` (or a default
//! page size), and the continuation marker is the last key of a page.
//! Used for tests and for running the HTTP boundary without a backend.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Cursor;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::credentials::Credentials;
use crate::error::Result;
use crate::traits::{
    ClientFactory, ListPage, ListRequest, ObjectBody, ObjectStore, ObjectSummary, Reply,
    STATUS_NO_CONTENT,
};

/// Page size used when a listing does not set `max_keys`
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const STATUS_NOT_FOUND: u16 = 404;
const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Default)]
struct State {
    buckets: HashMap<String, BTreeMap<String, Vec<u8>>>,
    failing_deletes: HashSet<String>,
}

/// Shared in-memory object store; clones see the same objects
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with the default page size
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty store whose listings default to `page_size` keys
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            page_size: page_size.max(1),
        }
    }

    /// Make every delete of `key` answer with a server error
    pub async fn fail_deletes_of(&self, key: impl Into<String>) {
        self.state.write().await.failing_deletes.insert(key.into());
    }

    /// Number of objects stored in `bucket`
    pub async fn len(&self, bucket: &str) -> usize {
        self.state
            .read()
            .await
            .buckets
            .get(bucket)
            .map_or(0, BTreeMap::len)
    }

    /// Whether `bucket` holds no objects
    pub async fn is_empty(&self, bucket: &str) -> bool {
        self.len(bucket).await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<Reply<()>> {
        let mut state = self.state.write().await;
        state
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body);
        Ok(Reply::ok(()))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Reply<ObjectBody>> {
        let state = self.state.read().await;
        let reply = match state.buckets.get(bucket).and_then(|b| b.get(key)) {
            Some(data) => Reply::ok(Box::new(Cursor::new(data.clone())) as ObjectBody),
            None => Reply::with_status(
                STATUS_NOT_FOUND,
                Box::new(Cursor::new(Vec::new())) as ObjectBody,
            ),
        };
        Ok(reply)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<Reply<()>> {
        let mut state = self.state.write().await;
        if state.failing_deletes.contains(key) {
            return Ok(Reply::with_status(STATUS_INTERNAL_ERROR, ()));
        }

        // Deleting a missing key succeeds, as on S3
        if let Some(objects) = state.buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(Reply::with_status(STATUS_NO_CONTENT, ()))
    }

    async fn list_objects(&self, bucket: &str, request: ListRequest) -> Result<Reply<ListPage>> {
        let state = self.state.read().await;
        let Some(objects) = state.buckets.get(bucket) else {
            return Ok(Reply::ok(ListPage::default()));
        };

        let page_size = request
            .max_keys
            .and_then(|max| usize::try_from(max).ok())
            .filter(|max| *max > 0)
            .unwrap_or(self.page_size);

        let start = match &request.continuation_token {
            Some(token) => Bound::Excluded(token.clone()),
            None => Bound::Included(request.prefix.clone()),
        };

        let mut matching = objects
            .range((start, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&request.prefix))
            .map(|(key, data)| ObjectSummary::with_size(key.clone(), data.len() as i64));

        let items: Vec<ObjectSummary> = matching.by_ref().take(page_size).collect();
        let truncated = matching.next().is_some();
        let continuation_token = if truncated {
            items.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(Reply::ok(ListPage {
            items,
            truncated,
            continuation_token,
        }))
    }
}

/// Hands out handles to one shared [`MemoryStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryClientFactory {
    store: MemoryStore,
}

impl MemoryClientFactory {
    /// Create a factory over `store`
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// The shared store
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[async_trait]
impl ClientFactory for MemoryClientFactory {
    async fn connect(&self, _credentials: &Credentials) -> Result<Box<dyn ObjectStore>> {
        Ok(Box::new(self.store.clone()))
    }
}
