//! kv-core: Core library for the s3kv key-value proxy
//!
//! This crate provides everything that does not depend on a specific
//! object-storage SDK:
//! - Configuration management
//! - Credential resolution
//! - ObjectStore / ClientFactory traits
//! - The storage proxy and its outcome reporting
//! - An in-memory backend

pub mod config;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod proxy;
pub mod report;
pub mod traits;

pub use config::{Config, ConfigManager, Settings};
pub use credentials::{CredentialResolver, Credentials, SecretSource};
pub use error::{Error, ErrorKind, Result};
pub use memory::{MemoryClientFactory, MemoryStore};
pub use proxy::StorageProxy;
pub use report::Operation;
pub use traits::{
    ClientFactory, ListPage, ListQuery, ListRequest, ObjectBody, ObjectStore, ObjectSummary,
    Reply, STATUS_NO_CONTENT, STATUS_OK,
};
