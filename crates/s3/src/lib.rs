//! kv-s3: S3 SDK adapter for the s3kv key-value proxy
//!
//! This crate provides the implementation of the ObjectStore and
//! ClientFactory traits using the aws-sdk-s3 crate. It is the only crate
//! that directly depends on the AWS SDK.

pub mod client;
pub mod factory;
pub mod region;

pub use client::S3Client;
pub use factory::S3ClientFactory;
pub use region::Region;
