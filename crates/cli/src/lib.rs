//! s3kv CLI library
//!
//! This module exports the CLI components and the HTTP boundary for use in
//! integration tests.

pub mod api;
pub mod commands;
pub mod exit_code;
pub mod output;
