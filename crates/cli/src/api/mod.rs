//! HTTP boundary
//!
//! Exposes the proxy operations as JSON endpoints under `/api/storage`.
//! Absent results are returned as `200` with a `null` body, so callers see
//! the same "no value" outcome the CLI reports.

pub mod dto;
pub mod handlers;
pub mod router;

pub use router::{AppState, create_router};
