//! Request and response bodies

use serde::{Deserialize, Serialize};

/// Body of a SetItem request
///
/// A `null` key is accepted by the extractor and rejected by the proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct SetItemDto {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: String,
}

/// Error body returned for configuration failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}

impl ErrorResponseDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
