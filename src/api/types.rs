//! API request and response types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::DocumentExtractor;

/// Request body size limits.
///
/// Default: 100 MiB for the whole request, which also bounds a single upload.
/// Override with `DOC2TEXT_MAX_UPLOAD_BYTES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSizeLimits {
    /// Maximum size of the entire request body in bytes.
    pub max_request_body_bytes: usize,
}

impl Default for ApiSizeLimits {
    fn default() -> Self {
        Self {
            max_request_body_bytes: 100 * 1024 * 1024,
        }
    }
}

impl ApiSizeLimits {
    pub fn new(max_request_body_bytes: usize) -> Self {
        Self {
            max_request_body_bytes,
        }
    }

    /// Limits expressed in MiB.
    pub fn from_mb(max_request_body_mb: usize) -> Self {
        Self::new(max_request_body_mb * 1024 * 1024)
    }
}

/// JSON body accepted by `POST /extract` when no file is uploaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Successful extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Recovered text; may be empty.
    pub extracted_text: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable class, e.g. `unsupported_format`.
    pub kind: String,
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub extractor: Arc<DocumentExtractor>,
}
