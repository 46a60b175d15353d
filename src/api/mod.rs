//! HTTP service for document text extraction.
//!
//! # Endpoints
//!
//! - `POST /extract` - Extract text from an uploaded file or a `file_url`
//! - `GET /health` - Health check
//!
//! # cURL Examples
//!
//! ```bash
//! # Upload
//! curl -F "file=@report.pdf" http://localhost:8000/extract
//!
//! # Remote document (form field or JSON)
//! curl -F "file_url=https://example.com/scan.png" http://localhost:8000/extract
//! curl -H 'content-type: application/json' \
//!      -d '{"file_url":"https://example.com/memo.docx"}' \
//!      http://localhost:8000/extract
//! ```
//!
//! Responses are `{"extracted_text": "..."}` on success and
//! `{"error": "...", "kind": "..."}` otherwise (400 for bad input, 500 for
//! everything else).

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use handlers::{extract_handler, health_handler};
pub use server::{
    create_router, create_router_with_limits, serve, serve_with_limits, size_limits_from_env,
};
pub use types::{
    ApiSizeLimits, ApiState, ErrorResponse, ExtractResponse, HealthResponse, UrlRequest,
};
