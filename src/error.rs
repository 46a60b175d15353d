//! Error types for the edgequake-doc2text library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Doc2TextError`] — **Fatal** for one request: the document cannot be
//!   extracted at all (no input, unsupported type, download failed, corrupt
//!   file). Returned as `Err(Doc2TextError)` from the `extract*` functions and
//!   rendered as a structured error response by the HTTP layer.
//!
//! * [`PageError`] — **Non-fatal**: a single page yielded no text but the
//!   rest of the document is fine. Stored inside
//!   [`crate::output::ExtractionOutput::warnings`] so callers can inspect
//!   partial success.
//!
//! Every fatal error maps onto a closed [`ErrorKind`] taxonomy. The kind, not
//! the variant, decides whether the failure is the caller's fault (HTTP 400)
//! or the server's (HTTP 500).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// All request-fatal errors returned by the edgequake-doc2text library.
#[derive(Debug, Error)]
pub enum Doc2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Neither an uploaded file nor a `file_url` was supplied.
    #[error("No document supplied: upload a 'file' or provide a 'file_url'")]
    MissingInput,

    /// `file_url` was present but is not an absolute HTTP/HTTPS URL.
    #[error("Invalid file_url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The extension is not handled by any configured strategy.
    #[error("Unsupported file type: '{extension}'")]
    UnsupportedFormat { extension: String },

    // ── Download errors ───────────────────────────────────────────────────
    /// Remote fetch failed (non-2xx status, connection error, redirect loop).
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Remote fetch exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// Remote body exceeded `max_download_bytes`.
    #[error("Download of '{url}' exceeds the {limit} byte limit")]
    DownloadTooLarge { url: String, limit: u64 },

    // ── Scratch space ─────────────────────────────────────────────────────
    /// Could not create or write the temporary file backing the request.
    #[error("Failed to write scratch file in '{dir}': {source}\nCheck the scratch directory is writable and has free space.")]
    ScratchWriteFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The file could not be opened as the format its extension claims.
    ///
    /// Strategies fill `path` with the scratch file; the extractor swaps it
    /// for the caller's filename before the error leaves the pipeline.
    #[error("{format} document '{path}' is corrupt: {detail}")]
    CorruptDocument {
        format: &'static str,
        path: PathBuf,
        detail: String,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// A backing engine (pdfium, tesseract, pandoc) is not installed or
    /// cannot be loaded.
    #[error("Extraction engine '{engine}' is unavailable: {hint}")]
    EngineUnavailable { engine: &'static str, hint: String },

    /// The engine ran but failed for a reason unrelated to the document.
    #[error("{engine} failed: {detail}")]
    EngineFailed { engine: &'static str, detail: String },

    /// The extraction step exceeded `extraction_timeout_secs`.
    #[error("Extraction timed out after {secs}s")]
    ExtractionTimeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (task panicked, runtime unavailable).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Closed failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidReference,
    UnsupportedFormat,
    SourceUnavailable,
    ResourceExhausted,
    CorruptDocument,
    EngineUnavailable,
    ExtractionFailed,
    Timeout,
    Internal,
}

impl ErrorKind {
    /// `true` for failures caused by the request itself (HTTP 400).
    pub fn is_client_error(self) -> bool {
        matches!(self, ErrorKind::InvalidReference | ErrorKind::UnsupportedFormat)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidReference => "invalid_reference",
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::SourceUnavailable => "source_unavailable",
            ErrorKind::ResourceExhausted => "resource_exhausted",
            ErrorKind::CorruptDocument => "corrupt_document",
            ErrorKind::EngineUnavailable => "engine_unavailable",
            ErrorKind::ExtractionFailed => "extraction_failed",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Doc2TextError {
    /// Classify this error into the public [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Doc2TextError::MissingInput | Doc2TextError::InvalidUrl { .. } => {
                ErrorKind::InvalidReference
            }
            Doc2TextError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Doc2TextError::DownloadFailed { .. }
            | Doc2TextError::DownloadTimeout { .. }
            | Doc2TextError::DownloadTooLarge { .. } => ErrorKind::SourceUnavailable,
            Doc2TextError::ScratchWriteFailed { .. } => ErrorKind::ResourceExhausted,
            Doc2TextError::CorruptDocument { .. } => ErrorKind::CorruptDocument,
            Doc2TextError::EngineUnavailable { .. } => ErrorKind::EngineUnavailable,
            Doc2TextError::EngineFailed { .. } => ErrorKind::ExtractionFailed,
            Doc2TextError::ExtractionTimeout { .. } => ErrorKind::Timeout,
            Doc2TextError::InvalidConfig(_) | Doc2TextError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Name the document the way the caller knows it.
    ///
    /// Replaces the scratch path in corrupt-document and engine errors with
    /// `filename`, so server-side paths never reach a response body.
    pub fn attributed_to(self, scratch: &Path, filename: &str) -> Self {
        let scrub = |detail: String| detail.replace(&*scratch.to_string_lossy(), filename);
        match self {
            Doc2TextError::CorruptDocument { format, detail, .. } => {
                Doc2TextError::CorruptDocument {
                    format,
                    path: PathBuf::from(filename),
                    detail: scrub(detail),
                }
            }
            Doc2TextError::EngineFailed { engine, detail } => Doc2TextError::EngineFailed {
                engine,
                detail: scrub(detail),
            },
            other => other,
        }
    }

    /// Shorthand for `self.kind().is_client_error()`.
    pub fn is_client_error(&self) -> bool {
        self.kind().is_client_error()
    }
}

/// A non-fatal error for a single page.
///
/// The page contributes an empty string to the document text and extraction
/// continues with the next page.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum PageError {
    /// The page's text layer could not be loaded.
    #[error("Page {page}: text layer unavailable: {detail}")]
    TextUnavailable { page: usize, detail: String },
}
