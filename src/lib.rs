//! # edgequake-doc2text
//!
//! Extract plain text and Markdown from PDFs, images and office documents.
//!
//! A document arrives as uploaded bytes or as a URL. The pipeline writes it to
//! a private scratch file, picks an engine from the file extension, runs it,
//! and removes the scratch file again, whatever the outcome.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload | file_url
//!  │
//!  ├─ 1. Resolve   inline bytes, or GET the URL (30s timeout, bounded redirects)
//!  ├─ 2. Acquire   write a uniquely named doc2text-*.ext scratch file
//!  ├─ 3. Classify  .pdf → pdfium · .jpg/.png → tesseract · .docx/.html/… → pandoc
//!  ├─ 4. Extract   engine runs against the scratch file
//!  └─ 5. Release   scratch file removed on every path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_doc2text::{DocumentExtractor, ExtractionConfig, InputReference};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = DocumentExtractor::new(ExtractionConfig::default())?;
//!     let output = extractor
//!         .extract(InputReference::url("https://example.com/report.pdf"))
//!         .await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `api`   | on      | The axum HTTP service (`POST /extract`, `GET /health`) |
//! | `cli`   | on      | The `doc2text` binary (clap + anyhow + tracing-subscriber) |
//!
//! Library-only use:
//! ```toml
//! edgequake-doc2text = { version = "0.1", default-features = false }
//! ```
//!
//! ## External engines
//!
//! | Format | Engine | Needed at runtime |
//! |--------|--------|-------------------|
//! | PDF | pdfium | `libpdfium` via `PDFIUM_LIB_PATH` or the system loader |
//! | JPEG, PNG | tesseract | `tesseract` on `PATH` plus language data |
//! | DOCX, HTML, EPUB, … | pandoc | `pandoc` on `PATH` |

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod strategy;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, OutputFormat, PageSeparator};
pub use error::{Doc2TextError, ErrorKind, PageError};
pub use extract::{extract, extract_bytes, extract_sync, extract_url, DocumentExtractor};
pub use output::{ExtractionOutput, ExtractionStats};
pub use pipeline::classify::StrategyKind;
pub use pipeline::source::{InputReference, Upload};
pub use strategy::{ExtractionStrategy, StrategyRegistry};
