//! Structured text extraction from text-native PDFs via pdfium.
//!
//! ## Threading
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which keeps
//! thread-local state and blocks while parsing. All pdfium calls run inside
//! `tokio::task::spawn_blocking`.
//!
//! ## Page joining
//!
//! Page texts are joined with [`PageSeparator`], which defaults to nothing at
//! all. A page whose text layer fails to load contributes an empty string and
//! a [`PageError`]; it never aborts the document.

use super::{pdfium, ExtractedText, ExtractionStrategy};
use crate::config::{ExtractionConfig, PageSeparator};
use crate::error::{Doc2TextError, PageError};
use crate::pipeline::classify::StrategyKind;
use async_trait::async_trait;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FORMAT: &str = "PDF";

/// How far into the file the `%PDF-` header may appear.
const HEADER_SEARCH_BYTES: usize = 1024;

/// Extracts the embedded text layer of each page in document order.
#[derive(Debug, Clone)]
pub struct PdfTextStrategy {
    library_path: Option<PathBuf>,
    separator: PageSeparator,
}

impl PdfTextStrategy {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            library_path: config.pdfium_library_path.clone(),
            separator: config.page_separator.clone(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for PdfTextStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PdfText
    }

    fn name(&self) -> &'static str {
        "pdfium"
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedText, Doc2TextError> {
        let path = path.to_path_buf();
        let library = self.library_path.clone();
        let separator = self.separator.clone();

        tokio::task::spawn_blocking(move || {
            extract_blocking(&path, library.as_deref(), &separator)
        })
        .await
        .map_err(|e| Doc2TextError::Internal(format!("PDF task panicked: {}", e)))?
    }
}

/// Blocking implementation of PDF text extraction.
fn extract_blocking(
    pdf_path: &Path,
    library: Option<&Path>,
    separator: &PageSeparator,
) -> Result<ExtractedText, Doc2TextError> {
    // Cheap structural check first: empty or non-PDF files never reach pdfium.
    check_header(pdf_path)?;

    let pdfium = pdfium::bind(library)?;

    let document = pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        let detail = if err_str.contains("Password") || err_str.contains("password") {
            "document is encrypted and requires a password".to_string()
        } else {
            err_str
        };
        corrupt(pdf_path, detail)
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut page_texts = Vec::with_capacity(total_pages);
    let mut warnings = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(text) => {
                let text = text.all();
                debug!("Page {} → {} chars", idx + 1, text.len());
                page_texts.push(text);
            }
            Err(e) => {
                warn!("Page {}: text layer unavailable: {:?}", idx + 1, e);
                warnings.push(PageError::TextUnavailable {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                });
                page_texts.push(String::new());
            }
        }
    }

    Ok(ExtractedText {
        text: page_texts.join(separator.as_str()),
        page_count: Some(total_pages),
        warnings,
    })
}

/// Reject empty files and files without a `%PDF-` header near the start.
fn check_header(pdf_path: &Path) -> Result<(), Doc2TextError> {
    let mut file = std::fs::File::open(pdf_path)
        .map_err(|e| corrupt(pdf_path, format!("cannot open file: {e}")))?;

    let mut head = Vec::with_capacity(HEADER_SEARCH_BYTES);
    file.by_ref()
        .take(HEADER_SEARCH_BYTES as u64)
        .read_to_end(&mut head)
        .map_err(|e| corrupt(pdf_path, format!("cannot read file: {e}")))?;

    if head.is_empty() {
        return Err(corrupt(pdf_path, "file is empty".to_string()));
    }
    if !head.windows(5).any(|w| w == b"%PDF-") {
        let mut magic = [0u8; 4];
        let n = head.len().min(4);
        magic[..n].copy_from_slice(&head[..n]);
        return Err(corrupt(
            pdf_path,
            format!("missing %PDF header (first bytes: {magic:?})"),
        ));
    }
    Ok(())
}

fn corrupt(path: &Path, detail: String) -> Doc2TextError {
    Doc2TextError::CorruptDocument {
        format: FORMAT,
        path: path.to_path_buf(),
        detail,
    }
}
