//! Format classification: map a file extension to an extraction strategy.

use crate::error::Doc2TextError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Embedded text layer of a PDF.
    PdfText,
    /// Optical character recognition over a raster image.
    ImageOcr,
    /// General document-to-markdown conversion.
    ConvertToMarkdown,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::PdfText => "pdf_text",
            StrategyKind::ImageOcr => "image_ocr",
            StrategyKind::ConvertToMarkdown => "convert_to_markdown",
        })
    }
}

/// Raster formats handed to OCR.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extensions the document-conversion engine reads, with its reader name.
pub const CONVERTIBLE_EXTENSIONS: &[(&str, &str)] = &[
    ("docx", "docx"),
    ("odt", "odt"),
    ("rtf", "rtf"),
    ("epub", "epub"),
    ("html", "html"),
    ("htm", "html"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("rst", "rst"),
    ("tex", "latex"),
    ("latex", "latex"),
    ("org", "org"),
    ("ipynb", "ipynb"),
    ("csv", "csv"),
    ("tsv", "tsv"),
    ("pptx", "pptx"),
    ("xlsx", "xlsx"),
];

/// Normalise `.PDF`, `Pdf`, ` pdf ` to `pdf`.
fn normalise(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Reader name for a convertible extension, case-insensitive.
pub fn conversion_reader(extension: &str) -> Option<&'static str> {
    let ext = normalise(extension);
    CONVERTIBLE_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, reader)| *reader)
}

/// Select the strategy for `extension` (with or without the leading dot).
///
/// Convertible office/markup formats are only accepted when the conversion
/// engine is configured; otherwise, like any unknown extension, they yield
/// [`Doc2TextError::UnsupportedFormat`].
pub fn classify(extension: &str, conversion_enabled: bool) -> Result<StrategyKind, Doc2TextError> {
    let ext = normalise(extension);

    if ext == "pdf" {
        return Ok(StrategyKind::PdfText);
    }
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(StrategyKind::ImageOcr);
    }
    if conversion_enabled && conversion_reader(&ext).is_some() {
        return Ok(StrategyKind::ConvertToMarkdown);
    }

    Err(Doc2TextError::UnsupportedFormat {
        extension: format!(".{ext}"),
    })
}
