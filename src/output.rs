//! Output types returned by the extraction entry points.

use crate::error::PageError;
use crate::pipeline::classify::StrategyKind;
use serde::Serialize;

/// Result of a successful extraction.
///
/// `text` may be empty: a blank page or an image without glyphs is a valid
/// document with nothing to recover, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// Recovered plain text or Markdown.
    pub text: String,
    /// Filename the document was classified by (uploaded or inferred).
    pub filename: String,
    /// Strategy that produced `text`.
    pub strategy: StrategyKind,
    /// Non-fatal per-page problems. Empty on a clean run.
    pub warnings: Vec<PageError>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// `true` when some pages contributed no text because of an error.
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Timing and size figures for one extraction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    /// Size of the resolved document in bytes.
    pub input_bytes: usize,
    /// Pages visited, for paged formats.
    pub page_count: Option<usize>,
    /// Characters in `text`.
    pub output_chars: usize,
    /// Fetching the remote document (zero for uploads).
    pub resolve_duration_ms: u64,
    /// Running the extraction engine.
    pub extract_duration_ms: u64,
    /// End-to-end wall time.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_strategy_snake_case() {
        let out = ExtractionOutput {
            text: "hi".into(),
            filename: "a.pdf".into(),
            strategy: StrategyKind::PdfText,
            warnings: vec![],
            stats: ExtractionStats::default(),
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["strategy"], "pdf_text");
        assert_eq!(json["stats"]["page_count"], serde_json::Value::Null);
        assert!(!out.is_partial());
    }

    #[test]
    fn warnings_mark_output_partial() {
        let out = ExtractionOutput {
            text: String::new(),
            filename: "a.pdf".into(),
            strategy: StrategyKind::PdfText,
            warnings: vec![PageError::TextUnavailable {
                page: 2,
                detail: "x".into(),
            }],
            stats: ExtractionStats::default(),
        };
        assert!(out.is_partial());
    }
}
