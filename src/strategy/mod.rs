//! Extraction strategies: one interchangeable engine per format family.
//!
//! Every strategy implements the same path-in, text-out contract
//! ([`ExtractionStrategy`]). Strategies are constructed once by
//! [`StrategyRegistry::new`] and shared read-only across concurrent requests;
//! nothing in a strategy is mutated after construction.
//!
//! | Strategy | Engine | Formats |
//! |----------|--------|---------|
//! | [`PdfTextStrategy`] | pdfium (in-process) | `.pdf` |
//! | [`ImageOcrStrategy`] | `tesseract` (subprocess) | `.jpg` `.jpeg` `.png` |
//! | [`ConvertToMarkdownStrategy`] | `pandoc` (subprocess) | office and markup formats |
//!
//! Strategies never fail on a recoverable per-page problem: they keep what
//! they could extract and report the rest as [`PageError`] warnings.

pub mod markdown;
pub mod ocr;
pub mod pdf;
pub mod pdfium;
mod subprocess;

pub use markdown::ConvertToMarkdownStrategy;
pub use ocr::ImageOcrStrategy;
pub use pdf::PdfTextStrategy;

use crate::config::ExtractionConfig;
use crate::error::{Doc2TextError, PageError};
use crate::pipeline::classify::StrategyKind;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Text produced by one strategy run.
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    /// Recovered text. Empty is valid: the document had nothing to recover.
    pub text: String,
    /// Number of pages visited, when the format has pages.
    pub page_count: Option<usize>,
    /// Non-fatal per-page problems.
    pub warnings: Vec<PageError>,
}

impl ExtractedText {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// The common contract of every extraction engine.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Which classifier outcome this strategy serves.
    fn kind(&self) -> StrategyKind;

    /// Engine name for logs.
    fn name(&self) -> &'static str;

    /// Extract text from the document at `path`.
    async fn extract(&self, path: &Path) -> Result<ExtractedText, Doc2TextError>;
}

/// Read-only set of strategies built once per process.
#[derive(Clone)]
pub struct StrategyRegistry {
    pdf: Arc<dyn ExtractionStrategy>,
    ocr: Arc<dyn ExtractionStrategy>,
    convert: Option<Arc<dyn ExtractionStrategy>>,
}

impl StrategyRegistry {
    /// Build every strategy the configuration enables.
    pub fn new(config: &ExtractionConfig) -> Self {
        let convert = config
            .enable_conversion
            .then(|| Arc::new(ConvertToMarkdownStrategy::new(config)) as Arc<dyn ExtractionStrategy>);

        Self {
            pdf: Arc::new(PdfTextStrategy::new(config)),
            ocr: Arc::new(ImageOcrStrategy::new(config)),
            convert,
        }
    }

    /// Assemble a registry from explicit strategies.
    pub fn with_strategies(
        pdf: Arc<dyn ExtractionStrategy>,
        ocr: Arc<dyn ExtractionStrategy>,
        convert: Option<Arc<dyn ExtractionStrategy>>,
    ) -> Self {
        Self { pdf, ocr, convert }
    }

    /// `true` when the document-conversion engine is registered.
    pub fn conversion_enabled(&self) -> bool {
        self.convert.is_some()
    }

    /// The strategy serving `kind`.
    pub fn get(&self, kind: StrategyKind) -> Result<Arc<dyn ExtractionStrategy>, Doc2TextError> {
        match kind {
            StrategyKind::PdfText => Ok(Arc::clone(&self.pdf)),
            StrategyKind::ImageOcr => Ok(Arc::clone(&self.ocr)),
            StrategyKind::ConvertToMarkdown => {
                self.convert
                    .as_ref()
                    .map(Arc::clone)
                    .ok_or_else(|| Doc2TextError::UnsupportedFormat {
                        extension: "(document conversion disabled)".into(),
                    })
            }
        }
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("pdf", &self.pdf.name())
            .field("ocr", &self.ocr.name())
            .field("convert", &self.convert.as_ref().map(|s| s.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_serves_each_kind() {
        let config = ExtractionConfig::default();
        let registry = StrategyRegistry::new(&config);
        assert_eq!(
            registry.get(StrategyKind::PdfText).unwrap().kind(),
            StrategyKind::PdfText
        );
        assert_eq!(
            registry.get(StrategyKind::ImageOcr).unwrap().kind(),
            StrategyKind::ImageOcr
        );
        assert_eq!(
            registry.get(StrategyKind::ConvertToMarkdown).unwrap().kind(),
            StrategyKind::ConvertToMarkdown
        );
    }

    #[test]
    fn conversion_can_be_disabled() {
        let config = ExtractionConfig::builder()
            .enable_conversion(false)
            .build()
            .unwrap();
        let registry = StrategyRegistry::new(&config);
        assert!(!registry.conversion_enabled());
        match registry.get(StrategyKind::ConvertToMarkdown) {
            Ok(strategy) => panic!("conversion disabled, got {}", strategy.name()),
            Err(err) => assert!(err.is_client_error()),
        }
    }

    #[test]
    fn strategies_are_shared_not_rebuilt() {
        let registry = StrategyRegistry::new(&ExtractionConfig::default());
        let a = registry.get(StrategyKind::PdfText).unwrap();
        let b = registry.get(StrategyKind::PdfText).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
