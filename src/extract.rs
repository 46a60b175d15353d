//! Extraction entry points.
//!
//! [`DocumentExtractor`] owns everything a request needs that is expensive to
//! build: the strategy registry and the HTTP client. Build it once, share it
//! behind an `Arc`, and call [`DocumentExtractor::extract`] per document.
//!
//! Each call walks the same states:
//!
//! ```text
//! Received → SourceResolved → ScopeAcquired → Classified → Extracted → ScopeReleased
//! ```
//!
//! Any step may fail instead. Once the scratch file has been acquired it is
//! released on every path, success or failure.

use crate::config::ExtractionConfig;
use crate::error::Doc2TextError;
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::classify::{self, StrategyKind};
use crate::pipeline::scope;
use crate::pipeline::source::{self, InputReference, ResolvedPayload};
use crate::strategy::{ExtractedText, StrategyRegistry};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Reusable, thread-safe extraction pipeline.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    config: ExtractionConfig,
    registry: StrategyRegistry,
    client: reqwest::Client,
}

impl DocumentExtractor {
    /// Build an extractor with the default strategies for `config`.
    ///
    /// Creates the scratch directory if it does not exist.
    pub fn new(config: ExtractionConfig) -> Result<Self, Doc2TextError> {
        let registry = StrategyRegistry::new(&config);
        Self::with_registry(config, registry)
    }

    /// Build an extractor around a caller-supplied registry.
    pub fn with_registry(
        config: ExtractionConfig,
        registry: StrategyRegistry,
    ) -> Result<Self, Doc2TextError> {
        std::fs::create_dir_all(&config.scratch_dir).map_err(|source| {
            Doc2TextError::ScratchWriteFailed {
                dir: config.scratch_dir.clone(),
                source,
            }
        })?;
        let client = source::build_client(&config)?;

        info!(
            "Extractor ready: scratch_dir={}, conversion={}",
            config.scratch_dir.display(),
            registry.conversion_enabled()
        );

        Ok(Self {
            config,
            registry,
            client,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Extract text from one document.
    ///
    /// # Errors
    /// Every failure is a [`Doc2TextError`]; use [`Doc2TextError::kind`] to
    /// tell caller mistakes from server-side problems. Per-page problems are
    /// not errors and land in [`ExtractionOutput::warnings`].
    pub async fn extract(&self, input: InputReference) -> Result<ExtractionOutput, Doc2TextError> {
        let total_start = Instant::now();
        info!("Starting extraction: {}", input.describe());

        // ── Received → SourceResolved ────────────────────────────────────
        let resolve_start = Instant::now();
        let payload = source::resolve(input, &self.client, &self.config).await?;
        let resolve_duration_ms = resolve_start.elapsed().as_millis() as u64;
        debug!(
            "Source resolved: {} ({} bytes, .{})",
            payload.filename(),
            payload.bytes().len(),
            payload.extension()
        );

        // ── SourceResolved → ScopeAcquired ───────────────────────────────
        let mut scratch = scope::acquire(
            payload.bytes(),
            payload.extension(),
            &self.config.scratch_dir,
        )?;
        let scratch_path = scratch.path().to_path_buf();
        debug!("Scope acquired: {}", scratch_path.display());

        // ── ScopeAcquired → Classified → Extracted ───────────────────────
        let extract_start = Instant::now();
        let outcome = self.classify_and_extract(&payload, scratch.path()).await;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

        // ── → ScopeReleased (unconditional) ──────────────────────────────
        scratch.release();
        debug!("Scope released");

        let (strategy, extracted) = match outcome {
            Ok(done) => done,
            Err(e) => {
                let e = e.attributed_to(&scratch_path, payload.filename());
                warn!("Extraction of {} failed: {}", payload.filename(), e);
                return Err(e);
            }
        };

        let stats = ExtractionStats {
            input_bytes: payload.bytes().len(),
            page_count: extracted.page_count,
            output_chars: extracted.text.chars().count(),
            resolve_duration_ms,
            extract_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete: {} via {}, {} chars, {}ms total",
            payload.filename(),
            strategy,
            stats.output_chars,
            stats.total_duration_ms
        );

        Ok(ExtractionOutput {
            text: extracted.text,
            filename: payload.filename().to_string(),
            strategy,
            warnings: extracted.warnings,
            stats,
        })
    }

    async fn classify_and_extract(
        &self,
        payload: &ResolvedPayload,
        path: &Path,
    ) -> Result<(StrategyKind, ExtractedText), Doc2TextError> {
        let kind = classify::classify(payload.extension(), self.registry.conversion_enabled())?;
        let strategy = self.registry.get(kind)?;
        debug!("Classified as {} → {}", kind, strategy.name());

        let extracted = match self.config.extraction_timeout_secs {
            Some(secs) => {
                tokio::time::timeout(Duration::from_secs(secs), strategy.extract(path))
                    .await
                    .map_err(|_| Doc2TextError::ExtractionTimeout { secs })??
            }
            None => strategy.extract(path).await?,
        };

        for warning in &extracted.warnings {
            warn!("{}", warning);
        }
        Ok((kind, extracted))
    }
}

// ── Free functions ───────────────────────────────────────────────────────

static DEFAULT_EXTRACTOR: OnceCell<DocumentExtractor> = OnceCell::new();

/// Extract with the process-wide extractor configured from the environment.
///
/// The extractor is built on first use from [`ExtractionConfig::from_env`]
/// and shared by every later call.
pub async fn extract(input: InputReference) -> Result<ExtractionOutput, Doc2TextError> {
    let extractor =
        DEFAULT_EXTRACTOR.get_or_try_init(|| DocumentExtractor::new(ExtractionConfig::from_env()?))?;
    extractor.extract(input).await
}

/// Extract an in-memory document named `filename`.
///
/// # Example
/// ```rust,no_run
/// use edgequake_doc2text::{extract_bytes, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("report.pdf")?;
/// let output = extract_bytes("report.pdf", bytes, &ExtractionConfig::default()).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract_bytes(
    filename: impl Into<String>,
    bytes: impl Into<Vec<u8>>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Doc2TextError> {
    DocumentExtractor::new(config.clone())?
        .extract(InputReference::upload(filename, bytes))
        .await
}

/// Fetch and extract a remote document.
pub async fn extract_url(
    url: impl Into<String>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Doc2TextError> {
    DocumentExtractor::new(config.clone())?
        .extract(InputReference::url(url))
        .await
}

/// Synchronous wrapper around [`DocumentExtractor::extract`].
///
/// Creates a temporary tokio runtime internally; do not call from within an
/// async context.
pub fn extract_sync(
    input: InputReference,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Doc2TextError> {
    let extractor = DocumentExtractor::new(config.clone())?;
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2TextError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extractor.extract(input))
}
