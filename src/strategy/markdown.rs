//! General document-to-markdown conversion through `pandoc`.
//!
//! Handles the office and markup formats listed in
//! [`CONVERTIBLE_EXTENSIONS`](crate::pipeline::classify::CONVERTIBLE_EXTENSIONS).
//! The reader is picked from the file extension so pandoc never has to guess,
//! and `--wrap=preserve` keeps the source line structure intact.

use super::subprocess::{engine_command, run, stderr_text};
use super::{ExtractedText, ExtractionStrategy};
use crate::config::{ExtractionConfig, OutputFormat};
use crate::error::Doc2TextError;
use crate::pipeline::classify::{conversion_reader, StrategyKind};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENGINE: &str = "pandoc";

/// Pandoc-backed converter producing Markdown (or plain text).
#[derive(Debug, Clone)]
pub struct ConvertToMarkdownStrategy {
    pandoc: PathBuf,
    output_format: OutputFormat,
    scratch_dir: PathBuf,
}

impl ConvertToMarkdownStrategy {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            pandoc: config.pandoc_path.clone(),
            output_format: config.output_format,
            scratch_dir: config.scratch_dir.clone(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for ConvertToMarkdownStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ConvertToMarkdown
    }

    fn name(&self) -> &'static str {
        ENGINE
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedText, Doc2TextError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let reader =
            conversion_reader(&extension).ok_or_else(|| Doc2TextError::UnsupportedFormat {
                extension: format!(".{extension}"),
            })?;

        let mut cmd = engine_command(&self.pandoc, &self.scratch_dir);
        cmd.arg(path)
            .arg(format!("--from={reader}"))
            .arg(format!("--to={}", self.output_format.pandoc_writer()))
            .arg("--wrap=preserve")
            .arg("--quiet");

        let output = run(ENGINE, cmd).await?;
        if !output.status.success() {
            return Err(classify_failure(path, reader, &stderr_text(&output)));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        debug!("pandoc ({reader}) produced {} chars", text.len());
        Ok(ExtractedText::from_text(text))
    }
}

/// Map pandoc's stderr onto the error taxonomy.
fn classify_failure(path: &Path, reader: &str, stderr: &str) -> Doc2TextError {
    let lower = stderr.to_lowercase();

    if lower.contains("unknown input format") || lower.contains("unknown reader") {
        return Doc2TextError::UnsupportedFormat {
            extension: format!(".{reader}"),
        };
    }

    // Reader-level failures mean the bytes are not what the extension claims.
    let corrupt_markers = [
        "couldn't parse",
        "could not parse",
        "parse error",
        "did not find end of central directory",
        "not a zip",
        "invalid",
        "unexpected end",
    ];
    if corrupt_markers.iter().any(|m| lower.contains(m)) {
        return Doc2TextError::CorruptDocument {
            format: "Document",
            path: path.to_path_buf(),
            detail: stderr.to_string(),
        };
    }

    Doc2TextError::EngineFailed {
        engine: ENGINE,
        detail: if stderr.is_empty() {
            "exited with a non-zero status and no diagnostics".to_string()
        } else {
            stderr.to_string()
        },
    }
}
