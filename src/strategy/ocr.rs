//! Optical character recognition over a whole raster image.
//!
//! The image is decoded in-process first so that a truncated or mislabelled
//! file is reported as a corrupt document instead of an opaque engine error.
//! Recognition itself is delegated to the `tesseract` executable, run once
//! over the full image with no region segmentation on our side.

use super::subprocess::{engine_command, run, stderr_text};
use super::{ExtractedText, ExtractionStrategy};
use crate::config::ExtractionConfig;
use crate::error::Doc2TextError;
use crate::pipeline::classify::StrategyKind;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENGINE: &str = "tesseract";
const FORMAT: &str = "Image";

/// Tesseract-backed OCR for JPEG and PNG input.
#[derive(Debug, Clone)]
pub struct ImageOcrStrategy {
    tesseract: PathBuf,
    language: String,
    scratch_dir: PathBuf,
}

impl ImageOcrStrategy {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            tesseract: config.tesseract_path.clone(),
            language: config.ocr_language.clone(),
            scratch_dir: config.scratch_dir.clone(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for ImageOcrStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ImageOcr
    }

    fn name(&self) -> &'static str {
        ENGINE
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedText, Doc2TextError> {
        let owned = path.to_path_buf();
        let (width, height) = tokio::task::spawn_blocking(move || decode_dimensions(&owned))
            .await
            .map_err(|e| Doc2TextError::Internal(format!("Image decode task panicked: {}", e)))??;
        debug!("Decoded image {}x{} px", width, height);

        let mut cmd = engine_command(&self.tesseract, &self.scratch_dir);
        cmd.arg(path).arg("stdout").arg("-l").arg(&self.language);

        let output = run(ENGINE, cmd).await?;
        if !output.status.success() {
            let stderr = stderr_text(&output);
            return Err(classify_failure(path, &stderr));
        }

        let text = clean_ocr_output(&String::from_utf8_lossy(&output.stdout));
        debug!("OCR recognised {} chars", text.len());
        Ok(ExtractedText::from_text(text))
    }
}

/// Fully decode the image; only its dimensions are kept.
fn decode_dimensions(path: &Path) -> Result<(u32, u32), Doc2TextError> {
    let corrupt = |detail: String| Doc2TextError::CorruptDocument {
        format: FORMAT,
        path: path.to_path_buf(),
        detail,
    };

    let image = image::ImageReader::open(path)
        .map_err(|e| corrupt(format!("cannot open file: {e}")))?
        .with_guessed_format()
        .map_err(|e| corrupt(format!("cannot read file: {e}")))?
        .decode()
        .map_err(|e| corrupt(e.to_string()))?;

    Ok((image.width(), image.height()))
}

/// Tell a bad image apart from a misconfigured engine.
fn classify_failure(path: &Path, stderr: &str) -> Doc2TextError {
    let lower = stderr.to_lowercase();
    if lower.contains("failed loading language") || lower.contains("tessdata") {
        Doc2TextError::EngineUnavailable {
            engine: ENGINE,
            hint: stderr.to_string(),
        }
    } else if lower.contains("pixread") || lower.contains("unsupported image") {
        Doc2TextError::CorruptDocument {
            format: FORMAT,
            path: path.to_path_buf(),
            detail: stderr.to_string(),
        }
    } else {
        Doc2TextError::EngineFailed {
            engine: ENGINE,
            detail: stderr.to_string(),
        }
    }
}

/// Tesseract ends every page with a form feed; drop it and trailing space.
fn clean_ocr_output(raw: &str) -> String {
    raw.replace('\x0c', "").trim_end().to_string()
}
