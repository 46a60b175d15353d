//! Configuration types for document text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. One struct holds every knob so that a
//! single value can be shared read-only by every concurrent request, logged at
//! startup, and compared between deployments.

use crate::error::Doc2TextError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the extraction pipeline.
///
/// Built via [`ExtractionConfig::builder()`], [`ExtractionConfig::from_env()`]
/// or [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_doc2text::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .scratch_dir("/var/tmp/doc2text")
///     .download_timeout_secs(15)
///     .ocr_language("eng+deu")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Writable directory holding the per-request temporary files.
    /// Default: `$TMPDIR/doc2text`.
    ///
    /// Also exported to engine subprocesses as `XDG_CACHE_HOME` and `TMPDIR`,
    /// so engines never write into a read-only default cache location.
    pub scratch_dir: PathBuf,

    /// Timeout for the whole remote fetch (connect + body) in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Maximum redirect hops followed for a `file_url`. Default: 10.
    pub max_redirects: usize,

    /// Maximum size of a downloaded document in bytes. Default: 100 MiB.
    pub max_download_bytes: u64,

    /// Upper bound on the extraction step in seconds. Default: unbounded.
    ///
    /// OCR and document conversion cost grows with document size; production
    /// deployments should set this.
    pub extraction_timeout_secs: Option<u64>,

    /// Tesseract language code(s), e.g. `eng` or `eng+fra`. Default: `eng`.
    pub ocr_language: String,

    /// Tesseract executable. Default: `tesseract` (resolved via `PATH`).
    pub tesseract_path: PathBuf,

    /// Pandoc executable. Default: `pandoc` (resolved via `PATH`).
    pub pandoc_path: PathBuf,

    /// Explicit pdfium shared library. Default: `PDFIUM_LIB_PATH`, then the
    /// system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Register the general document-to-markdown engine. Default: true.
    ///
    /// When false, office/markup extensions are reported as unsupported.
    pub enable_conversion: bool,

    /// Output flavour of the document-conversion engine. Default: Markdown.
    pub output_format: OutputFormat,

    /// Separator between PDF pages. Default: none (pages are concatenated).
    pub page_separator: PageSeparator,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().join("doc2text"),
            download_timeout_secs: 30,
            max_redirects: 10,
            max_download_bytes: 100 * 1024 * 1024,
            extraction_timeout_secs: None,
            ocr_language: "eng".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            pandoc_path: PathBuf::from("pandoc"),
            pdfium_library_path: None,
            enable_conversion: true,
            output_format: OutputFormat::default(),
            page_separator: PageSeparator::default(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a configuration from `DOC2TEXT_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `DOC2TEXT_SCRATCH_DIR` | `scratch_dir` |
    /// | `DOC2TEXT_DOWNLOAD_TIMEOUT` | `download_timeout_secs` |
    /// | `DOC2TEXT_EXTRACTION_TIMEOUT` | `extraction_timeout_secs` |
    /// | `DOC2TEXT_OCR_LANGUAGE` | `ocr_language` |
    /// | `DOC2TEXT_TESSERACT` | `tesseract_path` |
    /// | `DOC2TEXT_PANDOC` | `pandoc_path` |
    /// | `PDFIUM_LIB_PATH` | `pdfium_library_path` |
    /// | `DOC2TEXT_DISABLE_CONVERSION` | `enable_conversion = false` |
    pub fn from_env() -> Result<Self, Doc2TextError> {
        let mut b = Self::builder();

        if let Some(dir) = env_nonempty("DOC2TEXT_SCRATCH_DIR") {
            b = b.scratch_dir(dir);
        }
        if let Some(secs) = env_nonempty("DOC2TEXT_DOWNLOAD_TIMEOUT").and_then(|v| v.parse().ok()) {
            b = b.download_timeout_secs(secs);
        }
        if let Some(secs) =
            env_nonempty("DOC2TEXT_EXTRACTION_TIMEOUT").and_then(|v| v.parse().ok())
        {
            b = b.extraction_timeout_secs(secs);
        }
        if let Some(lang) = env_nonempty("DOC2TEXT_OCR_LANGUAGE") {
            b = b.ocr_language(lang);
        }
        if let Some(bin) = env_nonempty("DOC2TEXT_TESSERACT") {
            b = b.tesseract_path(bin);
        }
        if let Some(bin) = env_nonempty("DOC2TEXT_PANDOC") {
            b = b.pandoc_path(bin);
        }
        if let Some(lib) = env_nonempty("PDFIUM_LIB_PATH") {
            b = b.pdfium_library_path(lib);
        }
        if env_nonempty("DOC2TEXT_DISABLE_CONVERSION").is_some_and(|v| v != "0" && v != "false") {
            b = b.enable_conversion(false);
        }

        b.build()
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_redirects(mut self, hops: usize) -> Self {
        self.config.max_redirects = hops;
        self
    }

    pub fn max_download_bytes(mut self, bytes: u64) -> Self {
        self.config.max_download_bytes = bytes;
        self
    }

    pub fn extraction_timeout_secs(mut self, secs: u64) -> Self {
        self.config.extraction_timeout_secs = Some(secs);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = path.into();
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn enable_conversion(mut self, v: bool) -> Self {
        self.config.enable_conversion = v;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Doc2TextError> {
        let c = &self.config;
        if c.scratch_dir.as_os_str().is_empty() {
            return Err(Doc2TextError::InvalidConfig(
                "scratch_dir must not be empty".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(Doc2TextError::InvalidConfig(
                "download_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.extraction_timeout_secs == Some(0) {
            return Err(Doc2TextError::InvalidConfig(
                "extraction_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.max_download_bytes == 0 {
            return Err(Doc2TextError::InvalidConfig(
                "max_download_bytes must be ≥ 1".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(Doc2TextError::InvalidConfig(
                "ocr_language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output flavour requested from the document-conversion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Markdown with headings, lists and tables preserved. (default)
    #[default]
    Markdown,
    /// Flat plain text.
    PlainText,
}

impl OutputFormat {
    /// The pandoc writer name for this flavour.
    pub fn pandoc_writer(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::PlainText => "plain",
        }
    }
}

/// How to separate PDF pages in the extracted text.
///
/// The default concatenates pages with nothing in between, which can merge the
/// last word of one page with the first word of the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// No separator; page texts are concatenated. (default)
    #[default]
    None,
    /// A single newline between pages.
    Newline,
    /// ASCII form feed (`\x0c`), as emitted by `pdftotext`.
    FormFeed,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// The string inserted between two consecutive pages.
    pub fn as_str(&self) -> &str {
        match self {
            PageSeparator::None => "",
            PageSeparator::Newline => "\n",
            PageSeparator::FormFeed => "\x0c",
            PageSeparator::Custom(s) => s,
        }
    }
}
