//! Source resolution: turn an uploaded file or a `file_url` into bytes plus
//! a best-effort filename and extension.
//!
//! The extension decides which extraction strategy runs, so inference is
//! deliberately layered. For downloads the order is: URL path segment →
//! `Content-Disposition` filename → `Content-Type` → `.pdf`. For uploads the
//! caller-declared filename wins, then the part's declared content type, then
//! `.pdf`.

use crate::config::ExtractionConfig;
use crate::error::Doc2TextError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Url;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Extension used when nothing else can be inferred.
pub const DEFAULT_EXTENSION: &str = "pdf";

/// Longest extension accepted from untrusted input.
const MAX_EXTENSION_LEN: usize = 16;

/// A file supplied inline with the request.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Caller-declared filename, used verbatim.
    pub filename: String,
    /// Declared MIME type of the part, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where the document comes from.
#[derive(Debug, Clone)]
pub enum InputReference {
    /// Bytes uploaded with the request.
    InlineUpload(Upload),
    /// A remote document to fetch with GET.
    RemoteUrl { url: String },
}

impl InputReference {
    /// Inline upload without a declared content type.
    pub fn upload(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        InputReference::InlineUpload(Upload {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        })
    }

    pub fn url(url: impl Into<String>) -> Self {
        InputReference::RemoteUrl { url: url.into() }
    }

    /// Combine the optional request parts into exactly one reference.
    ///
    /// An upload takes precedence over a URL when both are supplied. A blank
    /// URL counts as absent. Neither present is [`Doc2TextError::MissingInput`].
    pub fn from_parts(
        upload: Option<Upload>,
        file_url: Option<String>,
    ) -> Result<Self, Doc2TextError> {
        let file_url = file_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        match (upload, file_url) {
            (Some(upload), url) => {
                if let Some(url) = url {
                    debug!("Both upload and file_url supplied; using upload, ignoring {url}");
                }
                Ok(InputReference::InlineUpload(upload))
            }
            (None, Some(url)) => Ok(InputReference::RemoteUrl { url }),
            (None, None) => Err(Doc2TextError::MissingInput),
        }
    }

    /// Short human-readable label for logs.
    pub fn describe(&self) -> &str {
        match self {
            InputReference::InlineUpload(u) => &u.filename,
            InputReference::RemoteUrl { url } => url,
        }
    }
}

/// Bytes plus inferred naming, immutable once constructed.
#[derive(Debug, Clone)]
pub struct ResolvedPayload {
    bytes: Vec<u8>,
    filename: String,
    extension: String,
}

impl ResolvedPayload {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lower-case extension without the leading dot, e.g. `pdf`.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Build the shared HTTP client used for every `file_url` fetch.
pub fn build_client(config: &ExtractionConfig) -> Result<reqwest::Client, Doc2TextError> {
    reqwest::Client::builder()
        .user_agent(concat!("edgequake-doc2text/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.download_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .build()
        .map_err(|e| Doc2TextError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Resolve an input reference to an in-memory payload.
pub async fn resolve(
    input: InputReference,
    client: &reqwest::Client,
    config: &ExtractionConfig,
) -> Result<ResolvedPayload, Doc2TextError> {
    match input {
        InputReference::InlineUpload(upload) => Ok(resolve_upload(upload)),
        InputReference::RemoteUrl { url } => download_url(&url, client, config).await,
    }
}

fn resolve_upload(upload: Upload) -> ResolvedPayload {
    let extension = extension_of(&upload.filename)
        .or_else(|| {
            upload
                .content_type
                .as_deref()
                .and_then(extension_for_content_type)
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    debug!(
        "Resolved upload '{}' ({} bytes, .{})",
        upload.filename,
        upload.bytes.len(),
        extension
    );

    ResolvedPayload {
        bytes: upload.bytes,
        filename: upload.filename,
        extension,
    }
}

/// Download a URL into memory, bounded by `max_download_bytes`.
async fn download_url(
    url: &str,
    client: &reqwest::Client,
    config: &ExtractionConfig,
) -> Result<ResolvedPayload, Doc2TextError> {
    let parsed = parse_http_url(url)?;
    info!("Downloading document from: {}", url);

    let mut response = client
        .get(parsed.clone())
        .send()
        .await
        .map_err(|e| map_reqwest_error(url, e, config.download_timeout_secs))?;

    if !response.status().is_success() {
        return Err(Doc2TextError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let limit = config.max_download_bytes;
    if response.content_length().is_some_and(|len| len > limit) {
        return Err(Doc2TextError::DownloadTooLarge {
            url: url.to_string(),
            limit,
        });
    }

    let content_disposition = header_str(&response, CONTENT_DISPOSITION);
    let content_type = header_str(&response, CONTENT_TYPE);
    // Name inference uses the post-redirect URL so that short links resolve
    // to the real document name.
    let final_url = response.url().clone();

    let mut bytes = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| map_reqwest_error(url, e, config.download_timeout_secs))?
    {
        if bytes.len() as u64 + chunk.len() as u64 > limit {
            return Err(Doc2TextError::DownloadTooLarge {
                url: url.to_string(),
                limit,
            });
        }
        bytes.extend_from_slice(&chunk);
    }

    let (filename, extension) = infer_remote_name(
        &final_url,
        content_disposition.as_deref(),
        content_type.as_deref(),
    );

    info!(
        "Downloaded {} bytes from {} as '{}'",
        bytes.len(),
        url,
        filename
    );

    Ok(ResolvedPayload {
        bytes,
        filename,
        extension,
    })
}

fn parse_http_url(url: &str) -> Result<Url, Doc2TextError> {
    let parsed = Url::parse(url).map_err(|e| Doc2TextError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Doc2TextError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

fn map_reqwest_error(url: &str, e: reqwest::Error, timeout_secs: u64) -> Doc2TextError {
    if e.is_timeout() {
        Doc2TextError::DownloadTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else if e.is_redirect() {
        Doc2TextError::DownloadFailed {
            url: url.to_string(),
            reason: format!("redirect limit exceeded: {e}"),
        }
    } else {
        Doc2TextError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

fn header_str(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ── Name inference ───────────────────────────────────────────────────────

/// Infer `(filename, extension)` for a downloaded document.
pub(crate) fn infer_remote_name(
    url: &Url,
    content_disposition: Option<&str>,
    content_type: Option<&str>,
) -> (String, String) {
    let from_url = url_last_segment(url).filter(|s| s.contains('.'));
    let from_disposition = content_disposition.and_then(content_disposition_filename);

    for candidate in [from_url, from_disposition].into_iter().flatten() {
        if let Some(ext) = extension_of(&candidate) {
            return (candidate, ext);
        }
    }

    let ext = content_type
        .and_then(extension_for_content_type)
        .unwrap_or(DEFAULT_EXTENSION);
    (format!("downloaded.{ext}"), ext.to_string())
}

/// Last non-empty path segment; query and fragment are already split off by `Url`.
fn url_last_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty())
        .map(str::to_string)
}

static DISPOSITION_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename\*?\s*=\s*(?:[\w-]+'[\w-]*')?"?([^";]+)"?"#)
        .expect("static regex is valid")
});

/// The `filename=` (or `filename*=`) parameter of a `Content-Disposition` header.
pub(crate) fn content_disposition_filename(header: &str) -> Option<String> {
    let raw = DISPOSITION_FILENAME
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())?;

    // Never trust directory components from a remote server.
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// Map a MIME type to the extension the classifier understands.
pub(crate) fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if mime.contains("pdf") {
        Some("pdf")
    } else if mime.contains("jpeg") || mime.contains("jpg") {
        Some("jpg")
    } else if mime.contains("png") {
        Some("png")
    } else if mime.contains("wordprocessingml") {
        Some("docx")
    } else if mime.contains("presentationml") {
        Some("pptx")
    } else if mime.contains("spreadsheetml") {
        Some("xlsx")
    } else if mime == "text/html" || mime == "application/xhtml+xml" {
        Some("html")
    } else if mime == "application/epub+zip" {
        Some("epub")
    } else if mime.ends_with("/rtf") {
        Some("rtf")
    } else if mime == "text/markdown" {
        Some("md")
    } else {
        None
    }
}

/// Sanitised, lower-case extension of `filename` without the dot.
///
/// Only ASCII alphanumerics up to 16 characters are accepted, so the value
/// is always safe to use as a temp-file suffix.
pub fn extension_of(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
