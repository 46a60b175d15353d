//! Request-scoped temporary files.
//!
//! Every engine needs a file-system path: pdfium opens files, tesseract and
//! pandoc read paths. [`acquire`] writes the payload to a uniquely named file
//! inside the scratch directory and returns a [`ManagedTempFile`] owned by
//! exactly one orchestration call.
//!
//! The orchestrator calls [`ManagedTempFile::release`] on every exit path once
//! acquisition succeeded. `Drop` performs the same release, which covers
//! panics and cancelled requests (client disconnects drop the handler future).

use crate::error::Doc2TextError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};

/// Prefix of every scratch file created by this crate.
pub const TEMP_PREFIX: &str = "doc2text-";

/// A scratch file that is removed exactly once.
#[derive(Debug)]
pub struct ManagedTempFile {
    path: PathBuf,
    inner: Option<TempPath>,
}

impl ManagedTempFile {
    /// Path of the backing file. Stays valid until [`release`](Self::release).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` once the file has been removed.
    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    /// Remove the backing file.
    ///
    /// Idempotent: later calls are no-ops and a file that already vanished is
    /// not an error. Removal failures are logged, never propagated, so that
    /// they cannot mask the request's own result.
    pub fn release(&mut self) {
        let Some(temp_path) = self.inner.take() else {
            return;
        };

        match temp_path.close() {
            Ok(()) => debug!("Released scratch file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Scratch file {} already removed", self.path.display())
            }
            Err(e) => warn!(
                "Failed to remove scratch file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for ManagedTempFile {
    fn drop(&mut self) {
        if self.inner.is_some() {
            debug!(
                "Scratch file {} released on drop",
                self.path.display()
            );
            self.release();
        }
    }
}

/// Write `bytes` to a fresh `doc2text-*.<extension>` file in `scratch_dir`.
///
/// Uniqueness comes from `tempfile`'s random name generation with `O_EXCL`
/// creation, so concurrent requests never share a path.
pub fn acquire(
    bytes: &[u8],
    extension: &str,
    scratch_dir: &Path,
) -> Result<ManagedTempFile, Doc2TextError> {
    let write_failed = |source: std::io::Error| Doc2TextError::ScratchWriteFailed {
        dir: scratch_dir.to_path_buf(),
        source,
    };

    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{}", extension.trim_start_matches('.'))
    };

    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(&suffix)
        .tempfile_in(scratch_dir)
        .map_err(write_failed)?;

    // On a failed write `file` is dropped here and tempfile removes it.
    file.write_all(bytes).map_err(write_failed)?;
    file.flush().map_err(write_failed)?;

    // Close our handle; engines open the path themselves.
    let temp_path = file.into_temp_path();
    let path = temp_path.to_path_buf();
    debug!("Acquired scratch file {} ({} bytes)", path.display(), bytes.len());

    Ok(ManagedTempFile {
        path,
        inner: Some(temp_path),
    })
}
