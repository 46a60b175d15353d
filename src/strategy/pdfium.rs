//! Locating and binding the pdfium shared library.
//!
//! Resolution order (first match wins):
//!
//! 1. `ExtractionConfig::pdfium_library_path`: a file, or a directory
//!    containing the platform library (`libpdfium.so`, `libpdfium.dylib`,
//!    `pdfium.dll`).
//! 2. `PDFIUM_LIB_PATH`: same rules.
//! 3. The system library search path.
//!
//! Each successful location is cached for the life of the process, keyed by
//! the explicit path it was resolved for, so later requests skip the
//! file-system probing and extractors configured with different paths keep
//! their own library. A fresh [`Pdfium`] handle is
//! still bound per extraction because pdfium handles are tied to the blocking
//! thread that uses them.

use crate::error::Doc2TextError;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

const ENGINE: &str = "pdfium";

/// Where the library was found.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LibraryLocation {
    File(PathBuf),
    System,
}

static RESOLVED: Lazy<Mutex<HashMap<Option<PathBuf>, LibraryLocation>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Bind to pdfium, honouring an explicit library path when given.
pub fn bind(explicit: Option<&Path>) -> Result<Pdfium, Doc2TextError> {
    if let Some(location) = cached(explicit) {
        return bind_location(&location);
    }

    let location = resolve_location(explicit);
    let pdfium = bind_location(&location)?;
    remember(explicit, location);
    Ok(pdfium)
}

fn cached(explicit: Option<&Path>) -> Option<LibraryLocation> {
    let key = explicit.map(Path::to_path_buf);
    RESOLVED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned()
}

fn remember(explicit: Option<&Path>, location: LibraryLocation) {
    RESOLVED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(explicit.map(Path::to_path_buf), location);
}

/// `true` if pdfium can be bound in this environment.
pub fn is_available(explicit: Option<&Path>) -> bool {
    bind(explicit).is_ok()
}

fn resolve_location(explicit: Option<&Path>) -> LibraryLocation {
    let env_path = std::env::var_os("PDFIUM_LIB_PATH")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    for candidate in explicit.map(Path::to_path_buf).into_iter().chain(env_path) {
        let file = library_file(&candidate);
        if file.exists() {
            debug!("Using pdfium library at {}", file.display());
            return LibraryLocation::File(file);
        }
        debug!("pdfium library not found at {}", candidate.display());
    }

    LibraryLocation::System
}

/// Accept either the library file itself or its directory.
fn library_file(candidate: &Path) -> PathBuf {
    if candidate.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(candidate)
    } else {
        candidate.to_path_buf()
    }
}

fn bind_location(location: &LibraryLocation) -> Result<Pdfium, Doc2TextError> {
    let bindings = match location {
        LibraryLocation::File(path) => Pdfium::bind_to_library(path).map_err(|e| {
            Doc2TextError::EngineUnavailable {
                engine: ENGINE,
                hint: format!("failed to load '{}': {e}", path.display()),
            }
        })?,
        LibraryLocation::System => Pdfium::bind_to_system_library().map_err(|e| {
            Doc2TextError::EngineUnavailable {
                engine: ENGINE,
                hint: format!(
                    "no system pdfium library ({e}). Set PDFIUM_LIB_PATH=/path/to/libpdfium \
                     or pass --pdfium-lib."
                ),
            }
        })?,
    };
    Ok(Pdfium::new(bindings))
}
