//! Pipeline stages that run before a strategy sees the document.
//!
//! Each submodule implements exactly one step so each is independently
//! testable.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ scope ──▶ classify ──▶ strategy ──▶ scope.release()
//! (upload/URL) (temp file) (extension)  (pdf/ocr/convert)
//! ```
//!
//! 1. [`source`]: resolve an upload or `file_url` into bytes plus a
//!    best-effort filename and extension
//! 2. [`scope`]: write the bytes to a uniquely named scratch file that is
//!    removed on every exit path
//! 3. [`classify`]: pick the extraction strategy from the extension

pub mod classify;
pub mod scope;
pub mod source;
