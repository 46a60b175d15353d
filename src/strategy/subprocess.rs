//! Running external engines (tesseract, pandoc) as child processes.

use crate::error::Doc2TextError;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Prepare a command for `program`, isolated to the scratch directory.
///
/// Engines get `XDG_CACHE_HOME` and `TMPDIR` pointed at `scratch_dir` so they
/// never depend on a read-only home or cache directory. `kill_on_drop` makes
/// a timed-out or cancelled extraction terminate the child.
pub(crate) fn engine_command(program: &Path, scratch_dir: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.env("XDG_CACHE_HOME", scratch_dir)
        .env("TMPDIR", scratch_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Spawn `cmd` and wait for it, mapping launch failures to engine errors.
///
/// A non-zero exit status is returned as `Ok(output)`; interpreting stderr is
/// the caller's job because only it knows the engine's error vocabulary.
pub(crate) async fn run(engine: &'static str, mut cmd: Command) -> Result<Output, Doc2TextError> {
    debug!("Running {engine}: {:?}", cmd.as_std());

    let child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Doc2TextError::EngineUnavailable {
                engine,
                hint: format!(
                    "'{}' executable not found on PATH",
                    cmd.as_std().get_program().to_string_lossy()
                ),
            }
        } else {
            Doc2TextError::EngineFailed {
                engine,
                detail: format!("failed to start: {e}"),
            }
        }
    })?;

    child
        .wait_with_output()
        .await
        .map_err(|e| Doc2TextError::EngineFailed {
            engine,
            detail: format!("failed to wait for process: {e}"),
        })
}

/// Trimmed, lossily decoded stderr for error messages.
pub(crate) fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}
