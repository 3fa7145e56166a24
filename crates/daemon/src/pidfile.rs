// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! PID file handling (§4.I, §6): an exclusive `flock` prevents a second
//! daemon instance from starting against the same state directory, and
//! the held file is truncated and rewritten with the current PID.

use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("another daemon instance already holds the lock on {0}")]
    AlreadyRunning(PathBuf),
    #[error("failed to write PID file {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// Opens (creating if needed), locks, truncates, and writes the current
/// process id to `path`. The returned [`File`] must be held for the
/// daemon's lifetime — dropping it releases the lock.
pub fn write_pid_file(path: &Path) -> Result<File, PidFileError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| PidFileError::Io { path: path.to_path_buf(), source })?;
    }
    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|source| PidFileError::Io { path: path.to_path_buf(), source })?;
    file.try_lock_exclusive().map_err(|_| PidFileError::AlreadyRunning(path.to_path_buf()))?;

    file.set_len(0).map_err(|source| PidFileError::Io { path: path.to_path_buf(), source })?;
    writeln!(file, "{}", std::process::id()).map_err(|source| PidFileError::Io { path: path.to_path_buf(), source })?;
    Ok(file)
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
