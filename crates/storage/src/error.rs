// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("path already remembered: {0}")]
    PathExists(PathBuf),
    #[error("path not remembered: {0}")]
    PathNotFound(PathBuf),
    #[error("file state not found: {0}")]
    FileStateNotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
    #[error("corrupt snapshot {path}: {message}")]
    CorruptSnapshot { path: PathBuf, message: String },
    #[error("snapshot schema version {found} is newer than this binary supports ({supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

impl memo_core::Classify for RegistryError {
    fn severity(&self) -> memo_core::Severity {
        match self {
            RegistryError::PathExists(_) => memo_core::Severity::Validation,
            RegistryError::PathNotFound(_) | RegistryError::FileStateNotFound(_) => {
                memo_core::Severity::NotFound
            }
            RegistryError::Read { .. } | RegistryError::Write { .. } => memo_core::Severity::Transient,
            RegistryError::CorruptSnapshot { .. } | RegistryError::UnsupportedSchema { .. } => {
                memo_core::Severity::Fatal
            }
        }
    }
}
