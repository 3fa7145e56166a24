// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Request bodies for the daemon's control-plane endpoints (§4.I).

use crate::status::{ReadEnvelope, ReadFormat};
use memo_core::PathConfig;
use std::path::PathBuf;

/// `POST /remember` — registers or updates a root and triggers a walk.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RememberRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub patch: Option<PathConfig>,
}

/// `POST /forget` — removes a root. Cascades its graph/registry state
/// unless `keep_data` is set.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForgetRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub keep_data: bool,
}

/// `POST /rebuild?full=bool` query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RebuildQuery {
    #[serde(default)]
    pub full: bool,
}

/// `POST /read` — exports a graph snapshot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReadRequest {
    pub format: ReadFormat,
    #[serde(default)]
    pub envelope: ReadEnvelope,
    #[serde(default)]
    pub max_files: Option<u64>,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
