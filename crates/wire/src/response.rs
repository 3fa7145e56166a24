// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Response bodies for the daemon's control-plane endpoints (§4.I).
//! `/readyz` returns [`memo_core::HealthStatus`] directly since it is
//! already the exact shape the endpoint needs.

use crate::status::{FileStateSummary, RememberedPathSummary};
use std::path::PathBuf;

/// `GET /healthz` — liveness only, always `{"status": "ok"}` if the
/// process can answer at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthzResponse {
    pub status: &'static str,
}

impl Default for HealthzResponse {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

/// `POST /remember` response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RememberResponse {
    pub path: PathBuf,
    pub created: bool,
}

/// `POST /forget` response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForgetResponse {
    pub path: PathBuf,
    pub deleted_files: u64,
}

/// `GET /list` response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ListResponse {
    pub paths: Vec<RememberedPathSummary>,
}

/// `POST /rebuild` response.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RebuildResponse {
    pub roots_walked: u64,
    pub jobs_enqueued: u64,
    pub duration_ms: u64,
}

/// `POST /read` response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReadResponse {
    pub files: Vec<FileStateSummary>,
    /// True when `max_files` truncated the result.
    #[serde(default)]
    pub truncated: bool,
}

/// Error body for any non-2xx response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
