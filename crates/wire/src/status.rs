// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Summary types shared between `/list` and `/read` responses.

use memo_core::{FailureCategory, PathConfig, PipelineStage};
use std::collections::HashMap;
use std::path::PathBuf;

/// `GET /list` entry: one remembered root plus a coarse status string
/// derived from its `FileState` set, not the raw registry row.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RememberedPathSummary {
    pub path: PathBuf,
    pub created_at_ms: u64,
    pub last_walk_at_ms: Option<u64>,
    pub config: Option<PathConfig>,
    pub file_count: u64,
    pub pending_count: u64,
    pub failed_count: u64,
}

/// `POST /read` per-file entry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileStateSummary {
    pub path: PathBuf,
    pub content_hash: String,
    pub size: u64,
    pub mtime_ms: u64,
    pub stages: HashMap<PipelineStage, StageSummary>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageSummary {
    pub current: bool,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_category: Option<FailureCategory>,
}

/// Response payload shape for `/read`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFormat {
    #[default]
    Json,
}

/// How much detail `/read` includes per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadEnvelope {
    /// Path, hashes, and per-stage status only.
    #[default]
    Summary,
    /// Adds tags/topics/entities/references and chunk text.
    Full,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
