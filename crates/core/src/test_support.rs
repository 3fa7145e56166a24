// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::model::{FailureCategory, FileState, JobId, JobReason, PathConfig, PipelineStage, Priority};
use crate::{Event, Job, RememberedPath};
use std::path::PathBuf;

pub fn remembered_path(path: &str) -> RememberedPath {
    RememberedPath::new(PathBuf::from(path), 1_000_000, None)
}

pub fn file_state(path: &str, parent: &str, hash: &str) -> FileState {
    FileState::new(PathBuf::from(path), PathBuf::from(parent), hash.to_string(), 0, 0)
}

pub fn job(path: &str, parent: &str) -> Job {
    Job::new(
        PathBuf::from(path),
        PathBuf::from(parent),
        JobReason::Modified,
        vec![PipelineStage::Metadata],
        1_000_000,
        Priority::Normal,
    )
}

pub fn path_remembered_event(path: &str) -> Event {
    Event::PathRemembered { path: PathBuf::from(path), config: None, at_ms: 1_000_000 }
}

pub fn path_changed_event(path: &str, parent: &str) -> Event {
    Event::PathChanged { path: PathBuf::from(path), parent: PathBuf::from(parent), at_ms: 1_000_000 }
}

pub fn path_deleted_event(path: &str, parent: &str) -> Event {
    Event::PathDeleted { path: PathBuf::from(path), parent: PathBuf::from(parent), at_ms: 1_000_000 }
}

pub fn analysis_failed_event(path: &str) -> Event {
    Event::AnalysisFailed {
        job_id: JobId::new(),
        path: PathBuf::from(path),
        stage: PipelineStage::Metadata,
        error: "boom".to_string(),
        category: FailureCategory::Transient,
        at_ms: 1_000_000,
    }
}

pub fn default_path_config() -> PathConfig {
    PathConfig::default()
}
