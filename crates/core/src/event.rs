// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! The closed set of typed messages carried on the event bus (§3, §4.A).

use crate::model::{FailureCategory, JobId, PathConfig, PipelineStage};
use std::path::PathBuf;

/// A bus event. The set is closed by design — unlike a general-purpose
/// event log, every kind here has a concrete subscriber in this repo, so
/// there is no forward-compatible catch-all variant.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    #[serde(rename = "path_remembered")]
    PathRemembered { path: PathBuf, config: Option<PathConfig>, at_ms: u64 },

    #[serde(rename = "path_forgotten")]
    PathForgotten { path: PathBuf, keep_data: bool, at_ms: u64 },

    #[serde(rename = "path_changed")]
    PathChanged { path: PathBuf, parent: PathBuf, at_ms: u64 },

    #[serde(rename = "path_deleted")]
    PathDeleted { path: PathBuf, parent: PathBuf, at_ms: u64 },

    #[serde(rename = "walk_started")]
    WalkStarted { root: PathBuf, at_ms: u64 },

    #[serde(rename = "walk_completed")]
    WalkCompleted { root: PathBuf, discovered_count: u64, duration_ms: u64, at_ms: u64 },

    #[serde(rename = "analysis_progress")]
    AnalysisProgress { job_id: JobId, path: PathBuf, stage: PipelineStage, at_ms: u64 },

    #[serde(rename = "analysis_completed")]
    AnalysisCompleted { job_id: JobId, path: PathBuf, stages_completed: Vec<PipelineStage>, at_ms: u64 },

    #[serde(rename = "analysis_failed")]
    AnalysisFailed {
        job_id: JobId,
        path: PathBuf,
        stage: PipelineStage,
        error: String,
        category: FailureCategory,
        at_ms: u64,
    },

    #[serde(rename = "config_reloaded")]
    ConfigReloaded { at_ms: u64 },

    #[serde(rename = "config_reload_failed")]
    ConfigReloadFailed { error: String, at_ms: u64 },
}

impl Event {
    /// The event's kind as the wire string used in `kind`/logging/metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PathRemembered { .. } => "path_remembered",
            Event::PathForgotten { .. } => "path_forgotten",
            Event::PathChanged { .. } => "path_changed",
            Event::PathDeleted { .. } => "path_deleted",
            Event::WalkStarted { .. } => "walk_started",
            Event::WalkCompleted { .. } => "walk_completed",
            Event::AnalysisProgress { .. } => "analysis_progress",
            Event::AnalysisCompleted { .. } => "analysis_completed",
            Event::AnalysisFailed { .. } => "analysis_failed",
            Event::ConfigReloaded { .. } => "config_reloaded",
            Event::ConfigReloadFailed { .. } => "config_reload_failed",
        }
    }

    /// Critical events spill to the durable overflow journal on bus
    /// saturation instead of being dropped (§4.A, GLOSSARY).
    pub fn is_critical(&self) -> bool {
        matches!(self, Event::PathDeleted { .. } | Event::ConfigReloadFailed { .. } | Event::AnalysisFailed { .. })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
