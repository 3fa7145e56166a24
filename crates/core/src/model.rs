// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Domain types shared by every component: remembered roots, per-file
//! state, work items, and the health snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

crate::define_id! {
    /// Identifies a queued or in-flight analysis [`Job`].
    pub struct JobId("job-");
}

crate::define_id! {
    /// Identifies a chunk produced by the analysis pipeline's chunk stage.
    pub struct ChunkId("chk-");
}

/// Tri-state override: unset means "inherit the daemon default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

/// Per-root filter policy. Include rules override matching skip rules for
/// the same item; an empty optional list means "inherit daemon defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PathConfig {
    #[serde(default)]
    pub skip_extensions: Vec<String>,
    #[serde(default)]
    pub skip_directories: Vec<String>,
    #[serde(default)]
    pub skip_files: Vec<String>,
    #[serde(default)]
    pub include_extensions: Vec<String>,
    #[serde(default)]
    pub include_directories: Vec<String>,
    #[serde(default)]
    pub include_files: Vec<String>,
    #[serde(default)]
    pub skip_hidden: bool,
    #[serde(default)]
    pub use_vision: TriState,
}

impl PathConfig {
    /// Normalizes extension lists so every entry starts with `.`.
    pub fn normalized(mut self) -> Self {
        for list in [
            &mut self.skip_extensions,
            &mut self.include_extensions,
        ] {
            for ext in list.iter_mut() {
                if !ext.starts_with('.') {
                    *ext = format!(".{ext}");
                }
            }
        }
        self
    }

    /// Merges `self` (root-specific) over `defaults`, field by field: an
    /// empty list inherits the default's list, a non-empty list replaces it.
    pub fn merge_over(&self, defaults: &PathConfig) -> PathConfig {
        fn pick(root: &[String], default: &[String]) -> Vec<String> {
            if root.is_empty() {
                default.to_vec()
            } else {
                root.to_vec()
            }
        }
        PathConfig {
            skip_extensions: pick(&self.skip_extensions, &defaults.skip_extensions),
            skip_directories: pick(&self.skip_directories, &defaults.skip_directories),
            skip_files: pick(&self.skip_files, &defaults.skip_files),
            include_extensions: pick(&self.include_extensions, &defaults.include_extensions),
            include_directories: pick(&self.include_directories, &defaults.include_directories),
            include_files: pick(&self.include_files, &defaults.include_files),
            skip_hidden: self.skip_hidden || defaults.skip_hidden,
            use_vision: match self.use_vision {
                TriState::Unset => defaults.use_vision,
                other => other,
            },
        }
        .normalized()
    }

    /// Returns true if `name` (a file or directory name, not a full path)
    /// should be skipped under this effective config.
    pub fn excludes_name(&self, name: &str, is_dir: bool) -> bool {
        if self.skip_hidden && name.starts_with('.') {
            if self.includes_name(name, is_dir) {
                return false;
            }
            return true;
        }
        if is_dir {
            if self.include_directories.iter().any(|d| d == name) {
                return false;
            }
            self.skip_directories.iter().any(|d| d == name)
        } else {
            if self.include_files.iter().any(|f| f == name) {
                return false;
            }
            let ext = std::path::Path::new(name)
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()));
            if self.include_extensions.iter().any(|e| Some(e) == ext.as_ref()) {
                return false;
            }
            self.skip_files.iter().any(|f| f == name)
                || ext
                    .as_ref()
                    .is_some_and(|ext| self.skip_extensions.contains(ext))
        }
    }

    fn includes_name(&self, name: &str, is_dir: bool) -> bool {
        if is_dir {
            self.include_directories.iter().any(|d| d == name)
        } else {
            self.include_files.iter().any(|f| f == name)
        }
    }
}

/// A registered root directory.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RememberedPath {
    pub path: PathBuf,
    pub created_at_ms: u64,
    pub last_walk_at_ms: Option<u64>,
    pub config: Option<PathConfig>,
}

impl RememberedPath {
    pub fn new(path: PathBuf, created_at_ms: u64, config: Option<PathConfig>) -> Self {
        Self { path, created_at_ms, last_walk_at_ms: None, config }
    }
}

/// One pipeline stage tracked in [`FileState`]. `Persist` is the final
/// write-to-graph step; its state can diverge from the others when the
/// graph store is unreachable (see the "attempted" crash window in the
/// analysis pipeline design).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Metadata,
    Semantic,
    Embeddings,
    Persist,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::Metadata,
        PipelineStage::Semantic,
        PipelineStage::Embeddings,
        PipelineStage::Persist,
    ];
}

crate::simple_display! {
    PipelineStage {
        Metadata => "metadata",
        Semantic => "semantic",
        Embeddings => "embeddings",
        Persist => "persist",
    }
}

/// Failure taxonomy for a pipeline stage (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Transient,
    PermanentInput,
    Policy,
    Fatal,
    Panic,
}

/// Status recorded for a single stage of a single file.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageState {
    pub status: StageStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub analysis_version: u32,
}

impl StageState {
    pub fn absent() -> Self {
        Self { status: StageStatus::Absent, attempts: 0, last_error: None, analysis_version: 0 }
    }

    pub fn current(analysis_version: u32) -> Self {
        Self { status: StageStatus::Current, attempts: 0, last_error: None, analysis_version }
    }

    /// Records a failed attempt. `attempts` is always >= 1 once `Failed`.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.status = StageStatus::Failed;
        self.attempts += 1;
        self.last_error = Some(error.into());
        self
    }

    pub fn is_current(&self) -> bool {
        self.status == StageStatus::Current
    }

    pub fn eligible_for_retry(&self, max_retries: u32) -> bool {
        self.status == StageStatus::Failed && self.attempts < max_retries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Absent,
    Current,
    Failed,
}

/// Per-file record owned exclusively by the Registry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileState {
    pub path: PathBuf,
    pub parent: PathBuf,
    pub content_hash: String,
    pub metadata_hash: String,
    pub size: u64,
    pub mtime_ms: u64,
    pub stages: HashMap<PipelineStage, StageState>,
}

impl FileState {
    pub fn new(path: PathBuf, parent: PathBuf, content_hash: String, size: u64, mtime_ms: u64) -> Self {
        let mut stages = HashMap::new();
        for stage in PipelineStage::ALL {
            stages.insert(stage, StageState::absent());
        }
        Self { path, parent, content_hash, metadata_hash: String::new(), size, mtime_ms, stages }
    }

    /// Invariant (b): `current` requires a non-empty content hash.
    pub fn is_current_stage(&self, stage: PipelineStage) -> bool {
        !self.content_hash.is_empty()
            && self.stages.get(&stage).is_some_and(StageState::is_current)
    }

    pub fn all_current(&self) -> bool {
        PipelineStage::ALL.iter().all(|s| self.is_current_stage(*s))
    }

    pub fn stages_needing(&self, max_retries: u32) -> Vec<PipelineStage> {
        PipelineStage::ALL
            .into_iter()
            .filter(|s| {
                let state = self.stages.get(s);
                match state {
                    None => true,
                    Some(st) if st.status == StageStatus::Absent => true,
                    Some(st) if st.status == StageStatus::Failed => {
                        st.eligible_for_retry(max_retries)
                    }
                    _ => false,
                }
            })
            .collect()
    }
}

/// Reason a [`Job`] was enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobReason {
    Created,
    Modified,
    Moved,
    Reconcile,
    FullRebuild,
}

/// Coalescing priority; used only to break ties when unioning Jobs for the
/// same path, never for starvation-prone scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Background,
    Normal,
    Critical,
}

/// A transient work item in the [Work queue](crate). Requested stages are
/// a subset of `{Metadata, Semantic, Embeddings}` — `Persist` is always
/// implied as the pipeline's final step and is never separately requested.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub id: JobId,
    pub path: PathBuf,
    pub parent: PathBuf,
    pub reason: JobReason,
    pub stages: Vec<PipelineStage>,
    pub enqueued_at_ms: u64,
    pub priority: Priority,
}

impl Job {
    pub fn new(
        path: PathBuf,
        parent: PathBuf,
        reason: JobReason,
        stages: Vec<PipelineStage>,
        enqueued_at_ms: u64,
        priority: Priority,
    ) -> Self {
        Self { id: JobId::new(), path, parent, reason, stages, enqueued_at_ms, priority }
    }

    /// Coalesces `other` into `self`: unions stages, keeps the earlier
    /// enqueue time, upgrades priority to the max of the two.
    pub fn coalesce(&mut self, other: &Job) {
        for stage in &other.stages {
            if !self.stages.contains(stage) {
                self.stages.push(*stage);
            }
        }
        self.enqueued_at_ms = self.enqueued_at_ms.min(other.enqueued_at_ms);
        self.priority = self.priority.max(other.priority);
    }
}

/// Per-component health, used by [`HealthStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Starting,
    Ready,
    Degraded,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub error: Option<String>,
}

impl ComponentHealth {
    pub fn ready() -> Self {
        Self { status: ComponentStatus::Ready, error: None }
    }

    pub fn starting() -> Self {
        Self { status: ComponentStatus::Starting, error: None }
    }

    pub fn degraded(error: impl Into<String>) -> Self {
        Self { status: ComponentStatus::Degraded, error: Some(error.into()) }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { status: ComponentStatus::Failed, error: Some(error.into()) }
    }

    pub fn stopped() -> Self {
        Self { status: ComponentStatus::Stopped, error: None }
    }
}

/// Orchestrator-level health snapshot (§4.I).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    pub ready: bool,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthStatus {
    /// Ready when Registry and Bus are ready and at least one Worker is
    /// alive; degraded when the graph adapter is disconnected but Registry
    /// and the pipeline can still enqueue; failed when Registry is
    /// unreachable.
    pub fn recompute_ready(&mut self) {
        let registry_ok = self
            .components
            .get("registry")
            .is_some_and(|c| c.status == ComponentStatus::Ready);
        let bus_ok = self.components.get("bus").is_some_and(|c| c.status == ComponentStatus::Ready);
        let any_worker_alive = self
            .components
            .iter()
            .any(|(k, v)| k.starts_with("worker-") && v.status == ComponentStatus::Ready);
        self.ready = registry_ok && bus_ok && any_worker_alive;
    }
}

/// Returns the longest remembered-path prefix containing `file_path`, if any.
pub fn find_containing_path<'a>(
    file_path: &Path,
    roots: impl IntoIterator<Item = &'a PathBuf>,
) -> Option<PathBuf> {
    roots
        .into_iter()
        .filter(|root| file_path.starts_with(root))
        .max_by_key(|root| root.as_os_str().len())
        .cloned()
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
