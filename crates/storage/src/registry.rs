// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! The Registry's public API (§4.B). Every operation is atomic per call:
//! the in-memory state is updated and the WAL record is appended while
//! holding a single lock, so a crash between the two cannot happen from
//! the caller's point of view (either both happened or neither did).

use crate::error::RegistryError;
use crate::state::{MaterializedState, RegistryOp, RememberedMeta};
use crate::wal::Wal;
use crate::{checkpoint, snapshot};
use memo_core::model::PipelineStage;
use memo_core::{FileState, PathConfig, RememberedPath};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathHealth {
    Ok,
    Missing,
    Inaccessible,
}

pub struct RegistryPaths {
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
}

struct Inner {
    state: MaterializedState,
    wal: Wal,
}

pub struct Registry {
    paths: RegistryPaths,
    inner: Mutex<Inner>,
}

impl Registry {
    /// Rebuilds state from a snapshot (if present) plus replay of the WAL
    /// recorded since that snapshot, matching the daemon's general
    /// durability scheme.
    pub fn open(paths: RegistryPaths) -> Result<Self, RegistryError> {
        let mut state = snapshot::load(&paths.snapshot_path)?.unwrap_or_else(MaterializedState::new);
        for op in Wal::replay(&paths.wal_path)? {
            state.apply(&op);
        }
        let wal = Wal::open(&paths.wal_path)?;
        Ok(Self { paths, inner: Mutex::new(Inner { state, wal }) })
    }

    fn record(&self, inner: &mut Inner, op: RegistryOp) -> Result<(), RegistryError> {
        inner.state.apply(&op);
        inner.wal.append(&op)
    }

    // -- remembered_paths / path_config -------------------------------

    pub fn add_path(&self, path: &Path, created_at_ms: u64, config: Option<PathConfig>) -> Result<(), RegistryError> {
        let path = clean_absolute(path);
        let mut inner = self.inner.lock();
        if inner.state.remembered.contains_key(&path) {
            return Err(RegistryError::PathExists(path));
        }
        let config = config.map(PathConfig::normalized);
        self.record(&mut inner, RegistryOp::AddPath { path, created_at_ms, config })
    }

    /// Does not cascade FileStates; callers that want cascade call
    /// [`Registry::delete_file_states_for_path`] explicitly first.
    pub fn remove_path(&self, path: &Path) -> Result<(), RegistryError> {
        let path = clean_absolute(path);
        let mut inner = self.inner.lock();
        if !inner.state.remembered.contains_key(&path) {
            return Err(RegistryError::PathNotFound(path));
        }
        self.record(&mut inner, RegistryOp::RemovePath { path })
    }

    pub fn get_path(&self, path: &Path) -> Option<RememberedPath> {
        let path = clean_absolute(path);
        let inner = self.inner.lock();
        let meta = inner.state.remembered.get(&path)?;
        Some(to_remembered_path(&path, meta, inner.state.path_config.get(&path)))
    }

    pub fn list_paths(&self) -> Vec<RememberedPath> {
        let inner = self.inner.lock();
        inner
            .state
            .remembered
            .iter()
            .map(|(path, meta)| to_remembered_path(path, meta, inner.state.path_config.get(path)))
            .collect()
    }

    pub fn update_path_config(&self, path: &Path, config: Option<PathConfig>) -> Result<(), RegistryError> {
        let path = clean_absolute(path);
        let mut inner = self.inner.lock();
        if !inner.state.remembered.contains_key(&path) {
            return Err(RegistryError::PathNotFound(path));
        }
        let config = config.map(PathConfig::normalized);
        self.record(&mut inner, RegistryOp::UpdatePathConfig { path, config })
    }

    pub fn update_path_last_walk(&self, path: &Path, at_ms: u64) -> Result<(), RegistryError> {
        let path = clean_absolute(path);
        let mut inner = self.inner.lock();
        if !inner.state.remembered.contains_key(&path) {
            return Err(RegistryError::PathNotFound(path));
        }
        self.record(&mut inner, RegistryOp::UpdatePathLastWalk { path, at_ms })
    }

    /// Returns the longest remembered-path prefix containing `file_path`.
    pub fn find_containing_path(&self, file_path: &Path) -> Option<PathBuf> {
        let inner = self.inner.lock();
        memo_core::model::find_containing_path(file_path, inner.state.remembered.keys())
    }

    /// Merges daemon defaults with the containing root's `PathConfig`.
    pub fn get_effective_config(&self, file_path: &Path, defaults: &PathConfig) -> PathConfig {
        let root = self.find_containing_path(file_path);
        let inner = self.inner.lock();
        match root.and_then(|root| inner.state.path_config.get(&root).cloned()) {
            Some(root_config) => root_config.merge_over(defaults),
            None => defaults.clone().normalized(),
        }
    }

    // -- file_state -----------------------------------------------------

    pub fn get_file_state(&self, path: &Path) -> Option<FileState> {
        self.inner.lock().state.file_state.get(path).cloned()
    }

    /// Invariant (3): `parent` is set to `find_containing_path` at insert.
    /// Invariant (4): `analysis_version` for a stage only moves forward
    /// for the same `content_hash`; a new content hash resets all stages.
    pub fn update_file_state(&self, mut state: FileState) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let parent = memo_core::model::find_containing_path(&state.path, inner.state.remembered.keys())
            .unwrap_or_else(|| state.parent.clone());
        state.parent = parent;
        if let Some(existing) = inner.state.file_state.get(&state.path) {
            if existing.content_hash != state.content_hash {
                for stage in PipelineStage::ALL {
                    state.stages.insert(stage, memo_core::StageState::absent());
                }
            } else {
                for stage in PipelineStage::ALL {
                    if let (Some(existing_stage), Some(new_stage)) =
                        (existing.stages.get(&stage), state.stages.get_mut(&stage))
                    {
                        if new_stage.analysis_version < existing_stage.analysis_version {
                            *new_stage = existing_stage.clone();
                        }
                    }
                }
            }
        }
        self.record(&mut inner, RegistryOp::UpsertFileState { state })
    }

    pub fn update_stage(
        &self,
        path: &Path,
        stage: PipelineStage,
        new_state: memo_core::StageState,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let mut file_state = inner
            .state
            .file_state
            .get(path)
            .cloned()
            .ok_or_else(|| RegistryError::FileStateNotFound(path.to_path_buf()))?;
        file_state.stages.insert(stage, new_state);
        self.record(&mut inner, RegistryOp::UpsertFileState { state: file_state })
    }

    pub fn clear_analysis_state(&self, path: &Path) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let mut file_state = inner
            .state
            .file_state
            .get(path)
            .cloned()
            .ok_or_else(|| RegistryError::FileStateNotFound(path.to_path_buf()))?;
        for stage in PipelineStage::ALL {
            file_state.stages.insert(stage, memo_core::StageState::absent());
        }
        self.record(&mut inner, RegistryOp::UpsertFileState { state: file_state })
    }

    pub fn delete_file_state(&self, path: &Path) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        self.record(&mut inner, RegistryOp::DeleteFileState { path: path.to_path_buf() })
    }

    pub fn delete_file_states_for_path(&self, parent: &Path) -> Result<u64, RegistryError> {
        let mut inner = self.inner.lock();
        let count = inner.state.file_state.values().filter(|s| s.parent == parent).count() as u64;
        self.record(&mut inner, RegistryOp::DeleteFileStatesForPath { parent: parent.to_path_buf() })?;
        Ok(count)
    }

    pub fn list_file_states(&self, parent: &Path) -> Vec<FileState> {
        self.inner.lock().state.file_state.values().filter(|s| s.parent == parent).cloned().collect()
    }

    pub fn list_files_needing(&self, parent: &Path, stage: PipelineStage, max_retries: u32) -> Vec<PathBuf> {
        self.inner
            .lock()
            .state
            .file_state
            .values()
            .filter(|s| &s.parent == parent)
            .filter(|s| s.stages_needing(max_retries).contains(&stage))
            .map(|s| s.path.clone())
            .collect()
    }

    // -- health / maintenance --------------------------------------------

    pub fn check_path_health(&self) -> Vec<(PathBuf, PathHealth)> {
        self.list_paths()
            .into_iter()
            .map(|root| {
                let health = match std::fs::metadata(&root.path) {
                    Ok(_) => PathHealth::Ok,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => PathHealth::Missing,
                    Err(_) => PathHealth::Inaccessible,
                };
                (root.path, health)
            })
            .collect()
    }

    /// Removes entries whose roots no longer exist on disk.
    pub fn validate_and_clean_paths(&self) -> Result<Vec<PathBuf>, RegistryError> {
        let mut removed = Vec::new();
        for (path, health) in self.check_path_health() {
            if health == PathHealth::Missing {
                self.remove_path(&path)?;
                removed.push(path);
            }
        }
        Ok(removed)
    }

    /// Compacts the WAL into a fresh snapshot if it has grown past
    /// `threshold` entries.
    pub fn compact_if_needed(&self, threshold: u64) -> Result<bool, RegistryError> {
        let mut inner = self.inner.lock();
        if inner.wal.len() < threshold {
            return Ok(false);
        }
        checkpoint::checkpoint(&self.paths.snapshot_path, &mut inner.wal, &inner.state)?;
        Ok(true)
    }

    pub fn wal_len(&self) -> u64 {
        self.inner.lock().wal.len()
    }
}

fn clean_absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    }
}

fn to_remembered_path(path: &Path, meta: &RememberedMeta, config: Option<&PathConfig>) -> RememberedPath {
    RememberedPath {
        path: path.to_path_buf(),
        created_at_ms: meta.created_at_ms,
        last_walk_at_ms: meta.last_walk_at_ms,
        config: config.cloned(),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
