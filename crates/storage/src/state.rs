// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! `MaterializedState`: the in-memory projection of the three logical
//! tables the Registry owns — `remembered_paths`, `path_config`,
//! `file_state` (§4.B). Rebuilt at startup from a snapshot plus WAL
//! replay; mutated thereafter only through [`RegistryOp`] so every
//! mutation is both applied in memory and recorded durably.

use memo_core::{FileState, PathConfig};
use std::collections::HashMap;
use std::path::PathBuf;

/// Current on-disk/wal schema version this binary understands.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RememberedMeta {
    pub created_at_ms: u64,
    pub last_walk_at_ms: Option<u64>,
}

/// A single durable mutation to the Registry's tables. This is the WAL's
/// unit of record — distinct from the bus [`memo_core::Event`] enum,
/// since the Registry needs finer-grained records (e.g. a bare content
/// hash update) than the bus's closed event set carries.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum RegistryOp {
    AddPath { path: PathBuf, created_at_ms: u64, config: Option<PathConfig> },
    RemovePath { path: PathBuf },
    UpdatePathConfig { path: PathBuf, config: Option<PathConfig> },
    UpdatePathLastWalk { path: PathBuf, at_ms: u64 },
    UpsertFileState { state: FileState },
    DeleteFileState { path: PathBuf },
    DeleteFileStatesForPath { parent: PathBuf },
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MaterializedState {
    pub schema_version: u32,
    pub remembered: HashMap<PathBuf, RememberedMeta>,
    pub path_config: HashMap<PathBuf, PathConfig>,
    pub file_state: HashMap<PathBuf, FileState>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self { schema_version: SCHEMA_VERSION, ..Default::default() }
    }

    /// Migrates an older snapshot forward in memory. A no-op today (one
    /// schema version exists); the seam exists so a format change doesn't
    /// require a flag day.
    pub fn migrate(mut self) -> Self {
        self.schema_version = SCHEMA_VERSION;
        self
    }

    pub fn apply(&mut self, op: &RegistryOp) {
        match op {
            RegistryOp::AddPath { path, created_at_ms, config } => {
                self.remembered
                    .insert(path.clone(), RememberedMeta { created_at_ms: *created_at_ms, last_walk_at_ms: None });
                if let Some(config) = config {
                    self.path_config.insert(path.clone(), config.clone());
                }
            }
            RegistryOp::RemovePath { path } => {
                self.remembered.remove(path);
                self.path_config.remove(path);
            }
            RegistryOp::UpdatePathConfig { path, config } => match config {
                Some(config) => {
                    self.path_config.insert(path.clone(), config.clone());
                }
                None => {
                    self.path_config.remove(path);
                }
            },
            RegistryOp::UpdatePathLastWalk { path, at_ms } => {
                if let Some(meta) = self.remembered.get_mut(path) {
                    meta.last_walk_at_ms = Some(*at_ms);
                }
            }
            RegistryOp::UpsertFileState { state } => {
                self.file_state.insert(state.path.clone(), state.clone());
            }
            RegistryOp::DeleteFileState { path } => {
                self.file_state.remove(path);
            }
            RegistryOp::DeleteFileStatesForPath { parent } => {
                self.file_state.retain(|_, state| &state.parent != parent);
            }
        }
    }
}
