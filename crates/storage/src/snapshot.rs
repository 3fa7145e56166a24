// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Zstd-compressed JSON snapshot of [`MaterializedState`], stamped with
//! a schema version (§3, §6).

use crate::error::RegistryError;
use crate::state::{MaterializedState, SCHEMA_VERSION};
use std::path::Path;

const ZSTD_LEVEL: i32 = 3;

pub fn save(path: &Path, state: &MaterializedState) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RegistryError::Write { path: path.to_path_buf(), source })?;
    }
    let json = serde_json::to_vec(state).map_err(|e| RegistryError::CorruptSnapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)
        .map_err(|source| RegistryError::Write { path: path.to_path_buf(), source })?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &compressed).map_err(|source| RegistryError::Write { path: path.to_path_buf(), source })?;
    std::fs::rename(&tmp, path).map_err(|source| RegistryError::Write { path: path.to_path_buf(), source })?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Option<MaterializedState>, RegistryError> {
    if !path.exists() {
        return Ok(None);
    }
    let compressed = std::fs::read(path).map_err(|source| RegistryError::Read { path: path.to_path_buf(), source })?;
    let json = zstd::decode_all(compressed.as_slice()).map_err(|e| RegistryError::CorruptSnapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut state: MaterializedState = serde_json::from_slice(&json).map_err(|e| RegistryError::CorruptSnapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if state.schema_version > SCHEMA_VERSION {
        return Err(RegistryError::UnsupportedSchema { found: state.schema_version, supported: SCHEMA_VERSION });
    }
    if state.schema_version < SCHEMA_VERSION {
        state = state.migrate();
    }
    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RegistryOp;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.snapshot");
        let mut state = MaterializedState::new();
        state.apply(&RegistryOp::AddPath { path: "/a".into(), created_at_ms: 1, config: None });
        save(&path, &state).unwrap();
        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.remembered.len(), 1);
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("nope.snapshot")).unwrap().is_none());
    }

    #[test]
    fn load_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.snapshot");
        let mut state = MaterializedState::new();
        state.schema_version = SCHEMA_VERSION + 1;
        save(&path, &state).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedSchema { .. }));
    }
}
