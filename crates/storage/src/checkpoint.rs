// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Compacts the WAL into a fresh snapshot once it grows past
//! `wal_compact_threshold` entries or `wal_compact_interval` elapses (§4.B).

use crate::error::RegistryError;
use crate::snapshot;
use crate::state::MaterializedState;
use crate::wal::Wal;
use std::path::Path;

pub fn checkpoint(snapshot_path: &Path, wal: &mut Wal, state: &MaterializedState) -> Result<(), RegistryError> {
    snapshot::save(snapshot_path, state)?;
    wal.truncate()?;
    tracing::info!(path = %snapshot_path.display(), "checkpointed registry snapshot");
    Ok(())
}
