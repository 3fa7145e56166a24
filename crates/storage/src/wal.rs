// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Append-only write-ahead log of [`RegistryOp`]s, NDJSON-encoded.

use crate::error::RegistryError;
use crate::state::RegistryOp;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub struct Wal {
    path: PathBuf,
    file: std::fs::File,
    len: u64,
}

impl Wal {
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| RegistryError::Write { path: path.to_path_buf(), source })?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| RegistryError::Write { path: path.to_path_buf(), source })?;
        let len = Self::replay(path)?.len() as u64;
        Ok(Self { path: path.to_path_buf(), file, len })
    }

    /// Reads every `RegistryOp` currently recorded in the WAL file at
    /// `path`, in append order. Used at startup (replay onto a loaded
    /// snapshot) and by the checkpoint compaction task.
    pub fn replay(path: &Path) -> Result<Vec<RegistryOp>, RegistryError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = std::fs::File::open(path).map_err(|source| RegistryError::Read { path: path.to_path_buf(), source })?;
        let reader = std::io::BufReader::new(file);
        let mut ops = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|source| RegistryError::Read { path: path.to_path_buf(), source })?;
            if line.trim().is_empty() {
                continue;
            }
            let op: RegistryOp = serde_json::from_str(&line).map_err(|e| RegistryError::CorruptSnapshot {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            ops.push(op);
        }
        Ok(ops)
    }

    pub fn append(&mut self, op: &RegistryOp) -> Result<(), RegistryError> {
        let line = serde_json::to_string(op).map_err(|e| RegistryError::CorruptSnapshot {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        writeln!(self.file, "{line}").map_err(|source| RegistryError::Write { path: self.path.clone(), source })?;
        self.file.flush().map_err(|source| RegistryError::Write { path: self.path.clone(), source })?;
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Truncates the WAL file to empty (called right after a checkpoint
    /// snapshot has durably captured everything the log held).
    pub fn truncate(&mut self) -> Result<(), RegistryError> {
        self.file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|source| RegistryError::Write { path: self.path.clone(), source })?;
        self.len = 0;
        Ok(())
    }
}
