// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Durable registry storage: materialized state, write-ahead log, and
//! zstd snapshot checkpointing (§4.B).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod checkpoint;
pub mod error;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod wal;

pub use error::RegistryError;
pub use registry::{PathHealth, Registry, RegistryPaths};
pub use state::{MaterializedState, RegistryOp, RememberedMeta};
pub use wal::Wal;
