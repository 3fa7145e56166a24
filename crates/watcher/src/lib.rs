// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! memo-watcher: per-root OS file watch plus the debounce buffer that
//! turns raw filesystem churn into `path_changed` / `path_deleted` bus
//! events (§4.C).

mod debounce;
mod root;

pub use debounce::{Debouncer, PendingKind};
pub use root::{RootWatcher, WatcherConfig, WatcherError};
