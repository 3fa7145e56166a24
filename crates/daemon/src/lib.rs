// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Memorizer daemon: the Orchestrator that brings up every component in
//! dependency order and the HTTP control plane built on top of it (§4.I).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod health;
mod http;
mod orchestrator;
mod pidfile;
mod signals;

pub use health::SharedHealth;
pub use http::{build_router, AppState};
pub use orchestrator::{Orchestrator, OrchestratorError, RebuildOutcome};
pub use pidfile::{write_pid_file, PidFileError};
pub use signals::{wait_for_shutdown_signal, ShutdownReason};
