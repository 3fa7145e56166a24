// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Shared health snapshot the Orchestrator's components report into and
//! `/readyz` reads from (§4.I).

use memo_core::{ComponentHealth, HealthStatus};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cheaply cloned handle to the daemon's aggregate [`HealthStatus`].
#[derive(Clone, Default)]
pub struct SharedHealth(Arc<Mutex<HealthStatus>>);

impl SharedHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, component: impl Into<String>, health: ComponentHealth) {
        let mut status = self.0.lock();
        status.components.insert(component.into(), health);
        status.recompute_ready();
    }

    pub fn remove(&self, component: &str) {
        let mut status = self.0.lock();
        status.components.remove(component);
        status.recompute_ready();
    }

    pub fn snapshot(&self) -> HealthStatus {
        self.0.lock().clone()
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
