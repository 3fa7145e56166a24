// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;

#[test]
fn ready_requires_registry_bus_and_a_worker() {
    let health = SharedHealth::new();
    assert!(!health.snapshot().ready);

    health.set("registry", ComponentHealth::ready());
    health.set("bus", ComponentHealth::ready());
    assert!(!health.snapshot().ready, "no worker yet");

    health.set("worker-0", ComponentHealth::ready());
    assert!(health.snapshot().ready);
}

#[test]
fn removing_a_component_recomputes_readiness() {
    let health = SharedHealth::new();
    health.set("registry", ComponentHealth::ready());
    health.set("bus", ComponentHealth::ready());
    health.set("worker-0", ComponentHealth::ready());
    assert!(health.snapshot().ready);

    health.remove("bus");
    assert!(!health.snapshot().ready);
}

#[test]
fn degraded_graph_does_not_affect_readiness() {
    let health = SharedHealth::new();
    health.set("registry", ComponentHealth::ready());
    health.set("bus", ComponentHealth::ready());
    health.set("worker-0", ComponentHealth::ready());
    health.set("graph", ComponentHealth::degraded("connection refused"));

    assert!(health.snapshot().ready);
    assert_eq!(health.snapshot().components.len(), 4);
}
