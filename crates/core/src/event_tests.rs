// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use crate::model::JobId;

#[test]
fn critical_events_match_glossary() {
    let deleted = Event::PathDeleted { path: "/a".into(), parent: "/".into(), at_ms: 0 };
    let reload_failed = Event::ConfigReloadFailed { error: "bad".into(), at_ms: 0 };
    let analysis_failed = Event::AnalysisFailed {
        job_id: JobId::new(),
        path: "/a/x.md".into(),
        stage: crate::model::PipelineStage::Semantic,
        error: "boom".into(),
        category: crate::model::FailureCategory::Transient,
        at_ms: 0,
    };
    assert!(deleted.is_critical());
    assert!(reload_failed.is_critical());
    assert!(analysis_failed.is_critical());
}

#[test]
fn non_critical_events_are_not_critical() {
    let remembered = Event::PathRemembered { path: "/a".into(), config: None, at_ms: 0 };
    assert!(!remembered.is_critical());
}

#[test]
fn event_kind_matches_serde_tag() {
    let event = Event::WalkStarted { root: "/a".into(), at_ms: 1 };
    assert_eq!(event.kind(), "walk_started");
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["kind"], "walk_started");
}

#[test]
fn event_round_trips_through_json() {
    let event = Event::PathChanged { path: "/a/x.md".into(), parent: "/a".into(), at_ms: 42 };
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(event, back);
}
