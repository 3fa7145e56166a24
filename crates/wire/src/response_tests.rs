// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;

#[test]
fn healthz_default_reports_ok() {
    let response = HealthzResponse::default();
    let json = serde_json::to_string(&response).unwrap();
    assert_eq!(json, r#"{"status":"ok"}"#);
}

#[test]
fn error_response_displays_message() {
    let err = ErrorResponse { message: "root not remembered".into(), code: "not_found".into() };
    assert_eq!(err.to_string(), "root not remembered");
}

#[test]
fn list_response_round_trips_through_json() {
    let response = ListResponse {
        paths: vec![crate::RememberedPathSummary {
            path: "/tmp/notes".into(),
            created_at_ms: 0,
            last_walk_at_ms: Some(10),
            config: None,
            file_count: 3,
            pending_count: 1,
            failed_count: 0,
        }],
    };
    let json = serde_json::to_string(&response).unwrap();
    let back: ListResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(response, back);
}
