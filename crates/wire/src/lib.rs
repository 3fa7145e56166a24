// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! HTTP request/response DTOs shared by the daemon and the CLI (§4.I).
//!
//! Wire format: JSON bodies over loopback HTTP. Domain types that are
//! already serde-transparent (`PathConfig`, `HealthStatus`) are embedded
//! directly rather than re-declared.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod status;

pub use request::{ForgetRequest, ReadRequest, RebuildQuery, RememberRequest};
pub use response::{
    ErrorResponse, ForgetResponse, HealthzResponse, ListResponse, ReadResponse, RebuildResponse,
    RememberResponse,
};
pub use status::{FileStateSummary, ReadEnvelope, ReadFormat, RememberedPathSummary, StageSummary};
