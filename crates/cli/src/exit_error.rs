// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Custom error type that carries a process exit code (§6: 0 success, 1
//! generic failure, 2 invalid input, 3 daemon unreachable).
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
