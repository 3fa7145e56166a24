// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Capability-record adapters (§9): chunkers and analysis providers are
//! registered under a name with a declared MIME scope, size ceiling,
//! and rate limit, so the pipeline can pick one per file without
//! hardcoding a backend.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("{mime} is not supported by this adapter")]
    UnsupportedMime { mime: String },
    #[error("content size {size} exceeds adapter limit {max}")]
    TooLarge { size: u64, max: u64 },
    #[error("provider request was rate limited")]
    RateLimited,
    #[error("provider call failed: {0}")]
    Provider(String),
}

impl memo_core::Classify for CapabilityError {
    fn severity(&self) -> memo_core::Severity {
        match self {
            CapabilityError::UnsupportedMime { .. } => memo_core::Severity::Validation,
            CapabilityError::TooLarge { .. } => memo_core::Severity::Validation,
            CapabilityError::RateLimited => memo_core::Severity::Transient,
            CapabilityError::Provider(_) => memo_core::Severity::Degraded,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct SemanticAnalysis {
    pub tags: Vec<String>,
    pub topics: Vec<String>,
    pub entities: Vec<String>,
    pub references: Vec<String>,
}

/// Splits file content into chunks suitable for embedding/analysis.
#[async_trait]
pub trait ChunkerAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn supported_mimes(&self) -> &[&str];
    fn max_content_size(&self) -> u64;

    async fn chunk(&self, content: &[u8], mime: &str) -> Result<Vec<Chunk>, CapabilityError>;

    fn supports(&self, mime: &str, size: u64) -> Result<(), CapabilityError> {
        check_capability(self.supported_mimes(), self.max_content_size(), mime, size)
    }
}

/// Derives tags/topics/entities/references from chunk text.
#[async_trait]
pub trait SemanticProviderAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn supported_mimes(&self) -> &[&str];
    fn max_content_size(&self) -> u64;
    fn rate_limit_per_minute(&self) -> u32;

    async fn analyze(&self, text: &str) -> Result<SemanticAnalysis, CapabilityError>;

    fn supports(&self, mime: &str, size: u64) -> Result<(), CapabilityError> {
        check_capability(self.supported_mimes(), self.max_content_size(), mime, size)
    }
}

/// Produces a dense embedding vector for a chunk of text.
#[async_trait]
pub trait EmbeddingsProviderAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn max_content_size(&self) -> u64;
    fn rate_limit_per_minute(&self) -> u32;
    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;
}

fn check_capability(supported: &[&str], max_size: u64, mime: &str, size: u64) -> Result<(), CapabilityError> {
    if !supported.iter().any(|m| *m == mime) {
        return Err(CapabilityError::UnsupportedMime { mime: mime.to_string() });
    }
    if size > max_size {
        return Err(CapabilityError::TooLarge { size, max: max_size });
    }
    Ok(())
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
