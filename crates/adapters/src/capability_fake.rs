// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Fake semantic/embeddings providers. Concrete AI-backed providers are
//! out of scope; these exist so the pipeline and its tests have
//! something to register and call.

use crate::capability::{CapabilityError, EmbeddingsProviderAdapter, SemanticAnalysis, SemanticProviderAdapter};
use async_trait::async_trait;

pub struct FakeSemanticProvider {
    pub name: String,
    pub mimes: Vec<&'static str>,
}

impl FakeSemanticProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), mimes: vec!["text/plain", "text/markdown"] }
    }
}

#[async_trait]
impl SemanticProviderAdapter for FakeSemanticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_mimes(&self) -> &[&str] {
        &self.mimes
    }

    fn max_content_size(&self) -> u64 {
        1024 * 1024
    }

    fn rate_limit_per_minute(&self) -> u32 {
        600
    }

    async fn analyze(&self, text: &str) -> Result<SemanticAnalysis, CapabilityError> {
        let words: Vec<String> = text.split_whitespace().take(3).map(str::to_lowercase).collect();
        Ok(SemanticAnalysis { tags: words.clone(), topics: words, entities: Vec::new(), references: Vec::new() })
    }
}

pub struct FakeEmbeddingsProvider {
    pub name: String,
    pub dimensions: usize,
}

impl FakeEmbeddingsProvider {
    pub fn new(name: impl Into<String>, dimensions: usize) -> Self {
        Self { name: name.into(), dimensions }
    }
}

#[async_trait]
impl EmbeddingsProviderAdapter for FakeEmbeddingsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_content_size(&self) -> u64 {
        1024 * 1024
    }

    fn rate_limit_per_minute(&self) -> u32 {
        600
    }

    fn model_name(&self) -> &str {
        "fake-embeddings-v1"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions] += byte as f32;
        }
        Ok(vector)
    }
}

#[cfg(test)]
#[path = "capability_fake_tests.rs"]
mod tests;
