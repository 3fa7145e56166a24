// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Name-keyed registries the analysis pipeline consults to pick a
//! chunker or provider by MIME type for a given file.

use crate::capability::{ChunkerAdapter, EmbeddingsProviderAdapter, SemanticProviderAdapter};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct EmbeddingsProviderRegistry {
    by_name: HashMap<String, Arc<dyn EmbeddingsProviderAdapter>>,
}

impl EmbeddingsProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn EmbeddingsProviderAdapter>) {
        self.by_name.insert(adapter.name().to_string(), adapter);
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn EmbeddingsProviderAdapter>> {
        self.by_name.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }
}

#[derive(Default)]
pub struct ChunkerRegistry {
    by_name: HashMap<String, Arc<dyn ChunkerAdapter>>,
}

impl ChunkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn ChunkerAdapter>) {
        self.by_name.insert(adapter.name().to_string(), adapter);
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn ChunkerAdapter>> {
        self.by_name.get(name).cloned()
    }

    pub fn find_for_mime(&self, mime: &str, size: u64) -> Option<Arc<dyn ChunkerAdapter>> {
        self.by_name.values().find(|a| a.supports(mime, size).is_ok()).cloned()
    }

    /// The largest `max_content_size` across every registered chunker, or
    /// 0 if none are registered. A conservative pre-read size gate: no
    /// chunker in this registry can ever accept content past this bound,
    /// regardless of its eventual MIME classification.
    pub fn max_known_content_size(&self) -> u64 {
        self.by_name.values().map(|a| a.max_content_size()).max().unwrap_or(0)
    }
}

#[derive(Default)]
pub struct SemanticProviderRegistry {
    by_name: HashMap<String, Arc<dyn SemanticProviderAdapter>>,
}

impl SemanticProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn SemanticProviderAdapter>) {
        self.by_name.insert(adapter.name().to_string(), adapter);
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn SemanticProviderAdapter>> {
        self.by_name.get(name).cloned()
    }

    pub fn find_for_mime(&self, mime: &str, size: u64) -> Option<Arc<dyn SemanticProviderAdapter>> {
        self.by_name.values().find(|a| a.supports(mime, size).is_ok()).cloned()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
