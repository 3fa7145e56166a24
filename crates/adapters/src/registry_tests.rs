// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use crate::capability_fake::{FakeEmbeddingsProvider, FakeSemanticProvider};
use crate::chunker_line::LineChunker;

#[test]
fn chunker_registry_finds_adapter_by_mime() {
    let mut registry = ChunkerRegistry::new();
    registry.register(Arc::new(LineChunker::default()));

    let found = registry.find_for_mime("text/markdown", 100).expect("should find a chunker");
    assert_eq!(found.name(), "line-chunker");
    assert!(registry.find_for_mime("application/pdf", 100).is_none());
}

#[test]
fn chunker_registry_get_by_name_returns_registered_adapter() {
    let mut registry = ChunkerRegistry::new();
    registry.register(Arc::new(LineChunker::default()));
    assert!(registry.get_by_name("line-chunker").is_some());
    assert!(registry.get_by_name("missing").is_none());
}

#[test]
fn semantic_provider_registry_finds_by_mime() {
    let mut registry = SemanticProviderRegistry::new();
    registry.register(Arc::new(FakeSemanticProvider::new("fake-semantic")));

    assert!(registry.find_for_mime("text/plain", 10).is_some());
    assert!(registry.find_for_mime("application/pdf", 10).is_none());
}

#[test]
fn embeddings_provider_registry_lists_registered_names() {
    let mut registry = EmbeddingsProviderRegistry::new();
    registry.register(Arc::new(FakeEmbeddingsProvider::new("fake-embed", 8)));
    assert_eq!(registry.names(), vec!["fake-embed"]);
    assert!(registry.get_by_name("fake-embed").is_some());
}
