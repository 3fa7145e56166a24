// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Adapter boundary (§6, §9): the `GraphAdapter` contract for the
//! downstream knowledge-graph store, plus the chunker/semantic/
//! embeddings capability records the analysis pipeline consults.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod capability;
pub mod chunker_line;
pub mod graph;
pub mod graph_http;
pub mod registry;

pub use capability::{CapabilityError, Chunk, ChunkerAdapter, EmbeddingsProviderAdapter, SemanticAnalysis, SemanticProviderAdapter};
pub use chunker_line::LineChunker;
pub use graph::{ChunkEmbedding, ChunkMetadata, DirectoryNode, FileNode, GraphAdapter, GraphError, SimilarChunk};
pub use graph_http::{HttpGraphAdapter, HttpGraphAdapterConfig};
pub use registry::{ChunkerRegistry, EmbeddingsProviderRegistry, SemanticProviderRegistry};

#[cfg(any(test, feature = "test-support"))]
pub mod capability_fake;
#[cfg(any(test, feature = "test-support"))]
pub mod graph_fake;

#[cfg(any(test, feature = "test-support"))]
pub use capability_fake::{FakeEmbeddingsProvider, FakeSemanticProvider};
#[cfg(any(test, feature = "test-support"))]
pub use graph_fake::FakeGraphAdapter;
