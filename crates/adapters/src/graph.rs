// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! The Graph adapter contract (§6, §4.J): the minimal surface any
//! compatible downstream knowledge-graph store must expose.

use async_trait::async_trait;
use memo_core::ChunkId;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileNode {
    pub path: PathBuf,
    pub content_hash: String,
    pub metadata_hash: String,
    pub size: u64,
    pub mtime_ms: u64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DirectoryNode {
    pub path: PathBuf,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChunkMetadata {
    pub chunk_id: ChunkId,
    pub file_path: PathBuf,
    pub index: u32,
    pub text: String,
    pub mime: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChunkEmbedding {
    pub chunk_id: ChunkId,
    pub vector: Vec<f32>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimilarChunk {
    pub chunk_id: ChunkId,
    pub file_path: PathBuf,
    pub score: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("request to graph store failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("graph store responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode graph store response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl memo_core::Classify for GraphError {
    fn severity(&self) -> memo_core::Severity {
        match self {
            GraphError::Request(e) if e.is_connect() || e.is_timeout() => memo_core::Severity::Degraded,
            GraphError::Request(_) => memo_core::Severity::Transient,
            GraphError::Status { status, .. } if (400..500).contains(status) => memo_core::Severity::Validation,
            GraphError::Status { .. } => memo_core::Severity::Transient,
            GraphError::Decode(_) => memo_core::Severity::Fatal,
        }
    }
}

/// Minimal contract any compatible knowledge-graph store implements
/// (§6). Every mutation is expected to be idempotent on retry: the
/// analysis pipeline may call `upsert_*` more than once for the same
/// content_hash/analysis_version after a crash.
#[async_trait]
pub trait GraphAdapter: Send + Sync {
    async fn upsert_file(&self, file: FileNode) -> Result<(), GraphError>;
    async fn upsert_directory(&self, dir: DirectoryNode) -> Result<(), GraphError>;
    async fn delete_file(&self, path: &Path) -> Result<(), GraphError>;
    async fn delete_directory(&self, path: &Path) -> Result<(), GraphError>;
    async fn delete_files_under_path(&self, prefix: &Path) -> Result<u64, GraphError>;
    async fn delete_directories_under_path(&self, prefix: &Path) -> Result<u64, GraphError>;
    async fn upsert_chunk_with_metadata(&self, chunk: ChunkMetadata) -> Result<(), GraphError>;
    async fn upsert_chunk_embedding(&self, embedding: ChunkEmbedding) -> Result<(), GraphError>;
    async fn delete_chunks(&self, chunk_ids: &[ChunkId]) -> Result<(), GraphError>;
    async fn set_file_tags(&self, path: &Path, tags: Vec<String>) -> Result<(), GraphError>;
    async fn set_file_topics(&self, path: &Path, topics: Vec<String>) -> Result<(), GraphError>;
    async fn set_file_entities(&self, path: &Path, entities: Vec<String>) -> Result<(), GraphError>;
    async fn set_file_references(&self, path: &Path, references: Vec<PathBuf>) -> Result<(), GraphError>;
    async fn search_similar_chunks(&self, vector: &[f32], k: usize) -> Result<Vec<SimilarChunk>, GraphError>;
    async fn has_embedding(&self, content_hash: &str, version: u32) -> Result<bool, GraphError>;
    async fn export_snapshot(&self) -> Result<Vec<u8>, GraphError>;
    async fn is_connected(&self) -> bool;
}
