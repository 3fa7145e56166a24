// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! In-memory [`GraphAdapter`] for tests that exercise the analysis
//! pipeline without a real graph store.

use crate::graph::{ChunkEmbedding, ChunkMetadata, DirectoryNode, FileNode, GraphAdapter, GraphError, SimilarChunk};
use async_trait::async_trait;
use memo_core::ChunkId;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Default)]
struct FakeState {
    files: HashMap<PathBuf, FileNode>,
    directories: HashSet<PathBuf>,
    chunks: HashMap<ChunkId, ChunkMetadata>,
    embeddings: HashMap<ChunkId, ChunkEmbedding>,
    embedded_hashes: HashSet<(String, u32)>,
    tags: HashMap<PathBuf, Vec<String>>,
    topics: HashMap<PathBuf, Vec<String>>,
    entities: HashMap<PathBuf, Vec<String>>,
    references: HashMap<PathBuf, Vec<PathBuf>>,
}

pub struct FakeGraphAdapter {
    state: Mutex<FakeState>,
    connected: std::sync::atomic::AtomicBool,
}

impl Default for FakeGraphAdapter {
    fn default() -> Self {
        Self { state: Mutex::new(FakeState::default()), connected: std::sync::atomic::AtomicBool::new(true) }
    }
}

impl FakeGraphAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.state.lock().files.contains_key(path)
    }

    pub fn has_directory(&self, path: &Path) -> bool {
        self.state.lock().directories.contains(path)
    }

    pub fn chunk_count(&self) -> usize {
        self.state.lock().chunks.len()
    }

    pub fn tags_for(&self, path: &Path) -> Vec<String> {
        self.state.lock().tags.get(path).cloned().unwrap_or_default()
    }

    pub fn record_embedded(&self, content_hash: impl Into<String>, version: u32) {
        self.state.lock().embedded_hashes.insert((content_hash.into(), version));
    }
}

#[async_trait]
impl GraphAdapter for FakeGraphAdapter {
    async fn upsert_file(&self, file: FileNode) -> Result<(), GraphError> {
        self.state.lock().files.insert(file.path.clone(), file);
        Ok(())
    }

    async fn upsert_directory(&self, dir: DirectoryNode) -> Result<(), GraphError> {
        self.state.lock().directories.insert(dir.path);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<(), GraphError> {
        self.state.lock().files.remove(path);
        Ok(())
    }

    async fn delete_directory(&self, path: &Path) -> Result<(), GraphError> {
        self.state.lock().directories.remove(path);
        Ok(())
    }

    async fn delete_files_under_path(&self, prefix: &Path) -> Result<u64, GraphError> {
        let mut state = self.state.lock();
        let before = state.files.len();
        state.files.retain(|p, _| !p.starts_with(prefix));
        Ok((before - state.files.len()) as u64)
    }

    async fn delete_directories_under_path(&self, prefix: &Path) -> Result<u64, GraphError> {
        let mut state = self.state.lock();
        let before = state.directories.len();
        state.directories.retain(|p| !p.starts_with(prefix));
        Ok((before - state.directories.len()) as u64)
    }

    async fn upsert_chunk_with_metadata(&self, chunk: ChunkMetadata) -> Result<(), GraphError> {
        self.state.lock().chunks.insert(chunk.chunk_id.clone(), chunk);
        Ok(())
    }

    async fn upsert_chunk_embedding(&self, embedding: ChunkEmbedding) -> Result<(), GraphError> {
        self.state.lock().embeddings.insert(embedding.chunk_id.clone(), embedding);
        Ok(())
    }

    async fn delete_chunks(&self, chunk_ids: &[ChunkId]) -> Result<(), GraphError> {
        let mut state = self.state.lock();
        for id in chunk_ids {
            state.chunks.remove(id);
            state.embeddings.remove(id);
        }
        Ok(())
    }

    async fn set_file_tags(&self, path: &Path, tags: Vec<String>) -> Result<(), GraphError> {
        self.state.lock().tags.insert(path.to_path_buf(), tags);
        Ok(())
    }

    async fn set_file_topics(&self, path: &Path, topics: Vec<String>) -> Result<(), GraphError> {
        self.state.lock().topics.insert(path.to_path_buf(), topics);
        Ok(())
    }

    async fn set_file_entities(&self, path: &Path, entities: Vec<String>) -> Result<(), GraphError> {
        self.state.lock().entities.insert(path.to_path_buf(), entities);
        Ok(())
    }

    async fn set_file_references(&self, path: &Path, references: Vec<PathBuf>) -> Result<(), GraphError> {
        self.state.lock().references.insert(path.to_path_buf(), references);
        Ok(())
    }

    async fn search_similar_chunks(&self, vector: &[f32], k: usize) -> Result<Vec<SimilarChunk>, GraphError> {
        let state = self.state.lock();
        let mut scored: Vec<SimilarChunk> = state
            .embeddings
            .values()
            .filter_map(|e| {
                let chunk = state.chunks.get(&e.chunk_id)?;
                Some(SimilarChunk { chunk_id: e.chunk_id.clone(), file_path: chunk.file_path.clone(), score: cosine_similarity(vector, &e.vector) })
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn has_embedding(&self, content_hash: &str, version: u32) -> Result<bool, GraphError> {
        Ok(self.state.lock().embedded_hashes.contains(&(content_hash.to_string(), version)))
    }

    async fn export_snapshot(&self) -> Result<Vec<u8>, GraphError> {
        let state = self.state.lock();
        let files: Vec<&FileNode> = state.files.values().collect();
        Ok(serde_json::to_vec(&files)?)
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(std::sync::atomic::Ordering::SeqCst)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
#[path = "graph_fake_tests.rs"]
mod tests;
