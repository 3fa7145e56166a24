// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! `reqwest`-backed [`GraphAdapter`] that talks to an out-of-process
//! graph store over HTTP, JSON in and out.

use crate::graph::{ChunkEmbedding, ChunkMetadata, DirectoryNode, FileNode, GraphAdapter, GraphError, SimilarChunk};
use async_trait::async_trait;
use memo_core::ChunkId;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpGraphAdapterConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

pub struct HttpGraphAdapter {
    client: Client,
    base_url: String,
}

impl HttpGraphAdapter {
    pub fn new(config: HttpGraphAdapterConfig) -> Result<Self, GraphError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<B: serde::Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, GraphError> {
        let mut req = self.client.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, %body, "graph store request failed");
            return Err(GraphError::Status { status, body });
        }
        Ok(resp)
    }
}

#[derive(serde::Serialize)]
struct PrefixRequest<'a> {
    prefix: &'a Path,
}

#[derive(serde::Serialize)]
struct TagsRequest<'a> {
    path: &'a Path,
    values: Vec<String>,
}

#[derive(serde::Serialize)]
struct ReferencesRequest<'a> {
    path: &'a Path,
    references: Vec<std::path::PathBuf>,
}

#[derive(serde::Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    k: usize,
}

#[derive(serde::Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(serde::Deserialize)]
struct HasEmbeddingResponse {
    present: bool,
}

#[async_trait]
impl GraphAdapter for HttpGraphAdapter {
    async fn upsert_file(&self, file: FileNode) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/files", Some(&file)).await?;
        Ok(())
    }

    async fn upsert_directory(&self, dir: DirectoryNode) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/directories", Some(&dir)).await?;
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<(), GraphError> {
        self.send_json::<()>(reqwest::Method::DELETE, &format!("/files?path={}", path.display()), None).await?;
        Ok(())
    }

    async fn delete_directory(&self, path: &Path) -> Result<(), GraphError> {
        self.send_json::<()>(reqwest::Method::DELETE, &format!("/directories?path={}", path.display()), None)
            .await?;
        Ok(())
    }

    async fn delete_files_under_path(&self, prefix: &Path) -> Result<u64, GraphError> {
        let resp = self
            .send_json(reqwest::Method::POST, "/files/delete-under", Some(&PrefixRequest { prefix }))
            .await?;
        Ok(resp.json::<CountResponse>().await?.count)
    }

    async fn delete_directories_under_path(&self, prefix: &Path) -> Result<u64, GraphError> {
        let resp = self
            .send_json(reqwest::Method::POST, "/directories/delete-under", Some(&PrefixRequest { prefix }))
            .await?;
        Ok(resp.json::<CountResponse>().await?.count)
    }

    async fn upsert_chunk_with_metadata(&self, chunk: ChunkMetadata) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/chunks", Some(&chunk)).await?;
        Ok(())
    }

    async fn upsert_chunk_embedding(&self, embedding: ChunkEmbedding) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/chunks/embedding", Some(&embedding)).await?;
        Ok(())
    }

    async fn delete_chunks(&self, chunk_ids: &[ChunkId]) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::POST, "/chunks/delete", Some(&chunk_ids)).await?;
        Ok(())
    }

    async fn set_file_tags(&self, path: &Path, tags: Vec<String>) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/files/tags", Some(&TagsRequest { path, values: tags })).await?;
        Ok(())
    }

    async fn set_file_topics(&self, path: &Path, topics: Vec<String>) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/files/topics", Some(&TagsRequest { path, values: topics })).await?;
        Ok(())
    }

    async fn set_file_entities(&self, path: &Path, entities: Vec<String>) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/files/entities", Some(&TagsRequest { path, values: entities }))
            .await?;
        Ok(())
    }

    async fn set_file_references(&self, path: &Path, references: Vec<std::path::PathBuf>) -> Result<(), GraphError> {
        self.send_json(reqwest::Method::PUT, "/files/references", Some(&ReferencesRequest { path, references }))
            .await?;
        Ok(())
    }

    async fn search_similar_chunks(&self, vector: &[f32], k: usize) -> Result<Vec<SimilarChunk>, GraphError> {
        let resp =
            self.send_json(reqwest::Method::POST, "/chunks/search", Some(&SearchRequest { vector, k })).await?;
        Ok(resp.json::<Vec<SimilarChunk>>().await?)
    }

    async fn has_embedding(&self, content_hash: &str, version: u32) -> Result<bool, GraphError> {
        let path = format!("/chunks/has-embedding?content_hash={content_hash}&version={version}");
        let resp = self.send_json::<()>(reqwest::Method::GET, &path, None).await?;
        Ok(resp.json::<HasEmbeddingResponse>().await?.present)
    }

    async fn export_snapshot(&self) -> Result<Vec<u8>, GraphError> {
        let resp = self.send_json::<()>(reqwest::Method::GET, "/snapshot", None).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn is_connected(&self) -> bool {
        self.client
            .get(self.url("/healthz"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "graph_http_tests.rs"]
mod tests;
