// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Per-file analysis pipeline (§4.G): classify, chunk, run the semantic
//! and embeddings providers, then commit everything to the graph. A
//! stage is skipped when `FileState` already reports it current for the
//! file's `content_hash` and `analysis_version`.
//!
//! `Persist` is never requested directly (see [`memo_core::Job`]'s doc
//! comment) — it always runs once, after whichever of Metadata/Semantic/
//! Embeddings this job actually requested have completed. Chunk ids are
//! derived deterministically from `content_hash:index` rather than
//! generated randomly, so a later job that only reruns Semantic or
//! Embeddings for the same content addresses the same chunk nodes a
//! prior Metadata run already created.

use crate::error::PipelineError;
use crate::rate_limit::RateLimiter;
use crate::retry::with_backoff;
use memo_adapters::{
    CapabilityError, ChunkEmbedding, ChunkMetadata, ChunkerRegistry, DirectoryNode, EmbeddingsProviderRegistry,
    FileNode, GraphAdapter, SemanticProviderRegistry,
};
use memo_core::{Classify, Clock, ChunkId, Job, PipelineStage, Severity, StageState};
use memo_storage::Registry;
use std::path::Path;
use std::sync::Arc;

pub struct PipelineConfig {
    pub analysis_version: u32,
    pub embeddings_enabled: bool,
    pub semantic_provider_name: String,
    pub embeddings_provider_name: String,
    /// Per-stage retry budget for `Transient` failures (§7).
    pub max_retries: u32,
}

pub struct PipelineDeps<C: Clock> {
    pub registry: Arc<Registry>,
    pub graph: Arc<dyn GraphAdapter>,
    pub chunkers: Arc<ChunkerRegistry>,
    pub semantic_providers: Arc<SemanticProviderRegistry>,
    pub embeddings_providers: Arc<EmbeddingsProviderRegistry>,
    pub semantic_limiter: Arc<RateLimiter<C>>,
    pub embeddings_limiter: Arc<RateLimiter<C>>,
    pub clock: C,
}

/// Runs every stage `job` requests, in order, plus the implied `Persist`
/// step. On failure, identifies which tracked stage failed so the caller
/// can emit `analysis_failed` with the right field and, for `Transient`/
/// `Fatal`, decide whether to requeue.
pub async fn run_job<C: Clock>(
    deps: &PipelineDeps<C>,
    config: &PipelineConfig,
    job: &Job,
) -> Result<(), (PipelineStage, PipelineError)> {
    if tokio::fs::metadata(&job.path).await.is_err() {
        return Ok(()); // vanished since the walker enqueued it; the Reconciler will clean it up
    }

    let file_state = deps
        .registry
        .get_file_state(&job.path)
        .ok_or_else(|| (PipelineStage::Metadata, PipelineError::PermanentInput("no FileState for job path".into())))?;

    // Gate on the already-stat'd size before materializing any bytes
    // (§4.G step 2: bounded memory, a per-file size ceiling). When the
    // extension maps directly to a MIME type this rejects an oversized
    // file outright; otherwise it falls back to the widest ceiling among
    // registered chunkers, since no chunker here can accept more than that
    // regardless of what sniffing content would later classify it as.
    let ext_mime = classify_mime_from_extension(&job.path);
    let size_ceiling = match &ext_mime {
        Some(mime) => match deps.chunkers.find_for_mime(mime, file_state.size) {
            Some(chunker) => chunker.max_content_size(),
            None => {
                return Err((
                    PipelineStage::Metadata,
                    PipelineError::PermanentInput(format!("no chunker for {mime} at size {}", file_state.size)),
                ))
            }
        },
        None => deps.chunkers.max_known_content_size(),
    };
    if file_state.size > size_ceiling {
        return Err((
            PipelineStage::Metadata,
            PipelineError::PermanentInput(format!(
                "file size {} exceeds chunker size ceiling {size_ceiling}",
                file_state.size
            )),
        ));
    }

    let content = match tokio::fs::read(&job.path).await {
        Ok(bytes) => bytes,
        Err(_) => return Ok(()), // vanished between the stat above and this read
    };

    let mime = classify_mime(&job.path, &content);
    let wants = |stage: PipelineStage| job.stages.contains(&stage);

    let chunker = deps
        .chunkers
        .find_for_mime(&mime, content.len() as u64)
        .ok_or_else(|| (PipelineStage::Metadata, PipelineError::PermanentInput(format!("no chunker for {mime}"))))?;
    let chunks = chunker
        .chunk(&content, &mime)
        .await
        .map_err(|e| (PipelineStage::Metadata, capability_to_pipeline(e)))?;

    let mut tags = Vec::new();
    let mut topics = Vec::new();
    let mut entities = Vec::new();
    let mut references = Vec::new();
    let mut ran_semantic = false;

    if wants(PipelineStage::Semantic) && !file_state.is_current_stage(PipelineStage::Semantic) {
        let provider = deps.semantic_providers.get_by_name(&config.semantic_provider_name).ok_or_else(|| {
            (PipelineStage::Semantic, PipelineError::Policy(format!("unknown semantic provider {}", config.semantic_provider_name)))
        })?;
        if !deps.semantic_limiter.try_acquire(&deps.clock) {
            return Err((PipelineStage::Semantic, PipelineError::Policy("semantic provider rate limit exhausted".into())));
        }
        let text = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n");
        let analysis = with_backoff(config.max_retries, || async { provider.analyze(&text).await.map_err(capability_to_pipeline) })
            .await
            .map_err(|e| (PipelineStage::Semantic, e))?;
        tags = analysis.tags;
        topics = analysis.topics;
        entities = analysis.entities;
        references = analysis.references;
        ran_semantic = true;
    }

    let mut embeddings = Vec::new();
    let mut ran_embeddings = false;
    if config.embeddings_enabled
        && wants(PipelineStage::Embeddings)
        && !file_state.is_current_stage(PipelineStage::Embeddings)
    {
        let provider = deps.embeddings_providers.get_by_name(&config.embeddings_provider_name).ok_or_else(|| {
            (PipelineStage::Embeddings, PipelineError::Policy(format!("unknown embeddings provider {}", config.embeddings_provider_name)))
        })?;
        if !deps.embeddings_limiter.try_acquire(&deps.clock) {
            return Err((PipelineStage::Embeddings, PipelineError::Policy("embeddings provider rate limit exhausted".into())));
        }
        for chunk in &chunks {
            let vector = with_backoff(config.max_retries, || async { provider.embed(&chunk.text).await.map_err(capability_to_pipeline) })
                .await
                .map_err(|e| (PipelineStage::Embeddings, e))?;
            embeddings.push((chunk.index, vector, provider.model_name().to_string()));
        }
        ran_embeddings = true;
    }

    persist(deps, config, job, &file_state.content_hash, &mime, &chunks, ran_semantic, &tags, &topics, &entities, &references, &embeddings)
        .await
        .map_err(|e| (PipelineStage::Persist, e))?;

    if wants(PipelineStage::Metadata) {
        mark_current(&deps.registry, &job.path, PipelineStage::Metadata, config.analysis_version);
    }
    if ran_semantic {
        mark_current(&deps.registry, &job.path, PipelineStage::Semantic, config.analysis_version);
    }
    if ran_embeddings {
        mark_current(&deps.registry, &job.path, PipelineStage::Embeddings, config.analysis_version);
    }
    mark_current(&deps.registry, &job.path, PipelineStage::Persist, config.analysis_version);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn persist<C: Clock>(
    deps: &PipelineDeps<C>,
    config: &PipelineConfig,
    job: &Job,
    content_hash: &str,
    mime: &str,
    chunks: &[memo_adapters::Chunk],
    ran_semantic: bool,
    tags: &[String],
    topics: &[String],
    entities: &[String],
    references: &[String],
    embeddings: &[(u32, Vec<f32>, String)],
) -> Result<(), PipelineError> {
    let file_state = deps.registry.get_file_state(&job.path);
    let (size, mtime_ms, metadata_hash) =
        file_state.as_ref().map(|s| (s.size, s.mtime_ms, s.metadata_hash.clone())).unwrap_or_default();

    with_backoff(config.max_retries, || async {
        deps.graph.upsert_directory(DirectoryNode { path: job.parent.clone() }).await.map_err(graph_to_pipeline)
    })
    .await?;
    with_backoff(config.max_retries, || async {
        deps.graph
            .upsert_file(FileNode {
                path: job.path.clone(),
                content_hash: content_hash.to_string(),
                metadata_hash: metadata_hash.clone(),
                size,
                mtime_ms,
            })
            .await
            .map_err(graph_to_pipeline)
    })
    .await?;

    for chunk in chunks {
        let chunk_id = chunk_id_for(content_hash, chunk.index);
        with_backoff(config.max_retries, || async {
            deps.graph
                .upsert_chunk_with_metadata(ChunkMetadata {
                    chunk_id,
                    file_path: job.path.clone(),
                    index: chunk.index,
                    text: chunk.text.clone(),
                    mime: mime.to_string(),
                })
                .await
                .map_err(graph_to_pipeline)
        })
        .await?;
    }

    if ran_semantic {
        with_backoff(config.max_retries, || async {
            deps.graph.set_file_tags(&job.path, tags.to_vec()).await.map_err(graph_to_pipeline)
        })
        .await?;
        with_backoff(config.max_retries, || async {
            deps.graph.set_file_topics(&job.path, topics.to_vec()).await.map_err(graph_to_pipeline)
        })
        .await?;
        with_backoff(config.max_retries, || async {
            deps.graph.set_file_entities(&job.path, entities.to_vec()).await.map_err(graph_to_pipeline)
        })
        .await?;
        with_backoff(config.max_retries, || async {
            let refs = references.iter().map(std::path::PathBuf::from).collect();
            deps.graph.set_file_references(&job.path, refs).await.map_err(graph_to_pipeline)
        })
        .await?;
    }

    for (index, vector, model) in embeddings {
        with_backoff(config.max_retries, || async {
            deps.graph
                .upsert_chunk_embedding(ChunkEmbedding { chunk_id: chunk_id_for(content_hash, *index), vector: vector.clone(), model: model.clone() })
                .await
                .map_err(graph_to_pipeline)
        })
        .await?;
    }

    Ok(())
}

fn chunk_id_for(content_hash: &str, index: u32) -> ChunkId {
    ChunkId::from_string(format!("{content_hash}:{index}"))
}

fn mark_current(registry: &Registry, path: &Path, stage: PipelineStage, analysis_version: u32) {
    if let Err(err) = registry.update_stage(path, stage, StageState::current(analysis_version)) {
        tracing::warn!(path = %path.display(), %stage, %err, "failed to mark stage current");
    }
}

fn capability_to_pipeline(err: CapabilityError) -> PipelineError {
    let message = err.to_string();
    match err.severity() {
        Severity::Validation | Severity::NotFound => PipelineError::PermanentInput(message),
        Severity::Transient => PipelineError::Transient(message),
        Severity::Degraded | Severity::Fatal => PipelineError::Fatal(message),
    }
}

fn graph_to_pipeline(err: memo_adapters::GraphError) -> PipelineError {
    let message = err.to_string();
    match err.severity() {
        Severity::Validation | Severity::NotFound => PipelineError::PermanentInput(message),
        Severity::Transient => PipelineError::Transient(message),
        Severity::Degraded | Severity::Fatal => PipelineError::Fatal(message),
    }
}

/// Extension-only classification (§4.G step 1), with no content sniff —
/// used to gate the size ceiling before any bytes are read. Returns
/// `None` for an unrecognized or missing extension, deferring to
/// [`classify_mime`]'s UTF-8 sniff once content is available.
fn classify_mime_from_extension(path: &Path) -> Option<String> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
    match ext.as_deref() {
        Some("md") | Some("markdown") => Some("text/markdown".to_string()),
        Some("txt") | Some("rs") | Some("toml") | Some("json") | Some("yaml") | Some("yml") | Some("py")
        | Some("js") | Some("ts") | Some("go") | Some("c") | Some("h") | Some("cpp") => Some("text/plain".to_string()),
        _ => None,
    }
}

/// Extension-based classification with a UTF-8 sniff fallback for files
/// with no or an unrecognized extension (§4.G step 1).
fn classify_mime(path: &Path, content: &[u8]) -> String {
    classify_mime_from_extension(path).unwrap_or_else(|| {
        if std::str::from_utf8(content).is_ok() {
            "text/plain".to_string()
        } else {
            "application/octet-stream".to_string()
        }
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
