// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! General-purpose chunker for plain-text and markdown content: groups
//! consecutive lines into chunks up to a target character budget,
//! breaking on blank lines when possible so chunks stay paragraph-sized.

use crate::capability::{CapabilityError, Chunk, ChunkerAdapter};
use async_trait::async_trait;

pub struct LineChunker {
    target_chars: usize,
    max_content_size: u64,
}

impl LineChunker {
    pub fn new(target_chars: usize, max_content_size: u64) -> Self {
        Self { target_chars, max_content_size }
    }
}

impl Default for LineChunker {
    fn default() -> Self {
        Self::new(2_000, 10 * 1024 * 1024)
    }
}

#[async_trait]
impl ChunkerAdapter for LineChunker {
    fn name(&self) -> &str {
        "line-chunker"
    }

    fn supported_mimes(&self) -> &[&str] {
        &["text/plain", "text/markdown"]
    }

    fn max_content_size(&self) -> u64 {
        self.max_content_size
    }

    async fn chunk(&self, content: &[u8], mime: &str) -> Result<Vec<Chunk>, CapabilityError> {
        self.supports(mime, content.len() as u64)?;
        let text = String::from_utf8_lossy(content);

        let mut chunks = Vec::new();
        let mut current = String::new();
        for line in text.lines() {
            if !current.is_empty() && current.len() + line.len() + 1 > self.target_chars && line.trim().is_empty() {
                chunks.push(std::mem::take(&mut current));
                continue;
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            if current.len() >= self.target_chars {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        if chunks.is_empty() {
            chunks.push(String::new());
        }

        Ok(chunks.into_iter().enumerate().map(|(index, text)| Chunk { index: index as u32, text }).collect())
    }
}

#[cfg(test)]
#[path = "chunker_line_tests.rs"]
mod tests;
