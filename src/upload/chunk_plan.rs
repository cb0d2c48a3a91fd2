// ABOUTME: Chunk geometry for the platform's chunked upload protocol
// ABOUTME: Pure planning of chunk size, chunk count and per-chunk byte ranges
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Chunk planning
//!
//! The init call pre-declares `chunk_size` and `total_chunk_count`; the
//! transfer must then send exactly those ranges. Both sides use this module.

use crate::constants::upload::RECOMMENDED_CHUNK_SIZE;
use serde::{Deserialize, Serialize};

/// Chunk geometry for one video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPlan {
    /// Total bytes
    pub video_size: u64,
    /// Bytes per chunk (the last chunk may be shorter)
    pub chunk_size: u64,
    /// Number of chunks
    pub total_chunk_count: u64,
}

/// Byte range of one chunk, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Zero-based chunk index
    pub index: u64,
    /// First byte offset
    pub start: u64,
    /// Last byte offset
    pub end: u64,
    /// Size of the whole video
    pub video_size: u64,
}

impl ChunkRange {
    /// Number of bytes in this chunk
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Chunks are never empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` header value
    #[must_use]
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.video_size)
    }
}

impl ChunkPlan {
    /// Plan with the platform's recommended chunk size
    ///
    /// A zero-byte video yields `0/0`, meaning there is nothing to transfer.
    #[must_use]
    pub fn plan(video_size: u64) -> Self {
        Self::plan_with_chunk_size(video_size, RECOMMENDED_CHUNK_SIZE)
    }

    /// Plan with an explicit maximum chunk size
    #[must_use]
    pub fn plan_with_chunk_size(video_size: u64, max_chunk_size: u64) -> Self {
        if video_size == 0 || max_chunk_size == 0 {
            return Self {
                video_size,
                chunk_size: 0,
                total_chunk_count: 0,
            };
        }
        let chunk_size = video_size.min(max_chunk_size);
        let total_chunk_count = video_size.div_ceil(chunk_size).max(1);
        Self {
            video_size,
            chunk_size,
            total_chunk_count,
        }
    }

    /// Whether there is nothing to upload
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_chunk_count == 0
    }

    /// Byte range of chunk `index`, `None` past the end
    #[must_use]
    pub fn range(&self, index: u64) -> Option<ChunkRange> {
        if index >= self.total_chunk_count {
            return None;
        }
        let start = index * self.chunk_size;
        let end = (start + self.chunk_size - 1).min(self.video_size - 1);
        Some(ChunkRange {
            index,
            start,
            end,
            video_size: self.video_size,
        })
    }

    /// All chunk ranges in upload order
    pub fn ranges(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (0..self.total_chunk_count).filter_map(|index| self.range(index))
    }
}
