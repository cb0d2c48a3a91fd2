// ABOUTME: Sequential chunk transfer of a local video file to the platform upload URL
// ABOUTME: One PUT per planned range with Content-Range headers; the first failure aborts the job
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::chunk_plan::{ChunkPlan, ChunkRange};
use crate::constants::upload::VIDEO_CONTENT_TYPE;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::upload_client;
use reqwest::StatusCode;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, warn};

/// Uploads planned chunks one at a time
///
/// There is no per-chunk retry: the platform reassembles chunks in order and
/// a failed chunk ends the job.
pub struct ChunkTransfer {
    client: reqwest::Client,
}

impl Default for ChunkTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkTransfer {
    /// Create a transfer with the chunk upload client
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: upload_client(),
        }
    }

    /// Send every chunk of `path` described by `plan`, in order
    ///
    /// A zero-chunk plan succeeds without any request. Returns the number of
    /// chunks sent.
    ///
    /// # Errors
    ///
    /// Returns `ChunkTransferFailed` on the first chunk that cannot be read or
    /// is not answered with 200/201
    pub async fn transfer(&self, upload_url: &str, path: &Path, plan: &ChunkPlan) -> AppResult<u64> {
        if plan.is_empty() {
            info!("Nothing to upload for an empty video");
            return Ok(0);
        }

        let mut file = File::open(path).await.map_err(|e| {
            AppError::chunk_transfer(format!("Cannot open video file: {e}")).with_source(e)
        })?;
        let actual_size = file
            .metadata()
            .await
            .map_err(|e| {
                AppError::chunk_transfer(format!("Cannot stat video file: {e}")).with_source(e)
            })?
            .len();
        if actual_size != plan.video_size {
            return Err(AppError::chunk_transfer(format!(
                "Video file changed size during upload ({} != {} bytes)",
                actual_size, plan.video_size
            )));
        }

        for range in plan.ranges() {
            let chunk = Self::read_chunk(&mut file, &range).await?;
            self.put_chunk(upload_url, &range, plan.total_chunk_count, chunk)
                .await?;
        }

        info!(
            chunks = plan.total_chunk_count,
            bytes = plan.video_size,
            "Video transfer complete"
        );
        Ok(plan.total_chunk_count)
    }

    async fn read_chunk(file: &mut File, range: &ChunkRange) -> AppResult<Vec<u8>> {
        let len = usize::try_from(range.len())
            .map_err(|_| AppError::chunk_transfer("Chunk does not fit in memory"))?;
        let mut buffer = vec![0_u8; len];

        file.seek(SeekFrom::Start(range.start)).await.map_err(|e| {
            AppError::chunk_transfer(format!("Seek to chunk {} failed: {e}", range.index + 1))
                .with_source(e)
        })?;
        file.read_exact(&mut buffer).await.map_err(|e| {
            AppError::chunk_transfer(format!("Read of chunk {} failed: {e}", range.index + 1))
                .with_source(e)
        })?;
        Ok(buffer)
    }

    async fn put_chunk(
        &self,
        upload_url: &str,
        range: &ChunkRange,
        total: u64,
        chunk: Vec<u8>,
    ) -> AppResult<()> {
        let content_range = range.content_range();
        debug!(chunk = range.index + 1, total, %content_range, "Uploading chunk");

        let response = self
            .client
            .put(upload_url)
            .header("Content-Range", &content_range)
            .header("Content-Length", range.len())
            .header("Content-Type", VIDEO_CONTENT_TYPE)
            .body(chunk)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("Chunk {}/{total} timed out", range.index + 1)
                } else {
                    format!("Chunk {}/{total} could not be sent: {e}", range.index + 1)
                };
                AppError::chunk_transfer(message).with_source(e)
            })?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            chunk = range.index + 1,
            total,
            status = status.as_u16(),
            %body,
            "Chunk upload rejected"
        );
        Err(AppError::chunk_transfer(format!(
            "Chunk {}/{total} failed with HTTP {}",
            range.index + 1,
            status.as_u16()
        )))
    }
}
