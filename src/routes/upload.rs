// ABOUTME: Upload route handlers for direct posts and drafts of the active account
// ABOUTME: Streams the multipart video into a temporary file and hands it to the upload orchestrator
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::{
    errors::{AppError, AppResult},
    resources::ServerResources,
    upload::{UploadOutcome, UploadRequest},
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Multipart overhead allowed on top of the video size limit
const MULTIPART_SLACK_BYTES: u64 = 1024 * 1024;

/// Form fields collected from the upload request
#[derive(Debug, Default)]
struct UploadForm {
    title: String,
    disable_comment: bool,
    disable_duet: bool,
    disable_stitch: bool,
    video: Option<NamedTempFile>,
    video_bytes: u64,
}

/// Upload routes handler
pub struct UploadRoutes;

impl UploadRoutes {
    /// Create the upload routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let body_limit = resources
            .config
            .upload
            .max_upload_bytes
            .saturating_add(MULTIPART_SLACK_BYTES);
        Router::new()
            .route("/api/upload-video", post(Self::handle_upload_video))
            .route("/api/upload-draft", post(Self::handle_upload_draft))
            .layer(DefaultBodyLimit::max(
                usize::try_from(body_limit).unwrap_or(usize::MAX),
            ))
            .with_state(resources)
    }

    async fn handle_upload_video(
        State(resources): State<Arc<ServerResources>>,
        multipart: Multipart,
    ) -> AppResult<(StatusCode, Json<UploadOutcome>)> {
        Self::upload(&resources, multipart, false).await
    }

    async fn handle_upload_draft(
        State(resources): State<Arc<ServerResources>>,
        multipart: Multipart,
    ) -> AppResult<(StatusCode, Json<UploadOutcome>)> {
        Self::upload(&resources, multipart, true).await
    }

    async fn upload(
        resources: &ServerResources,
        multipart: Multipart,
        is_draft: bool,
    ) -> AppResult<(StatusCode, Json<UploadOutcome>)> {
        let credential = resources
            .login_flow
            .get_active_credential()
            .await
            .ok_or_else(|| AppError::not_found("Active account"))?;

        let form = Self::read_form(multipart, resources.config.upload.max_upload_bytes).await?;
        let video = form
            .video
            .ok_or_else(|| AppError::invalid_input("No video file provided"))?;

        let mut request = UploadRequest::new(video.path(), form.title);
        request.disable_comment = form.disable_comment;
        request.disable_duet = form.disable_duet;
        request.disable_stitch = form.disable_stitch;
        if is_draft {
            request = request.as_draft();
        }

        info!(
            user.open_id = %credential.open_id,
            upload.bytes = form.video_bytes,
            upload.draft = is_draft,
            "Upload requested"
        );
        let outcome = resources.uploads.submit(&credential, &request).await;
        // The temporary file lives until the orchestrator is done with it
        drop(video);

        let status = if outcome.success {
            StatusCode::OK
        } else {
            outcome
                .error_code
                .and_then(|code| StatusCode::from_u16(code.http_status()).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        };
        Ok((status, Json(outcome)))
    }

    async fn read_form(mut multipart: Multipart, max_bytes: u64) -> AppResult<UploadForm> {
        let mut form = UploadForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::invalid_input(format!("Failed to read multipart field: {e}")))?
        {
            let name = field.name().unwrap_or("").to_owned();
            match name.as_str() {
                "video" => {
                    let temp = NamedTempFile::new()?;
                    let mut file = tokio::fs::File::create(temp.path()).await?;
                    let mut written: u64 = 0;
                    while let Some(chunk) = field.chunk().await.map_err(|e| {
                        AppError::invalid_input(format!("Failed to read video data: {e}"))
                    })? {
                        written += chunk.len() as u64;
                        if written > max_bytes {
                            return Err(AppError::invalid_input(format!(
                                "Video exceeds the {max_bytes} byte upload limit"
                            )));
                        }
                        file.write_all(&chunk).await?;
                    }
                    file.flush().await?;
                    debug!(bytes = written, "Video received");
                    form.video = Some(temp);
                    form.video_bytes = written;
                }
                "title" | "disable_comment" | "disable_duet" | "disable_stitch" => {
                    let value = field.text().await.map_err(|e| {
                        AppError::invalid_input(format!("Failed to read field {name}: {e}"))
                    })?;
                    match name.as_str() {
                        "title" => form.title = value.trim().to_owned(),
                        "disable_comment" => form.disable_comment = is_checked(&value),
                        "disable_duet" => form.disable_duet = is_checked(&value),
                        _ => form.disable_stitch = is_checked(&value),
                    }
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

/// Checkbox-style form values
fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}
