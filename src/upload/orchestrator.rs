// ABOUTME: Upload state machine from capability check through chunk transfer to status poll
// ABOUTME: Validates input, initializes the publish job, transfers chunks and builds the outcome
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Upload Orchestrator
//!
//! `CapabilityCheck -> UploadInit -> Transferring -> StatusPoll -> Done`, with
//! `TransferFailed` when a chunk fails and `Aborted` for every earlier failure.
//! The privacy verdict never blocks the upload: the post is always made with
//! `SELF_ONLY` and a non-private account only produces a warning.

use super::capability::{CapabilityGate, CreatorInfo, PrivacyVerdict};
use super::chunk_plan::ChunkPlan;
use super::status::{video_id_from_publish_id, PublishStatus, StatusPoller};
use super::transfer::ChunkTransfer;
use crate::config::ServerConfig;
use crate::constants::{api, upload};
use crate::credentials::Credential;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::providers::envelope;
use crate::providers::tiktok::{ApiResponse, TikTokApiClient};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Privacy level every post is made with
pub const FORCED_PRIVACY_LEVEL: &str = "SELF_ONLY";

/// What to upload and how
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local video file
    pub path: PathBuf,
    /// Caption
    pub title: String,
    /// Disable comments on the post
    pub disable_comment: bool,
    /// Disable duets on the post
    pub disable_duet: bool,
    /// Disable stitches on the post
    pub disable_stitch: bool,
    /// Send to the creator's inbox as a draft instead of posting directly
    pub is_draft: bool,
}

impl UploadRequest {
    /// Direct post of `path` with default interaction settings
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            disable_comment: false,
            disable_duet: false,
            disable_stitch: false,
            is_draft: false,
        }
    }

    /// Same request, sent as a draft
    #[must_use]
    pub fn as_draft(mut self) -> Self {
        self.is_draft = true;
        self
    }
}

/// Upload state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadState {
    /// Fetching creator capabilities
    CapabilityCheck,
    /// Declaring the upload
    UploadInit,
    /// Sending chunks
    Transferring,
    /// Querying publish status
    StatusPoll,
    /// Finished successfully
    Done,
    /// A chunk failed after init succeeded
    TransferFailed,
    /// Failed before any chunk was sent
    Aborted,
}

/// A publish job after a successful init
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadJob {
    /// Publish job id
    pub publish_id: String,
    /// Where chunks are PUT
    pub upload_url: String,
    /// Declared geometry
    #[serde(flatten)]
    pub plan: ChunkPlan,
    /// Draft (inbox) upload
    pub is_draft: bool,
    /// Current state
    pub state: UploadState,
}

/// Result of `submit`, successful or not
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Overall success
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Publish id, also on failure when init had succeeded
    pub publish_id: Option<String>,
    /// Video id derived from the publish id (advisory)
    pub video_id: Option<String>,
    /// Terminal state
    pub state: UploadState,
    /// Error code on failure
    pub error_code: Option<ErrorCode>,
    /// Non-blocking warning, such as a public account
    pub warning: Option<String>,
    /// Privacy verdict from the capability check
    pub privacy_verdict: Option<PrivacyVerdict>,
    /// Publish status, when the status query succeeded
    pub publish_status: Option<PublishStatus>,
}

struct Progress {
    state: UploadState,
    publish_id: Option<String>,
    verdict: Option<PrivacyVerdict>,
}

struct Completed {
    job: UploadJob,
    creator: CreatorInfo,
    publish_status: Option<PublishStatus>,
}

/// Runs uploads end to end
pub struct UploadOrchestrator {
    api: TikTokApiClient,
    gate: CapabilityGate,
    transfer: ChunkTransfer,
    poller: StatusPoller,
    profile_base_url: String,
    settle_delay: Duration,
    max_upload_bytes: u64,
}

impl UploadOrchestrator {
    /// Build the orchestrator and its steps from configuration
    #[must_use]
    pub fn new(api: TikTokApiClient, config: &ServerConfig) -> Self {
        Self {
            gate: CapabilityGate::new(api.clone()),
            poller: StatusPoller::new(api.clone()),
            api,
            transfer: ChunkTransfer::new(),
            profile_base_url: config
                .platform
                .profile_base_url
                .trim_end_matches('/')
                .to_owned(),
            settle_delay: Duration::from_secs(config.upload.status_settle_delay_secs),
            max_upload_bytes: config.upload.max_upload_bytes,
        }
    }

    /// Run an upload for `credential`; failures are reported in the outcome, never raised
    pub async fn submit(&self, credential: &Credential, request: &UploadRequest) -> UploadOutcome {
        let mut progress = Progress {
            state: UploadState::CapabilityCheck,
            publish_id: None,
            verdict: None,
        };

        let outcome = match self
            .run(&credential.access_token, request, &mut progress)
            .await
        {
            Ok(completed) => self.success_outcome(completed, progress.verdict),
            Err(error) => Self::failure_outcome(error, &progress),
        };

        AppLogger::log_upload_event(
            &credential.open_id,
            outcome.publish_id.as_deref(),
            &format!("{:?}", outcome.state),
            request.is_draft,
            outcome.success,
        );
        outcome
    }

    async fn run(
        &self,
        access_token: &str,
        request: &UploadRequest,
        progress: &mut Progress,
    ) -> AppResult<Completed> {
        let video_size = self.validate(request).await?;

        let creator = self.gate.fetch(access_token).await?;
        progress.verdict = Some(creator.verdict());

        progress.state = UploadState::UploadInit;
        let plan = ChunkPlan::plan(video_size);
        let mut job = self.initialize(access_token, request, plan).await?;
        progress.publish_id = Some(job.publish_id.clone());

        progress.state = UploadState::Transferring;
        job.state = UploadState::Transferring;
        self.transfer
            .transfer(&job.upload_url, &request.path, &job.plan)
            .await
            .map_err(|e| e.with_publish_id(job.publish_id.clone()))?;

        progress.state = UploadState::StatusPoll;
        job.state = UploadState::StatusPoll;
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        let publish_status = match self.poller.fetch(access_token, &job.publish_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(publish_id = %job.publish_id, error = %e, "Publish status unavailable; upload itself succeeded");
                None
            }
        };

        job.state = UploadState::Done;
        progress.state = UploadState::Done;
        Ok(Completed {
            job,
            creator,
            publish_status,
        })
    }

    /// Reject bad input before any network call; returns the file size
    async fn validate(&self, request: &UploadRequest) -> AppResult<u64> {
        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("A title is required"));
        }
        let title_len = request.title.chars().count();
        if title_len > upload::MAX_TITLE_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Title is {title_len} characters; the limit is {}",
                upload::MAX_TITLE_LENGTH
            )));
        }

        let metadata = tokio::fs::metadata(&request.path)
            .await
            .map_err(|_| AppError::invalid_input("No video file selected"))?;
        if !metadata.is_file() {
            return Err(AppError::invalid_input("No video file selected"));
        }
        let size = metadata.len();
        if size == 0 {
            return Err(AppError::invalid_input("The video file is empty"));
        }
        if size > self.max_upload_bytes {
            return Err(AppError::invalid_input(format!(
                "The video file is {size} bytes; the limit is {} bytes",
                self.max_upload_bytes
            )));
        }
        Ok(size)
    }

    async fn initialize(
        &self,
        access_token: &str,
        request: &UploadRequest,
        plan: ChunkPlan,
    ) -> AppResult<UploadJob> {
        let path = if request.is_draft {
            api::INBOX_INIT_PATH
        } else {
            api::DIRECT_POST_INIT_PATH
        };
        let body = Self::init_body(request, &plan);
        info!(
            draft = request.is_draft,
            video_size = plan.video_size,
            chunk_size = plan.chunk_size,
            total_chunk_count = plan.total_chunk_count,
            "Initializing upload"
        );

        let http_request = self
            .api
            .request(Method::POST, path, access_token)
            .json(&body);
        let response = TikTokApiClient::execute(http_request, "Upload init request").await?;
        let response = Self::check_init_status(response)?;

        let publish_id = envelope::string_field(&response.body, "publish_id");
        let upload_url = envelope::string_field(&response.body, "upload_url");
        match (publish_id, upload_url) {
            (Some(publish_id), Some(upload_url)) => Ok(UploadJob {
                publish_id,
                upload_url,
                plan,
                is_draft: request.is_draft,
                state: UploadState::UploadInit,
            }),
            (publish_id, _) => {
                let detail = envelope::platform_error(&response.body)
                    .filter(|e| !e.is_ok())
                    .map(|e| format!(" ({}: {})", e.code, e.message))
                    .unwrap_or_default();
                let error = AppError::initialization(format!(
                    "Upload initialization returned no publish_id or upload_url{detail}"
                ));
                Err(match publish_id {
                    Some(id) => error.with_publish_id(id),
                    None => error,
                })
            }
        }
    }

    /// Init request body; privacy is always forced to `SELF_ONLY`
    #[must_use]
    pub fn init_body(request: &UploadRequest, plan: &ChunkPlan) -> Value {
        json!({
            "post_info": {
                "title": request.title,
                "privacy_level": FORCED_PRIVACY_LEVEL,
                "disable_comment": request.disable_comment,
                "disable_duet": request.disable_duet,
                "disable_stitch": request.disable_stitch,
                "video_cover_timestamp_ms": upload::VIDEO_COVER_TIMESTAMP_MS,
            },
            "source_info": {
                "source": upload::SOURCE_FILE_UPLOAD,
                "video_size": plan.video_size,
                "chunk_size": plan.chunk_size,
                "total_chunk_count": plan.total_chunk_count,
            }
        })
    }

    fn check_init_status(response: ApiResponse) -> AppResult<ApiResponse> {
        match response.status {
            StatusCode::OK => Ok(response),
            StatusCode::FORBIDDEN if response.raw.contains(upload::UNAUDITED_PRIVATE_ONLY) => {
                warn!("Upload refused: unaudited app posting to a public account");
                Err(AppError::initialization(
                    "Unaudited apps can only post to private accounts. Set the account to private in the TikTok app.",
                ))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(AppError::rate_limited(
                "API rate limit reached. Please wait a moment and try again.",
            )),
            status => {
                warn!(status = status.as_u16(), body = %response.raw, "Upload init failed");
                Err(AppError::initialization(format!(
                    "Upload initialization failed with HTTP {}: {}",
                    status.as_u16(),
                    response.raw
                )))
            }
        }
    }

    /// Public profile link for a creator handle
    #[must_use]
    pub fn profile_link(&self, username: &str) -> String {
        format!("{}/@{username}", self.profile_base_url)
    }

    fn success_outcome(
        &self,
        completed: Completed,
        verdict: Option<PrivacyVerdict>,
    ) -> UploadOutcome {
        let Completed {
            job,
            creator,
            publish_status,
        } = completed;
        let video_id = video_id_from_publish_id(&job.publish_id);
        let profile_link = self.profile_link(&creator.creator_username);

        let message = if job.is_draft {
            format!(
                "Video saved to your TikTok drafts. Check the TikTok app notifications to edit and post it.\nProfile: {profile_link}\nVideo ID: {video_id}"
            )
        } else {
            format!("Video upload complete.\nProfile: {profile_link}\nVideo ID: {video_id}")
        };

        let warning = (verdict == Some(PrivacyVerdict::PrivateGateFailed)).then(|| {
            "The account is not private. Unaudited apps can only post to private accounts; switch the account to private in the TikTok app.".to_owned()
        });

        UploadOutcome {
            success: true,
            message,
            publish_id: Some(job.publish_id),
            video_id: Some(video_id),
            state: UploadState::Done,
            error_code: None,
            warning,
            privacy_verdict: verdict,
            publish_status,
        }
    }

    fn failure_outcome(error: AppError, progress: &Progress) -> UploadOutcome {
        let state = if progress.state == UploadState::Transferring {
            UploadState::TransferFailed
        } else {
            UploadState::Aborted
        };
        let publish_id = error.publish_id.clone().or_else(|| progress.publish_id.clone());

        UploadOutcome {
            success: false,
            message: format!("Upload error: {}", error.message),
            video_id: None,
            publish_id,
            state,
            error_code: Some(error.code),
            warning: None,
            privacy_verdict: progress.verdict,
            publish_status: None,
        }
    }
}
