// ABOUTME: Chunked video upload pipeline for the platform's Content Posting API
// ABOUTME: Capability gate, chunk planning, sequential transfer, status polling and orchestration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Creator info fetch and private-account rule
pub mod capability;
/// Chunk geometry
pub mod chunk_plan;
/// State machine driving a whole upload
pub mod orchestrator;
/// Publish status query and video id derivation
pub mod status;
/// Sequential chunk PUTs
pub mod transfer;

pub use capability::{is_private_account, CapabilityGate, CreatorInfo, PrivacyVerdict};
pub use chunk_plan::{ChunkPlan, ChunkRange};
pub use orchestrator::{UploadJob, UploadOrchestrator, UploadOutcome, UploadRequest, UploadState};
pub use status::{video_id_from_publish_id, PublishStatus, StatusPoller};
pub use transfer::ChunkTransfer;
