// ABOUTME: Integration tests for the upload pipeline against a stub platform
// ABOUTME: Init endpoint choice, init body, chunk headers, failure states and best-effort status poll
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use common::{
    test_config, test_credential, video_file, StubPlatform, STUB_PUBLISH_ID, STUB_VIDEO_ID,
};
use reqwest::Method;
use serde_json::json;
use tiktok_studio::config::ServerConfig;
use tiktok_studio::errors::ErrorCode;
use tiktok_studio::providers::TikTokApiClient;
use tiktok_studio::upload::{
    ChunkPlan, ChunkTransfer, PrivacyVerdict, UploadOrchestrator, UploadOutcome, UploadRequest,
    UploadState,
};

const DIRECT_INIT: &str = "/v2/post/publish/video/init/";
const INBOX_INIT: &str = "/v2/post/publish/inbox/video/init/";
const CREATOR_INFO: &str = "/v2/post/publish/creator_info/query/";
const STATUS: &str = "/v2/post/publish/status/fetch/";
const MIB: usize = 1024 * 1024;

fn orchestrator(stub: &StubPlatform) -> UploadOrchestrator {
    orchestrator_with(stub, &test_config(&stub.base_url))
}

fn orchestrator_with(stub: &StubPlatform, config: &ServerConfig) -> UploadOrchestrator {
    UploadOrchestrator::new(TikTokApiClient::new(stub.base_url.clone()), config)
}

async fn upload(stub: &StubPlatform, request: &UploadRequest) -> UploadOutcome {
    orchestrator(stub)
        .submit(&test_credential("uid1"), request)
        .await
}

#[tokio::test]
async fn test_direct_upload_success() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let file = video_file(4096)?;
    let mut request = UploadRequest::new(file.path(), "My first clip");
    request.disable_duet = true;

    let outcome = upload(&stub, &request).await;

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.state, UploadState::Done);
    assert_eq!(outcome.publish_id.as_deref(), Some(STUB_PUBLISH_ID));
    assert_eq!(outcome.video_id.as_deref(), Some(STUB_VIDEO_ID));
    assert_eq!(outcome.privacy_verdict, Some(PrivacyVerdict::Private));
    assert!(outcome.warning.is_none());
    assert!(outcome.message.starts_with("Video upload complete."));
    assert!(outcome
        .message
        .contains("https://www.tiktok.com/@stubcreator"));
    assert!(outcome.message.contains(STUB_VIDEO_ID));
    assert_eq!(outcome.publish_status.unwrap().status, "PROCESSING_UPLOAD");

    assert_eq!(stub.count(INBOX_INIT), 0);
    let init = stub.requests_to(DIRECT_INIT)[0].json();
    assert_eq!(
        init,
        json!({
            "post_info": {
                "title": "My first clip",
                "privacy_level": "SELF_ONLY",
                "disable_comment": false,
                "disable_duet": true,
                "disable_stitch": false,
                "video_cover_timestamp_ms": 1000
            },
            "source_info": {
                "source": "FILE_UPLOAD",
                "video_size": 4096,
                "chunk_size": 4096,
                "total_chunk_count": 1
            }
        })
    );

    let chunk = &stub.requests_to("/upload")[0];
    assert_eq!(chunk.method, Method::PUT);
    assert_eq!(chunk.header("content-range").as_deref(), Some("bytes 0-4095/4096"));
    assert_eq!(chunk.header("content-length").as_deref(), Some("4096"));
    assert_eq!(chunk.header("content-type").as_deref(), Some("video/mp4"));
    assert_eq!(chunk.body.len(), 4096);

    let status = &stub.requests_to(STATUS)[0];
    assert_eq!(status.json(), json!({ "publish_id": STUB_PUBLISH_ID }));
    Ok(())
}

#[tokio::test]
async fn test_null_creator_nickname_still_uploads() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| {
        b.creator_body = json!({ "data": {
            "creator_username": "a",
            "creator_nickname": null,
            "privacy_level_options": ["FOLLOWER_OF_CREATOR"]
        }});
    });
    let file = video_file(4096)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "clip")).await;

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.state, UploadState::Done);
    assert_eq!(outcome.privacy_verdict, Some(PrivacyVerdict::Private));
    assert!(outcome.message.contains("https://www.tiktok.com/@a"));
    Ok(())
}

#[tokio::test]
async fn test_request_order() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let file = video_file(100)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "ordered")).await;
    assert!(outcome.success);

    let paths: Vec<String> = stub.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec![CREATOR_INFO, DIRECT_INIT, "/upload", STATUS]);
    Ok(())
}

#[tokio::test]
async fn test_draft_uses_inbox_endpoint() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let file = video_file(2048)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "draft").as_draft()).await;

    assert!(outcome.success);
    assert_eq!(stub.count(INBOX_INIT), 1);
    assert_eq!(stub.count(DIRECT_INIT), 0);
    assert!(outcome.message.starts_with("Video saved to your TikTok drafts."));
    Ok(())
}

#[tokio::test]
async fn test_multi_chunk_upload_is_sequential_and_exact() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let size = 10 * MIB + 1000;
    let file = video_file(size)?;
    let expected = std::fs::read(file.path())?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "two chunks")).await;
    assert!(outcome.success, "{}", outcome.message);

    let chunks = stub.requests_to("/upload");
    assert_eq!(chunks.len(), 2);
    assert_eq!(
        chunks[0].header("content-range").as_deref(),
        Some("bytes 0-10485759/10486760")
    );
    assert_eq!(
        chunks[1].header("content-range").as_deref(),
        Some("bytes 10485760-10486759/10486760")
    );
    let received: Vec<u8> = chunks.iter().flat_map(|c| c.body.to_vec()).collect();
    assert_eq!(received, expected);

    let init = stub.requests_to(DIRECT_INIT)[0].json();
    assert_eq!(init["source_info"]["chunk_size"], 10 * MIB);
    assert_eq!(init["source_info"]["total_chunk_count"], 2);
    Ok(())
}

#[tokio::test]
async fn test_chunk_failure_reports_publish_id() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| b.chunk_fail_at = Some(0));
    let file = video_file(512)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "fails")).await;

    assert!(!outcome.success);
    assert_eq!(outcome.state, UploadState::TransferFailed);
    assert_eq!(outcome.error_code, Some(ErrorCode::ChunkTransferFailed));
    assert_eq!(outcome.publish_id.as_deref(), Some(STUB_PUBLISH_ID));
    assert!(outcome.message.starts_with("Upload error:"));
    assert_eq!(stub.count(STATUS), 0);
    Ok(())
}

#[tokio::test]
async fn test_transfer_stops_at_first_failed_chunk() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| b.chunk_fail_at = Some(1));
    let file = video_file(100)?;
    let plan = ChunkPlan::plan_with_chunk_size(100, 30);
    assert_eq!(plan.total_chunk_count, 4);

    let err = ChunkTransfer::new()
        .transfer(&format!("{}/upload", stub.base_url), file.path(), &plan)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ChunkTransferFailed);
    assert_eq!(stub.count("/upload"), 2);
    Ok(())
}

#[tokio::test]
async fn test_transfer_of_empty_plan_is_noop() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let file = video_file(0)?;

    let sent = ChunkTransfer::new()
        .transfer(
            &format!("{}/upload", stub.base_url),
            file.path(),
            &ChunkPlan::plan(0),
        )
        .await?;

    assert_eq!(sent, 0);
    assert_eq!(stub.count("/upload"), 0);
    Ok(())
}

#[tokio::test]
async fn test_status_failure_does_not_fail_upload() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| b.status_status = 500);
    let file = video_file(256)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "status down")).await;

    assert!(outcome.success);
    assert_eq!(outcome.state, UploadState::Done);
    assert!(outcome.publish_status.is_none());
    Ok(())
}

#[tokio::test]
async fn test_public_account_proceeds_with_warning() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| {
        b.creator_body = json!({ "data": {
            "creator_username": "public_one",
            "privacy_level_options": ["PUBLIC_TO_EVERYONE", "FOLLOWER_OF_CREATOR", "SELF_ONLY"]
        }});
    });
    let file = video_file(256)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "public")).await;

    assert!(outcome.success);
    assert_eq!(outcome.privacy_verdict, Some(PrivacyVerdict::PrivateGateFailed));
    assert!(outcome.warning.is_some());
    let init = stub.requests_to(DIRECT_INIT)[0].json();
    assert_eq!(init["post_info"]["privacy_level"], "SELF_ONLY");
    Ok(())
}

#[tokio::test]
async fn test_capability_failure_aborts_before_init() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| b.creator_status = 401);
    let file = video_file(256)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "no scope")).await;

    assert!(!outcome.success);
    assert_eq!(outcome.state, UploadState::Aborted);
    assert_eq!(outcome.error_code, Some(ErrorCode::InsufficientScope));
    assert!(outcome.publish_id.is_none());
    assert_eq!(stub.count(DIRECT_INIT), 0);
    Ok(())
}

#[tokio::test]
async fn test_unaudited_private_only_init_error() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| {
        b.init_status = 403;
        b.init_body = Some(json!({ "error": {
            "code": "unaudited_client_can_only_post_to_private_accounts",
            "message": "Please review our integration guidelines"
        }}));
    });
    let file = video_file(256)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "public acct")).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error_code, Some(ErrorCode::InitializationFailed));
    assert!(outcome.message.contains("private accounts"));
    assert_eq!(stub.count("/upload"), 0);
    Ok(())
}

#[tokio::test]
async fn test_init_rate_limited() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| b.init_status = 429);
    let file = video_file(256)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "busy")).await;

    assert_eq!(outcome.error_code, Some(ErrorCode::RateLimited));
    assert_eq!(outcome.state, UploadState::Aborted);
    Ok(())
}

#[tokio::test]
async fn test_init_without_upload_url_fails() -> Result<()> {
    let stub = StubPlatform::start().await?;
    stub.configure(|b| b.init_body = Some(json!({ "data": { "publish_id": "p~1" } })));
    let file = video_file(256)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "half")).await;

    assert_eq!(outcome.error_code, Some(ErrorCode::InitializationFailed));
    assert_eq!(outcome.publish_id.as_deref(), Some("p~1"));
    assert_eq!(stub.count("/upload"), 0);
    Ok(())
}

#[tokio::test]
async fn test_init_fields_at_top_level() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let upload_url = format!("{}/upload", stub.base_url);
    stub.configure(|b| {
        b.init_body = Some(json!({ "publish_id": "top~v2-1.99", "upload_url": upload_url }));
    });
    let file = video_file(64)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "top level")).await;

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.video_id.as_deref(), Some("99"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_input_rejected_before_network() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let file = video_file(256)?;
    let empty = video_file(0)?;
    let long_title = "x".repeat(2201);

    let cases = [
        UploadRequest::new(file.path(), "   "),
        UploadRequest::new(file.path(), long_title),
        UploadRequest::new("/definitely/not/here.mp4", "missing"),
        UploadRequest::new(std::env::temp_dir(), "a directory"),
        UploadRequest::new(empty.path(), "empty"),
    ];
    for request in &cases {
        let outcome = upload(&stub, request).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(ErrorCode::InvalidInput));
        assert_eq!(outcome.state, UploadState::Aborted);
    }

    assert!(stub.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_title_at_limit_is_accepted() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let file = video_file(32)?;

    let outcome = upload(&stub, &UploadRequest::new(file.path(), "é".repeat(2200))).await;

    assert!(outcome.success, "{}", outcome.message);
    Ok(())
}

#[tokio::test]
async fn test_file_over_limit_is_rejected() -> Result<()> {
    let stub = StubPlatform::start().await?;
    let mut config = test_config(&stub.base_url);
    config.upload.max_upload_bytes = 100;
    let file = video_file(101)?;

    let outcome = orchestrator_with(&stub, &config)
        .submit(&test_credential("uid1"), &UploadRequest::new(file.path(), "big"))
        .await;

    assert_eq!(outcome.error_code, Some(ErrorCode::InvalidInput));
    assert!(stub.requests().is_empty());
    Ok(())
}
