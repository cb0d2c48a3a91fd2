// ABOUTME: Tests for the pending authorization session store
// ABOUTME: State matching, single use, replacement and expiry of the pending login
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use anyhow::Result;
use std::time::Duration;
use tiktok_studio::errors::ErrorCode;
use tiktok_studio::oauth2_client::AuthorizationSessionStore;

fn store() -> AuthorizationSessionStore {
    AuthorizationSessionStore::new(Duration::from_secs(300))
}

#[tokio::test]
async fn test_consume_returns_verifier_once() -> Result<()> {
    let sessions = store();
    let pair = sessions.start("s1").await;

    let verifier = sessions.consume("s1").await?;
    assert_eq!(verifier, pair.verifier);

    let second = sessions.consume("s1").await.unwrap_err();
    assert_eq!(second.code, ErrorCode::InvalidState);
    Ok(())
}

#[tokio::test]
async fn test_mismatch_keeps_pending_session() -> Result<()> {
    let sessions = store();
    let pair = sessions.start("s1").await;

    let err = sessions.consume("wrong").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    assert!(sessions.has_pending().await);

    assert_eq!(sessions.consume("s1").await?, pair.verifier);
    Ok(())
}

#[tokio::test]
async fn test_consume_without_start_fails() {
    let err = store().consume("s1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
}

#[tokio::test]
async fn test_new_start_replaces_previous_session() -> Result<()> {
    let sessions = store();
    sessions.start("first").await;
    let second = sessions.start("second").await;

    assert!(sessions.consume("first").await.is_err());
    assert_eq!(sessions.consume("second").await?, second.verifier);
    Ok(())
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let sessions = AuthorizationSessionStore::new(Duration::from_millis(20));
    sessions.start("s1").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!sessions.has_pending().await);
    let err = sessions.consume("s1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
}
