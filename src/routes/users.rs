// ABOUTME: Account route handlers: list accounts, dashboard data, video details, switch, remove and logout
// ABOUTME: Dashboard data combines the cached profile with a page of the account's videos
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::{
    constants::api::DEFAULT_VIDEO_LIST_COUNT,
    credentials::Credential,
    errors::{AppError, AppResult},
    pagination::{paginate, Page, DEFAULT_PER_PAGE},
    providers::tiktok::{UserProfile, Video},
    resources::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `GET /api/users` response
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    /// Live accounts, oldest first
    pub users: Vec<Credential>,
    /// Currently selected account
    pub active_open_id: Option<String>,
}

/// `GET /api/user-data` query
#[derive(Debug, Default, Deserialize)]
pub struct UserDataQuery {
    /// Account to show; the active account when absent
    pub open_id: Option<String>,
    /// 1-based page of the video list
    pub page: Option<usize>,
    /// Videos per page
    pub per_page: Option<usize>,
}

/// `GET /api/user-data` response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDataResponse {
    /// Stored credential of the shown account
    pub user: Credential,
    /// Profile with stats merged in
    pub profile: UserProfile,
    /// Requested page of the video list
    pub videos: Page<Video>,
}

/// `GET /api/videos/:video_id` query
#[derive(Debug, Default, Deserialize)]
pub struct VideoQuery {
    /// Account owning the video; the active account when absent
    pub open_id: Option<String>,
}

/// Body naming one account
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    /// Target account id
    pub open_id: String,
}

/// Result of switch, remove and logout
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountActionResponse {
    /// Whether the action changed anything
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Account the action applied to
    pub open_id: Option<String>,
}

/// Account routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create the account routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", get(Self::handle_list))
            .route("/api/user-data", get(Self::handle_user_data))
            .route("/api/videos/:video_id", get(Self::handle_video))
            .route("/api/switch-user", post(Self::handle_switch))
            .route("/api/remove-user", post(Self::handle_remove))
            .route("/api/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    async fn handle_list(State(resources): State<Arc<ServerResources>>) -> Json<UsersResponse> {
        let users = resources.login_flow.accounts().await;
        let active_open_id = resources.credentials.active_open_id().await;
        Json(UsersResponse {
            users,
            active_open_id,
        })
    }

    async fn handle_user_data(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<UserDataQuery>,
    ) -> AppResult<Json<UserDataResponse>> {
        let credential = Self::resolve_account(&resources, query.open_id.as_deref()).await?;

        let profile = resources.account_data.profile(&credential).await?;
        let videos = resources
            .account_data
            .videos(&credential, DEFAULT_VIDEO_LIST_COUNT)
            .await?;
        let page = paginate(
            &videos,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(DEFAULT_PER_PAGE),
        );

        Ok(Json(UserDataResponse {
            user: credential,
            profile,
            videos: page,
        }))
    }

    async fn handle_video(
        State(resources): State<Arc<ServerResources>>,
        Path(video_id): Path<String>,
        Query(query): Query<VideoQuery>,
    ) -> AppResult<Json<Video>> {
        let credential = Self::resolve_account(&resources, query.open_id.as_deref()).await?;

        resources
            .account_data
            .video_details(&credential, &video_id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::not_found(format!("Video {video_id}")))
    }

    async fn handle_switch(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AccountRequest>,
    ) -> AppResult<Json<AccountActionResponse>> {
        let credential = resources.login_flow.switch_user(&request.open_id).await?;
        let name = credential
            .display_name
            .as_deref()
            .unwrap_or(&credential.open_id);
        Ok(Json(AccountActionResponse {
            success: true,
            message: format!("Switched to {name}"),
            open_id: Some(credential.open_id.clone()),
        }))
    }

    async fn handle_remove(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AccountRequest>,
    ) -> AppResult<Json<AccountActionResponse>> {
        if !resources.login_flow.remove_user(&request.open_id).await {
            return Err(AppError::not_found(format!("Account {}", request.open_id)));
        }
        resources.account_data.forget(&request.open_id).await;
        Ok(Json(AccountActionResponse {
            success: true,
            message: "Account removed".to_owned(),
            open_id: Some(request.open_id),
        }))
    }

    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<AccountActionResponse> {
        let removed = resources.login_flow.logout().await;
        if let Some(open_id) = removed.as_deref() {
            resources.account_data.forget(open_id).await;
        }
        Json(AccountActionResponse {
            success: removed.is_some(),
            message: if removed.is_some() {
                "Logged out".to_owned()
            } else {
                "No active account".to_owned()
            },
            open_id: removed,
        })
    }

    /// The named account, or the active one
    pub(crate) async fn resolve_account(
        resources: &ServerResources,
        open_id: Option<&str>,
    ) -> AppResult<Credential> {
        match open_id.filter(|id| !id.is_empty()) {
            Some(id) => resources
                .credentials
                .get(id)
                .await
                .ok_or_else(|| AppError::not_found(format!("Account {id}"))),
            None => resources
                .login_flow
                .get_active_credential()
                .await
                .ok_or_else(|| AppError::not_found("Active account")),
        }
    }
}
