// ABOUTME: Login route handlers: redirect to the platform authorize page and handle the callback
// ABOUTME: Errors on the callback redirect back to the start page with an error code
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Authentication routes
//!
//! Thin wrappers over [`crate::oauth2_client::LoginFlowManager`].

use crate::{errors::AppError, resources::ServerResources};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Where a completed login lands
pub const LOGIN_SUCCESS_REDIRECT: &str = "/api/user-data";

/// Optional inputs of `GET /login`
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Caller-supplied state token
    pub state: Option<String>,
}

/// Query parameters the platform appends to the redirect URI
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange
    pub code: Option<String>,
    /// State token echoed back from `/login`
    pub state: Option<String>,
    /// Platform error code, e.g. `access_denied`
    pub error: Option<String>,
    /// Human-readable error detail
    pub error_description: Option<String>,
}

/// Login routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the login routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/login", get(Self::handle_login))
            .route("/callback", get(Self::handle_callback))
            .route("/callback/", get(Self::handle_callback))
            .with_state(resources)
    }

    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<LoginQuery>,
    ) -> Result<Response, AppError> {
        let url = resources
            .login_flow
            .start_login(query.state.as_deref())
            .await?;
        Ok(found(&url))
    }

    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<CallbackQuery>,
    ) -> Response {
        if let Some(error) = query.error.as_deref() {
            warn!(
                error,
                description = query.error_description.as_deref().unwrap_or(""),
                "Authorization denied by the platform"
            );
            return found(&error_location(error));
        }

        let code = query.code.unwrap_or_default();
        let state = query.state.unwrap_or_default();

        match resources.login_flow.complete_login(&code, &state).await {
            Ok(credential) => {
                info!(user.open_id = %credential.open_id, "Login completed");
                found(LOGIN_SUCCESS_REDIRECT)
            }
            Err(e) => {
                warn!(error = %e, "Login callback failed");
                found(&error_location(&e.code.to_string()))
            }
        }
    }
}

/// `302 Found` to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

fn error_location(code: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", code)
        .finish();
    format!("/?{query}")
}
