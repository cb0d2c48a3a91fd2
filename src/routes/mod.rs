// ABOUTME: Route module organization for the HTTP surface
// ABOUTME: Merges login, account, upload and health routes into one router with request tracing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Route module
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer.

/// Login redirect and OAuth callback
pub mod auth;
/// Health check
pub mod health;
/// Video upload and draft upload
pub mod upload;
/// Account listing, dashboard data and account switching
pub mod users;

pub use auth::AuthRoutes;
pub use health::HealthRoutes;
pub use upload::UploadRoutes;
pub use users::UserRoutes;

use crate::resources::ServerResources;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the complete application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(UserRoutes::routes(Arc::clone(&resources)))
        .merge(UploadRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
}
