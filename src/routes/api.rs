// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shell state and profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::require_profile;
use crate::models::{Profile, Role};
use crate::shell::{View, ViewAction};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Panel routes go behind the profile gate.
    let panel_routes = Router::new()
        .route("/api/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(state, require_profile));

    Router::new()
        .route("/api/view", get(get_view))
        .route("/api/profile/retry", post(retry_profile))
        .merge(panel_routes)
}

// ─── View ────────────────────────────────────────────────────

/// What the UI should render right now.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ViewResponse {
    pub view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub actions: Vec<ViewAction>,
}

impl ViewResponse {
    fn new(view: &View, profile: Option<&Profile>) -> Self {
        Self {
            view: view.name().to_string(),
            message: view.message().map(str::to_string),
            role: profile.and_then(|p| p.role),
            actions: view.actions().to_vec(),
        }
    }
}

async fn get_view(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    let snapshot = state.shell.snapshot();
    let view = crate::shell::route(&snapshot);
    Json(ViewResponse::new(&view, snapshot.current_profile()))
}

/// Retry profile resolution after a failure.
async fn retry_profile(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    if state.shell.snapshot().session.is_none() {
        return Err(AppError::Unauthorized);
    }
    state.shell.retry().await?;
    Ok(StatusCode::ACCEPTED)
}

// ─── Profile ─────────────────────────────────────────────────

async fn get_me(Extension(profile): Extension<Profile>) -> Json<Profile> {
    Json(profile)
}
