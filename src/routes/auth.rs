// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes. The UI hands over the provider's access token here.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::AuthEventKind;
use crate::services::session_token::verify_access_token;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(install_session))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct SessionRequest {
    access_token: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    /// `signed_in` or `token_refreshed`
    pub event: String,
}

/// Verify an access token and install its session.
///
/// Profile resolution happens asynchronously; poll `/api/view`.
async fn install_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    if body.access_token.trim().is_empty() {
        return Err(AppError::BadRequest("access_token is required".to_string()));
    }

    let session = verify_access_token(body.access_token.trim(), &state.config.auth_jwt_secret)?;
    let kind = state.sessions.sign_in(session).await;

    let event = match kind {
        AuthEventKind::TokenRefreshed => "token_refreshed",
        _ => "signed_in",
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(SessionResponse {
            event: event.to_string(),
        }),
    ))
}

/// End the session.
async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.shell.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
