// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile gate for panel routes.

use crate::error::AppError;
use crate::models::{Profile, Role};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Resolved identity handed to panel handlers. `id` is always the
/// authenticated subject id.
#[derive(Debug, Clone)]
pub struct AuthProfile {
    pub id: String,
    pub role: Role,
}

/// Middleware that requires a Ready profile for the current session.
///
/// Inserts both [`AuthProfile`] and the full [`Profile`] as request
/// extensions.
pub async fn require_profile(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let snapshot = state.shell.snapshot();
    if snapshot.session.is_none() {
        return Err(AppError::Unauthorized);
    }

    let profile = snapshot
        .current_profile()
        .cloned()
        .ok_or_else(|| AppError::ProfileUnavailable(state.shell.view().name().to_string()))?;
    let role = profile
        .role
        .ok_or_else(|| AppError::ProfileUnavailable("unrecognized role".to_string()))?;

    request.extensions_mut().insert(AuthProfile {
        id: profile.id.clone(),
        role,
    });
    request.extensions_mut().insert::<Profile>(profile);

    Ok(next.run(request).await)
}
