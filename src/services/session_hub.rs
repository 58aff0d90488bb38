// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth provider interface and the in-process session hub.

use crate::error::AppError;
use crate::models::{AuthEvent, AuthEventKind, Session};
use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

/// Buffered notifications per subscriber before it starts lagging.
const EVENT_BUFFER: usize = 64;

/// Source of auth-state notifications.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Subscribe to auth-state changes from this point on.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// One-shot query for the session at this instant.
    async fn current_session(&self) -> Option<Session>;

    /// End the current session. Subscribers receive a `SignedOut` event.
    async fn sign_out(&self) -> Result<(), AppError>;

    /// End the session identified by `session_id` if it is still current.
    ///
    /// Returns `false`, emitting nothing, when a different session (or none)
    /// is installed.
    async fn end_session(&self, session_id: &str) -> Result<bool, AppError>;
}

/// Holds the workstation's current session and fans out changes.
pub struct SessionHub {
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            current: RwLock::new(None),
            events,
        }
    }

    /// Install a session. Emits `TokenRefreshed` when the subject is
    /// unchanged, otherwise `SignedIn`.
    pub async fn sign_in(&self, session: Session) -> AuthEventKind {
        // The write lock is held while sending so that event order matches
        // the order of state changes.
        let mut current = self.current.write().await;
        let kind = match current.as_ref() {
            Some(existing) if existing.user_id == session.user_id => AuthEventKind::TokenRefreshed,
            _ => AuthEventKind::SignedIn,
        };

        tracing::info!(user_id = %session.user_id, kind = ?kind, "Session installed");
        *current = Some(session.clone());
        self.emit(AuthEvent::new(kind, Some(session)));
        kind
    }

    /// Publish an updated session for the current subject.
    pub async fn update_user(&self, session: Session) -> Result<(), AppError> {
        let mut current = self.current.write().await;
        match current.as_ref() {
            Some(existing) if existing.user_id == session.user_id => {
                *current = Some(session.clone());
                self.emit(AuthEvent::new(AuthEventKind::UserUpdated, Some(session)));
                Ok(())
            }
            _ => Err(AppError::Unauthorized),
        }
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is not an error; the state is still recorded.
        if self.events.send(event).is_err() {
            tracing::debug!("Auth event dropped, no subscribers");
        }
    }
}

#[async_trait]
impl AuthProvider for SessionHub {
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn current_session(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        let mut current = self.current.write().await;
        if let Some(previous) = current.take() {
            tracing::info!(user_id = %previous.user_id, "Session ended");
        }
        self.emit(AuthEvent::signed_out());
        Ok(())
    }

    async fn end_session(&self, session_id: &str) -> Result<bool, AppError> {
        let mut current = self.current.write().await;
        match current.as_ref() {
            Some(existing) if existing.id == session_id => {
                tracing::info!(user_id = %existing.user_id, "Session ended");
                *current = None;
                self.emit(AuthEvent::signed_out());
                Ok(true)
            }
            _ => {
                tracing::debug!(session_id, "Session already replaced, not ending");
                Ok(false)
            }
        }
    }
}
