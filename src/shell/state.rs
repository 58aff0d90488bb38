// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Published shell state.

use crate::error::ResolveError;
use crate::models::{Profile, Session};

/// Progress of profile resolution for the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionState {
    Idle,
    Resolving,
    Ready(Profile),
    Failed(ResolveError),
}

impl ResolutionState {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            ResolutionState::Ready(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Everything the router and the HTTP layer read from the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellSnapshot {
    /// False until the first session query or notification has been handled
    pub session_checked: bool,
    pub session: Option<Session>,
    pub resolution: ResolutionState,
    /// Generation of the most recently started resolution
    pub generation: u64,
}

impl ShellSnapshot {
    pub fn initial() -> Self {
        Self {
            session_checked: false,
            session: None,
            resolution: ResolutionState::Idle,
            generation: 0,
        }
    }

    /// The Ready profile, only if it belongs to the current session.
    pub fn current_profile(&self) -> Option<&Profile> {
        let session = self.session.as_ref()?;
        self.resolution
            .profile()
            .filter(|profile| profile.id == session.user_id)
    }
}
