// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapping from shell state to the view the UI should render.
//!
//! Pure and synchronous: no I/O, no suspension.

use crate::models::Role;
use crate::shell::state::{ResolutionState, ShellSnapshot};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User actions offered alongside a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum ViewAction {
    Retry,
    SignOut,
}

/// Why a loading view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    CheckingSession,
    FetchingProfile,
    /// Profile is ready but its role maps to no dashboard.
    Routing,
}

impl LoadingStage {
    pub fn message(&self) -> &'static str {
        match self {
            LoadingStage::CheckingSession => "checking session",
            LoadingStage::FetchingProfile => "fetching profile",
            LoadingStage::Routing => "routing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading(LoadingStage),
    LoggedOut,
    ProfileError {
        reason: String,
        actions: [ViewAction; 2],
    },
    AdminView,
    EmployeeView,
}

impl View {
    fn profile_error(reason: String) -> Self {
        View::ProfileError {
            reason,
            actions: [ViewAction::Retry, ViewAction::SignOut],
        }
    }

    /// Stable identifier for API clients.
    pub fn name(&self) -> &'static str {
        match self {
            View::Loading(_) => "loading",
            View::LoggedOut => "logged_out",
            View::ProfileError { .. } => "profile_error",
            View::AdminView => "admin",
            View::EmployeeView => "employee",
        }
    }

    /// Loading message or error reason.
    pub fn message(&self) -> Option<&str> {
        match self {
            View::Loading(stage) => Some(stage.message()),
            View::ProfileError { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }

    pub fn actions(&self) -> &[ViewAction] {
        match self {
            View::ProfileError { actions, .. } => actions.as_slice(),
            _ => &[],
        }
    }
}

/// Route a published snapshot.
pub fn route(snapshot: &ShellSnapshot) -> View {
    if !snapshot.session_checked {
        return View::Loading(LoadingStage::CheckingSession);
    }
    let Some(session) = snapshot.session.as_ref() else {
        return View::LoggedOut;
    };

    match &snapshot.resolution {
        ResolutionState::Idle | ResolutionState::Resolving => {
            View::Loading(LoadingStage::FetchingProfile)
        }
        ResolutionState::Failed(err) => View::profile_error(err.reason()),
        // A profile for another subject is never shown.
        ResolutionState::Ready(profile) if profile.id != session.user_id => {
            View::Loading(LoadingStage::FetchingProfile)
        }
        ResolutionState::Ready(profile) => match profile.role {
            Some(Role::Admin) => View::AdminView,
            Some(Role::Employee) => View::EmployeeView,
            None => View::Loading(LoadingStage::Routing),
        },
    }
}
