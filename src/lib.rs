// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SVL Portal: identity shell for the clinic staff console.
//!
//! Turns sessions issued by the auth provider into application profiles
//! (provisioning them on first sign-in) and decides which dashboard the
//! console should show.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shell;

use config::Config;
use db::ProfileStore;
use services::{IdentityPolicy, IdentityResolver, SessionHub};
use shell::{Shell, ShellHandle};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionHub>,
    pub shell: ShellHandle,
}

impl AppState {
    /// Wire the session hub, resolver and shell together and mount the shell.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config, store: Arc<dyn ProfileStore>) -> Self {
        let sessions = Arc::new(SessionHub::new());
        let resolver = IdentityResolver::new(store, IdentityPolicy::from_config(&config));
        let shell = Shell::mount(sessions.clone(), resolver);

        Self {
            config,
            sessions,
            shell,
        }
    }
}
