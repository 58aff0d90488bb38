// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use svl_portal::config::Config;
use svl_portal::db::{FirestoreDb, MemoryProfileStore, ProfileStore};
use svl_portal::models::{ProfileRow, Session};
use svl_portal::routes::create_router;
use svl_portal::services::{IdentityPolicy, IdentityResolver, SessionHub};
use svl_portal::shell::{Shell, ShellHandle, View};
use svl_portal::AppState;

pub const ADMIN_EMAIL: &str = "haj@svl.dk";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A session for `user_id` with an optional signup name.
#[allow(dead_code)]
pub fn session(user_id: &str, email: &str, signup_name: Option<&str>) -> Session {
    let mut user_metadata = serde_json::Map::new();
    if let Some(name) = signup_name {
        user_metadata.insert("name".to_string(), serde_json::json!(name));
    }
    Session {
        id: format!("sess-{}", user_id),
        user_id: user_id.to_string(),
        email: email.to_string(),
        user_metadata,
    }
}

/// A stored profile row.
#[allow(dead_code)]
pub fn profile_row(user_id: &str, email: &str, role: &str) -> ProfileRow {
    ProfileRow {
        id: user_id.to_string(),
        email: email.to_string(),
        name: "Existing".to_string(),
        full_name: None,
        role: role.to_string(),
        hourly_rate: Some(250.0),
    }
}

#[allow(dead_code)]
pub fn test_resolver(store: Arc<dyn ProfileStore>) -> IdentityResolver {
    IdentityResolver::new(store, IdentityPolicy::from_config(&Config::test_default()))
}

/// Mount a shell over a fresh hub and wait until it has checked the
/// (empty) initial session.
#[allow(dead_code)]
pub async fn mount_shell(store: Arc<dyn ProfileStore>) -> (Arc<SessionHub>, ShellHandle) {
    let hub = Arc::new(SessionHub::new());
    let mut shell = Shell::mount(hub.clone(), test_resolver(store));
    shell
        .wait_for_view(|v| *v == View::LoggedOut)
        .await
        .expect("shell stopped before checking session");
    (hub, shell)
}

/// Create a test app over an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(store: Arc<MemoryProfileStore>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), store));
    (create_router(state.clone()), state)
}
