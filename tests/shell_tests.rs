// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shell event-loop tests: routing, supersession and sign-out ordering.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use svl_portal::db::{MemoryProfileStore, ProfileStore};
use svl_portal::error::AppError;
use svl_portal::models::{ProfileRow, Role};
use svl_portal::services::{AuthProvider, SessionHub};
use svl_portal::shell::{route, LoadingStage, ResolutionState, Shell, View, ViewAction};

mod common;
use common::{mount_shell, profile_row, session, test_resolver, ADMIN_EMAIL};

fn is_dashboard(view: &View) -> bool {
    matches!(view, View::AdminView | View::EmployeeView)
}

#[tokio::test]
async fn test_bootstrap_admin_reaches_admin_view() {
    let store = Arc::new(MemoryProfileStore::new());
    let (hub, mut shell) = mount_shell(store.clone()).await;

    hub.sign_in(session("a1", ADMIN_EMAIL, None)).await;

    let view = shell.wait_for_view(is_dashboard).await.unwrap();
    assert_eq!(view, View::AdminView);

    let profile = shell.profile().unwrap();
    assert_eq!(profile.id, "a1");
    assert_eq!(profile.email, ADMIN_EMAIL);
    assert_eq!(profile.role, Some(Role::Admin));
}

#[tokio::test]
async fn test_existing_employee_reaches_employee_view() {
    let store = Arc::new(MemoryProfileStore::new());
    store.seed(profile_row("e1", "jane@svl.dk", "employee"));
    let (hub, mut shell) = mount_shell(store.clone()).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;

    let view = shell.wait_for_view(is_dashboard).await.unwrap();
    assert_eq!(view, View::EmployeeView);
    assert_eq!(store.row("e1").unwrap().role, "employee");
}

#[tokio::test]
async fn test_unrecognized_role_stays_loading() {
    let store = Arc::new(MemoryProfileStore::new());
    store.seed(profile_row("x1", "x@svl.dk", "auditor"));
    let (hub, mut shell) = mount_shell(store).await;

    hub.sign_in(session("x1", "x@svl.dk", None)).await;

    let snapshot = shell
        .wait_for_snapshot(|s| matches!(s.resolution, ResolutionState::Ready(_)))
        .await
        .unwrap();
    assert_eq!(snapshot.current_profile().unwrap().role, None);
    assert_eq!(shell.view(), View::Loading(LoadingStage::Routing));
}

#[tokio::test]
async fn test_read_failure_shows_error_and_retry_recovers() {
    let store = Arc::new(MemoryProfileStore::new());
    store.set_fail_reads(true);
    let (hub, mut shell) = mount_shell(store.clone()).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;

    let view = shell
        .wait_for_view(|v| matches!(v, View::ProfileError { .. }))
        .await
        .unwrap();
    match view {
        View::ProfileError { reason, actions } => {
            assert!(reason.contains("profile read failed"), "reason: {}", reason);
            assert_eq!(actions, [ViewAction::Retry, ViewAction::SignOut]);
        }
        other => panic!("unexpected view {:?}", other),
    }
    assert!(store.is_empty(), "no profile created on read failure");

    store.set_fail_reads(false);
    shell.retry().await.unwrap();

    let view = shell.wait_for_view(is_dashboard).await.unwrap();
    assert_eq!(view, View::EmployeeView);
    assert_eq!(shell.profile().unwrap().id, "e1");
    assert_eq!(store.read_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_read_timeout_shows_error() {
    let store = Arc::new(MemoryProfileStore::new());
    store.set_read_delay("e1", Duration::from_secs(120));
    let (hub, mut shell) = mount_shell(store).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;

    let view = shell
        .wait_for_view(|v| matches!(v, View::ProfileError { .. }))
        .await
        .unwrap();
    assert_eq!(view.message(), Some("timeout"));
}

#[tokio::test(start_paused = true)]
async fn test_newer_session_wins_over_slower_older_one() {
    let store = Arc::new(MemoryProfileStore::new());
    store.seed(profile_row("slow", "slow@svl.dk", "employee"));
    store.set_read_delay("slow", Duration::from_secs(5));
    store.set_read_delay("fast", Duration::from_secs(1));
    let (hub, mut shell) = mount_shell(store).await;

    hub.sign_in(session("slow", "slow@svl.dk", None)).await;
    hub.sign_in(session("fast", ADMIN_EMAIL, None)).await;

    let view = shell.wait_for_view(is_dashboard).await.unwrap();
    assert_eq!(view, View::AdminView);
    assert_eq!(shell.profile().unwrap().id, "fast");

    // Let the superseded lookup finish; it must not replace the state.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(shell.view(), View::AdminView);
    assert_eq!(shell.profile().unwrap().id, "fast");
    assert_eq!(shell.snapshot().session.unwrap().user_id, "fast");
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_while_resolving_discards_late_result() {
    let store = Arc::new(MemoryProfileStore::new());
    store.set_read_delay("e1", Duration::from_secs(5));
    let (hub, mut shell) = mount_shell(store.clone()).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;
    shell
        .wait_for_view(|v| *v == View::Loading(LoadingStage::FetchingProfile))
        .await
        .unwrap();

    shell.sign_out().await.unwrap();
    shell
        .wait_for_view(|v| *v == View::LoggedOut)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let snapshot = shell.snapshot();
    assert_eq!(shell.view(), View::LoggedOut);
    assert!(snapshot.session.is_none());
    assert_eq!(snapshot.resolution, ResolutionState::Idle);
    assert!(hub.current_session().await.is_none());
}

#[tokio::test]
async fn test_sign_out_and_back_in_keeps_identity() {
    let store = Arc::new(MemoryProfileStore::new());
    let (hub, mut shell) = mount_shell(store.clone()).await;

    hub.sign_in(session("e1", "jane@svl.dk", Some("Jane"))).await;
    shell.wait_for_view(is_dashboard).await.unwrap();
    let before = shell.profile().unwrap();

    hub.sign_out().await.unwrap();
    shell
        .wait_for_view(|v| *v == View::LoggedOut)
        .await
        .unwrap();
    assert!(shell.profile().is_none());

    hub.sign_in(session("e1", "jane@svl.dk", Some("Jane"))).await;
    shell.wait_for_view(is_dashboard).await.unwrap();
    let after = shell.profile().unwrap();

    assert_eq!(before.id, after.id);
    assert_eq!(before.role, after.role);
    assert_eq!(store.insert_count(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_sign_in_right_after_sign_out_survives() {
    let store = Arc::new(MemoryProfileStore::new());
    let (hub, mut shell) = mount_shell(store).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;
    shell.wait_for_view(is_dashboard).await.unwrap();

    shell.sign_out().await.unwrap();
    hub.sign_in(session("e2", "ole@svl.dk", None)).await;

    let snapshot = shell
        .wait_for_snapshot(|s| s.current_profile().is_some_and(|p| p.id == "e2"))
        .await
        .unwrap();
    assert_eq!(route(&snapshot), View::EmployeeView);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        hub.current_session().await.map(|s| s.user_id),
        Some("e2".to_string())
    );
    assert_eq!(shell.profile().unwrap().id, "e2");
}

#[tokio::test]
async fn test_token_refresh_does_not_re_resolve() {
    let store = Arc::new(MemoryProfileStore::new());
    let (hub, mut shell) = mount_shell(store.clone()).await;

    let mut s = session("e1", "jane@svl.dk", None);
    hub.sign_in(s.clone()).await;
    shell.wait_for_view(is_dashboard).await.unwrap();
    let generation = shell.snapshot().generation;

    s.id = "sess-refreshed".to_string();
    hub.sign_in(s).await;
    let snapshot = shell
        .wait_for_snapshot(|snap| {
            snap.session
                .as_ref()
                .is_some_and(|sess| sess.id == "sess-refreshed")
        })
        .await
        .unwrap();

    assert_eq!(snapshot.generation, generation);
    assert!(matches!(snapshot.resolution, ResolutionState::Ready(_)));
    assert_eq!(store.read_count(), 1);
}

#[tokio::test]
async fn test_existing_session_is_picked_up_at_mount() {
    let store = Arc::new(MemoryProfileStore::new());
    let hub = Arc::new(SessionHub::new());
    hub.sign_in(session("a1", ADMIN_EMAIL, None)).await;

    let mut shell = Shell::mount(hub.clone(), test_resolver(store));
    let mut saw_logged_out = false;
    let view = shell
        .wait_for_view(|v| {
            saw_logged_out |= *v == View::LoggedOut;
            is_dashboard(v)
        })
        .await
        .unwrap();

    assert_eq!(view, View::AdminView);
    assert!(!saw_logged_out, "no logged-out flash before the profile");
}

#[tokio::test]
async fn test_retry_without_session_is_ignored() {
    let store = Arc::new(MemoryProfileStore::new());
    let (_hub, shell) = mount_shell(store.clone()).await;
    let generation = shell.snapshot().generation;

    shell.retry().await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(shell.view(), View::LoggedOut);
    assert_eq!(shell.snapshot().generation, generation);
    assert_eq!(store.read_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_retry_while_resolving_is_ignored() {
    let store = Arc::new(MemoryProfileStore::new());
    store.set_read_delay("e1", Duration::from_secs(5));
    let (hub, mut shell) = mount_shell(store.clone()).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;
    shell
        .wait_for_view(|v| *v == View::Loading(LoadingStage::FetchingProfile))
        .await
        .unwrap();
    let generation = shell.snapshot().generation;

    shell.retry().await.unwrap();
    let view = shell.wait_for_view(is_dashboard).await.unwrap();

    assert_eq!(view, View::EmployeeView);
    assert_eq!(shell.snapshot().generation, generation);
    assert_eq!(store.read_count(), 1);
    assert_eq!(store.insert_count(), 1);
}

#[tokio::test]
async fn test_unmount_stops_shell() {
    let store = Arc::new(MemoryProfileStore::new());
    let (_hub, shell) = mount_shell(store).await;
    let other = shell.clone();

    shell.unmount().await;

    assert!(other.retry().await.is_err());
}

/// Store whose lookups panic.
struct PanickingStore;

#[async_trait]
impl ProfileStore for PanickingStore {
    async fn get_profile(&self, _id: &str) -> Result<Option<ProfileRow>, AppError> {
        panic!("store bug");
    }

    async fn insert_profile(&self, row: &ProfileRow) -> Result<ProfileRow, AppError> {
        Ok(row.clone())
    }

    async fn update_profile(&self, _row: &ProfileRow) -> Result<(), AppError> {
        Ok(())
    }
}

/// Store with no records whose inserts never complete.
struct HangingInsertStore;

#[async_trait]
impl ProfileStore for HangingInsertStore {
    async fn get_profile(&self, _id: &str) -> Result<Option<ProfileRow>, AppError> {
        Ok(None)
    }

    async fn insert_profile(&self, _row: &ProfileRow) -> Result<ProfileRow, AppError> {
        std::future::pending().await
    }

    async fn update_profile(&self, _row: &ProfileRow) -> Result<(), AppError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_hung_insert_does_not_leave_shell_loading() {
    let (hub, mut shell) = mount_shell(Arc::new(HangingInsertStore)).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;

    let view = shell.wait_for_view(is_dashboard).await.unwrap();
    assert_eq!(view, View::EmployeeView);
    assert_eq!(shell.profile().unwrap().name, "Standard Bruger");
}

#[tokio::test]
async fn test_panicking_resolution_becomes_failure() {
    let (hub, mut shell) = mount_shell(Arc::new(PanickingStore)).await;

    hub.sign_in(session("e1", "jane@svl.dk", None)).await;

    let view = shell
        .wait_for_view(|v| matches!(v, View::ProfileError { .. }))
        .await
        .unwrap();
    assert!(view
        .message()
        .unwrap()
        .starts_with("unexpected resolution failure"));
}
