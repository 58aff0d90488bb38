// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The shell: owner of the current session and its resolution state.
//!
//! One task per mounted shell consumes, in a single queue:
//! - auth notifications from the [`AuthProvider`]
//! - user commands (retry, sign-out) from [`ShellHandle`]s
//! - completions of spawned resolutions
//!
//! Resolutions never run inline in the loop. Each one is spawned with a
//! generation number, and a completion is applied only when its generation
//! is the latest issued and its subject is still the current session's.

pub mod router;
pub mod state;

pub use router::{route, LoadingStage, View, ViewAction};
pub use state::{ResolutionState, ShellSnapshot};

use crate::error::{AppError, ResolveError};
use crate::models::{AuthEvent, AuthEventKind, Profile, Session};
use crate::services::resolver::IdentityResolver;
use crate::services::session_hub::AuthProvider;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

const COMMAND_BUFFER: usize = 16;

#[derive(Debug)]
enum Command {
    Retry,
    /// Replies once the provider session has been ended.
    SignOut(oneshot::Sender<()>),
    Shutdown,
}

/// Result of one spawned resolution, tagged for the staleness check.
struct Completion {
    generation: u64,
    user_id: String,
    result: Result<Profile, ResolveError>,
}

/// Event loop state. Only this task writes the session/resolution pair.
pub struct Shell {
    auth: Arc<dyn AuthProvider>,
    resolver: IdentityResolver,
    state_tx: watch::Sender<ShellSnapshot>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    session_checked: bool,
    session: Option<Session>,
    resolution: ResolutionState,
    generation: u64,
}

impl Shell {
    /// Start the shell's event loop and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(auth: Arc<dyn AuthProvider>, resolver: IdentityResolver) -> ShellHandle {
        let (state_tx, state_rx) = watch::channel(ShellSnapshot::initial());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        // Subscribe before the initial query so no change falls in between.
        let events = auth.subscribe();

        let shell = Shell {
            auth,
            resolver,
            state_tx,
            completions_tx,
            session_checked: false,
            session: None,
            resolution: ResolutionState::Idle,
            generation: 0,
        };
        tokio::spawn(shell.run(events, command_rx, completions_rx));

        ShellHandle {
            commands: command_tx,
            state: state_rx,
        }
    }

    async fn run(
        mut self,
        mut events: broadcast::Receiver<AuthEvent>,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        let initial = self.auth.current_session().await;
        self.on_auth_event(AuthEvent::new(AuthEventKind::InitialSession, initial));

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => self.on_auth_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth events lagged, resynchronizing");
                        let current = self.auth.current_session().await;
                        self.on_auth_event(AuthEvent::new(AuthEventKind::InitialSession, current));
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("Auth provider closed, unmounting shell");
                        break;
                    }
                },
                command = commands.recv() => match command {
                    Some(Command::Retry) => self.retry(),
                    Some(Command::SignOut(reply)) => self.sign_out(reply),
                    Some(Command::Shutdown) | None => break,
                },
                Some(done) = completions.recv() => self.on_completion(done),
            }
        }

        tracing::debug!(generation = self.generation, "Shell stopped");
    }

    fn on_auth_event(&mut self, event: AuthEvent) {
        let Some(session) = event.session else {
            self.clear();
            return;
        };

        let same_subject = self
            .session
            .as_ref()
            .is_some_and(|current| current.user_id == session.user_id);

        tracing::debug!(
            kind = ?event.kind,
            user_id = %session.user_id,
            same_subject,
            "Auth event"
        );

        self.session_checked = true;
        self.session = Some(session);
        if same_subject {
            self.publish();
        } else {
            self.start_resolution();
        }
    }

    /// Drop the session and everything resolved for it.
    fn clear(&mut self) -> Option<Session> {
        let previous = self.session.take();
        if let Some(previous) = &previous {
            tracing::info!(user_id = %previous.user_id, "Signed out, discarding profile");
        }
        // Bumping the generation orphans any in-flight resolution.
        self.generation += 1;
        self.session_checked = true;
        self.resolution = ResolutionState::Idle;
        self.publish();
        previous
    }

    fn retry(&mut self) {
        if self.session.is_none() {
            tracing::warn!(
                error = %ResolveError::NotAuthenticated,
                "Retry requested without a session"
            );
            return;
        }
        if !matches!(self.resolution, ResolutionState::Failed(_)) {
            tracing::debug!(generation = self.generation, "Retry ignored, no failed resolution");
            return;
        }
        self.start_resolution();
    }

    fn sign_out(&mut self, reply: oneshot::Sender<()>) {
        let previous = self.clear();

        // Only the session cleared here is ended; a newer sign-in survives.
        let auth = self.auth.clone();
        tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = auth.end_session(&previous.id).await {
                    tracing::warn!(error = %e, "Auth provider sign-out failed");
                }
            }
            let _ = reply.send(());
        });
    }

    fn start_resolution(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };

        self.generation += 1;
        let generation = self.generation;
        self.resolution = ResolutionState::Resolving;
        self.publish();

        tracing::info!(user_id = %session.user_id, generation, "Resolving profile");

        let resolver = self.resolver.clone();
        let done = self.completions_tx.clone();
        tokio::spawn(async move {
            let user_id = session.user_id.clone();
            // Inner task so a panic surfaces as a failure instead of a
            // resolution that never completes.
            let result = match tokio::spawn(async move { resolver.resolve(&session).await }).await
            {
                Ok(result) => result,
                Err(e) => Err(ResolveError::Unexpected(e.to_string())),
            };

            let completion = Completion {
                generation,
                user_id,
                result,
            };
            if done.send(completion).is_err() {
                tracing::debug!(generation, "Shell gone before resolution finished");
            }
        });
    }

    fn on_completion(&mut self, done: Completion) {
        let current_subject = self.session.as_ref().map(|s| s.user_id.as_str());
        if done.generation != self.generation || current_subject != Some(done.user_id.as_str()) {
            tracing::debug!(
                user_id = %done.user_id,
                generation = done.generation,
                latest = self.generation,
                "Discarding stale resolution"
            );
            return;
        }

        self.resolution = match done.result {
            Ok(profile) => {
                tracing::info!(
                    user_id = %profile.id,
                    role = ?profile.role,
                    generation = done.generation,
                    "Profile ready"
                );
                ResolutionState::Ready(profile)
            }
            Err(e) => {
                tracing::error!(
                    user_id = %done.user_id,
                    generation = done.generation,
                    error = %e,
                    "Profile resolution failed"
                );
                ResolutionState::Failed(e)
            }
        };
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(ShellSnapshot {
            session_checked: self.session_checked,
            session: self.session.clone(),
            resolution: self.resolution.clone(),
            generation: self.generation,
        });
    }
}

/// Cloneable handle to a mounted shell.
#[derive(Clone)]
pub struct ShellHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ShellSnapshot>,
}

impl ShellHandle {
    pub fn snapshot(&self) -> ShellSnapshot {
        self.state.borrow().clone()
    }

    /// The view for the latest published state.
    pub fn view(&self) -> View {
        route(&self.state.borrow())
    }

    /// The Ready profile of the current session, if any.
    pub fn profile(&self) -> Option<Profile> {
        self.state.borrow().current_profile().cloned()
    }

    /// Re-run a failed resolution for the current session.
    pub async fn retry(&self) -> Result<(), AppError> {
        self.send(Command::Retry).await
    }

    /// Clear local state and end the provider session.
    ///
    /// Returns after the provider has ended the session that was cleared.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        let (reply, done) = oneshot::channel();
        self.send(Command::SignOut(reply)).await?;
        done.await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("sign-out did not complete")))
    }

    /// Wait until the routed view satisfies `pred` and return it.
    ///
    /// Returns `None` if the shell stops first.
    pub async fn wait_for_view(&mut self, mut pred: impl FnMut(&View) -> bool) -> Option<View> {
        let snapshot = self
            .wait_for_snapshot(|snapshot| pred(&route(snapshot)))
            .await?;
        Some(route(&snapshot))
    }

    /// Wait until the published snapshot satisfies `pred` and return it.
    pub async fn wait_for_snapshot(
        &mut self,
        pred: impl FnMut(&ShellSnapshot) -> bool,
    ) -> Option<ShellSnapshot> {
        let snapshot = self.state.wait_for(pred).await.ok()?;
        Some(snapshot.clone())
    }

    /// Stop the event loop and wait for it to exit.
    pub async fn unmount(self) {
        let mut state = self.state;
        if self.commands.send(Command::Shutdown).await.is_ok() {
            while state.changed().await.is_ok() {}
        }
    }

    async fn send(&self, command: Command) -> Result<(), AppError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("shell is not mounted")))
    }
}
