// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-to-profile resolution.
//!
//! Turns an authenticated [`Session`] into a [`Profile`]:
//! - Looks up the stored record by subject id
//! - Bounds every store call by the read timeout
//! - Provisions a record on first sign-in, falling back to the synthesized
//!   value if the insert fails
//! - Forces the bootstrap administrator's stored role back to `admin`
//!
//! The resolver holds no per-session state; ordering between concurrent
//! resolutions is the shell's job.

use crate::config::Config;
use crate::db::ProfileStore;
use crate::error::{AppError, ResolveError};
use crate::models::{Profile, ProfileRow, Role, Session};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Defaults and overrides applied while resolving.
#[derive(Debug, Clone)]
pub struct IdentityPolicy {
    pub bootstrap_admin_email: String,
    pub default_name: String,
    pub admin_name: String,
    pub read_timeout: Duration,
}

impl IdentityPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bootstrap_admin_email: config.bootstrap_admin_email.clone(),
            default_name: config.default_profile_name.clone(),
            admin_name: config.admin_profile_name.clone(),
            read_timeout: config.profile_read_timeout,
        }
    }

    pub fn is_bootstrap_admin(&self, email: &str) -> bool {
        !self.bootstrap_admin_email.is_empty()
            && email.trim().eq_ignore_ascii_case(&self.bootstrap_admin_email)
    }

    /// Record to persist for a subject that has no profile yet.
    pub fn synthesize(&self, session: &Session) -> ProfileRow {
        let (name, full_name, role) = if self.is_bootstrap_admin(&session.email) {
            (
                self.admin_name.clone(),
                Some(self.admin_name.clone()),
                Role::Admin,
            )
        } else {
            let signup_name = session.signup_name().map(str::to_string);
            (
                signup_name
                    .clone()
                    .unwrap_or_else(|| self.default_name.clone()),
                signup_name,
                Role::Employee,
            )
        };

        ProfileRow {
            id: session.user_id.clone(),
            email: session.email.clone(),
            name,
            full_name,
            role: role.as_str().to_string(),
            hourly_rate: None,
        }
    }
}

/// Resolves sessions against the profile store.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn ProfileStore>,
    policy: IdentityPolicy,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn ProfileStore>, policy: IdentityPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &IdentityPolicy {
        &self.policy
    }

    /// Resolve a session into a profile.
    ///
    /// Safe to call repeatedly for the same session: once the record exists
    /// only the lookup runs.
    pub async fn resolve(&self, session: &Session) -> Result<Profile, ResolveError> {
        let user_id = session.user_id.as_str();

        let lookup = tokio::time::timeout(self.policy.read_timeout, self.store.get_profile(user_id));
        let found = match lookup.await {
            Err(_) => {
                tracing::error!(
                    user_id,
                    timeout_secs = self.policy.read_timeout.as_secs(),
                    "Profile read timed out"
                );
                return Err(ResolveError::Timeout);
            }
            Ok(Err(e)) => {
                tracing::error!(user_id, error = %e, "Profile read failed");
                return Err(ResolveError::ReadFailed(e.to_string()));
            }
            Ok(Ok(found)) => found,
        };

        let row = match found {
            Some(row) if row.id != user_id => {
                return Err(ResolveError::Unexpected(format!(
                    "stored profile id {} does not match subject {}",
                    row.id, user_id
                )));
            }
            Some(row) => self.enforce_admin_role(session, row).await,
            None => self.provision(session).await,
        };

        Ok(Profile::from_row(row))
    }

    /// Correct a stored non-admin role for the bootstrap administrator.
    async fn enforce_admin_role(&self, session: &Session, row: ProfileRow) -> ProfileRow {
        if !self.policy.is_bootstrap_admin(&session.email)
            || Role::from_stored(&row.role) == Some(Role::Admin)
        {
            return row;
        }

        tracing::info!(
            user_id = %row.id,
            stored_role = %row.role,
            "Correcting bootstrap admin role"
        );

        let corrected = ProfileRow {
            role: Role::Admin.as_str().to_string(),
            ..row
        };
        if let Err(e) = self.bounded_write(self.store.update_profile(&corrected)).await {
            // The corrected value is still used; the next resolution retries.
            tracing::warn!(
                user_id = %corrected.id,
                error = %e,
                "Admin role correction not persisted"
            );
        }
        corrected
    }

    /// Create the record for a first sign-in.
    async fn provision(&self, session: &Session) -> ProfileRow {
        let row = self.policy.synthesize(session);

        match self.bounded_write(self.store.insert_profile(&row)).await {
            Ok(inserted) => {
                tracing::info!(
                    user_id = %inserted.id,
                    role = %inserted.role,
                    "Profile created"
                );
                inserted
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %row.id,
                    error = %e,
                    "Profile insert failed, continuing with unsaved profile"
                );
                row
            }
        }
    }

    /// Run a store write under the read timeout. Both a store error and an
    /// elapsed timeout become `WriteFailed`.
    async fn bounded_write<T>(
        &self,
        write: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, ResolveError> {
        match tokio::time::timeout(self.policy.read_timeout, write).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ResolveError::WriteFailed(e.to_string())),
            Err(_) => Err(ResolveError::WriteFailed(format!(
                "no response after {}s",
                self.policy.read_timeout.as_secs()
            ))),
        }
    }
}
