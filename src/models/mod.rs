// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod profile;
pub mod session;

pub use profile::{Profile, ProfileRow, Role};
pub use session::{AuthEvent, AuthEventKind, Session};
