// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - identity resolution and the auth collaborator.

pub mod resolver;
pub mod session_hub;
pub mod session_token;

pub use resolver::{IdentityPolicy, IdentityResolver};
pub use session_hub::{AuthProvider, SessionHub};
pub use session_token::{create_access_token, verify_access_token};
