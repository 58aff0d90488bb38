// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token decoding.
//!
//! The auth provider issues HS256 JWTs whose claims carry the subject,
//! email and signup metadata. Decoding one yields a [`Session`] value.

use crate::error::AppError;
use crate::models::Session;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Audience the provider stamps on user tokens.
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (auth user id)
    pub sub: String,
    #[serde(default)]
    pub email: String,
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    fn into_session(self) -> Session {
        let id = self
            .session_id
            .unwrap_or_else(|| format!("{}:{}", self.sub, self.iat));
        Session {
            id,
            user_id: self.sub,
            email: self.email,
            user_metadata: self.user_metadata,
        }
    }
}

/// Verify an access token and extract its session.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<Session, AppError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        AppError::InvalidToken
    })?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AppError::InvalidToken);
    }

    Ok(token_data.claims.into_session())
}

/// Mint an access token for a session (local development and tests).
pub fn create_access_token(
    session: &Session,
    secret: &[u8],
    ttl_secs: usize,
) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session.user_id.clone(),
        email: session.email.clone(),
        aud: TOKEN_AUDIENCE.to_string(),
        iat: now,
        exp: now + ttl_secs,
        session_id: Some(session.id.clone()),
        user_metadata: session.user_metadata.clone(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}
