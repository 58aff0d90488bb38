//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. Anything with a sensible local default
//! falls back to it; only the token secret is required.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which record store backs the `profiles` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store, for local development without GCP.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("PROFILE_STORE", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Record store ---
    /// GCP project ID
    pub gcp_project_id: String,
    pub profile_store: StoreBackend,
    /// Upper bound on a single profile read
    pub profile_read_timeout: Duration,

    // --- Identity policy ---
    /// Email that is always granted the admin role
    pub bootstrap_admin_email: String,
    /// Name given to new profiles without a signup name
    pub default_profile_name: String,
    /// Name given to the bootstrap admin's profile
    pub admin_profile_name: String,

    // --- Secrets ---
    /// HS256 secret used by the auth provider to sign access tokens (raw bytes)
    pub auth_jwt_secret: Vec<u8>,
}

impl Config {
    pub const DEFAULT_BOOTSTRAP_ADMIN_EMAIL: &'static str = "haj@svl.dk";
    pub const DEFAULT_PROFILE_NAME: &'static str = "Standard Bruger";
    pub const DEFAULT_ADMIN_PROFILE_NAME: &'static str = "Administrator";
    const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_var("PORT", 8080)?,

            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            profile_store: parse_var("PROFILE_STORE", StoreBackend::Firestore)?,
            profile_read_timeout: Duration::from_secs(parse_var(
                "PROFILE_READ_TIMEOUT_SECS",
                Self::DEFAULT_READ_TIMEOUT_SECS,
            )?),

            bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| Self::DEFAULT_BOOTSTRAP_ADMIN_EMAIL.to_string()),
            default_profile_name: env::var("DEFAULT_PROFILE_NAME")
                .unwrap_or_else(|_| Self::DEFAULT_PROFILE_NAME.to_string()),
            admin_profile_name: env::var("ADMIN_PROFILE_NAME")
                .unwrap_or_else(|_| Self::DEFAULT_ADMIN_PROFILE_NAME.to_string()),

            auth_jwt_secret: env::var("AUTH_JWT_SECRET")
                .map_err(|_| ConfigError::Missing("AUTH_JWT_SECRET"))?
                .trim()
                .as_bytes()
                .to_vec(),
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            profile_store: StoreBackend::Memory,
            profile_read_timeout: Duration::from_secs(Self::DEFAULT_READ_TIMEOUT_SECS),
            bootstrap_admin_email: Self::DEFAULT_BOOTSTRAP_ADMIN_EMAIL.to_string(),
            default_profile_name: Self::DEFAULT_PROFILE_NAME.to_string(),
            admin_profile_name: Self::DEFAULT_ADMIN_PROFILE_NAME.to_string(),
            auth_jwt_secret: b"test_auth_secret_32_bytes_minimum!".to_vec(),
        }
    }
}

/// Read and parse an optional variable, using `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
