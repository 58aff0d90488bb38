// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Record store layer.
//!
//! The resolver only needs three operations on the `profiles` collection,
//! captured by [`ProfileStore`]. Firestore backs it in production; the
//! in-memory store is used for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryProfileStore;

use crate::error::AppError;
use crate::models::ProfileRow;
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const PROFILES: &str = "profiles";
}

/// Access to persisted profile records, keyed by auth subject id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Point lookup. `Ok(None)` means the record does not exist.
    async fn get_profile(&self, id: &str) -> Result<Option<ProfileRow>, AppError>;

    /// Insert a new record and return it as stored. Fails if a record with
    /// the same id already exists.
    async fn insert_profile(&self, row: &ProfileRow) -> Result<ProfileRow, AppError>;

    /// Overwrite an existing record by primary key.
    async fn update_profile(&self, row: &ProfileRow) -> Result<(), AppError>;
}
