// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process [`ProfileStore`] backed by a `DashMap`.
//!
//! Supports injected read latency (per subject id) and read/write failures
//! so that resolution ordering and error paths can be exercised without a
//! backend.

use crate::db::ProfileStore;
use crate::error::AppError;
use crate::models::ProfileRow;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct MemoryProfileStore {
    rows: DashMap<String, ProfileRow>,
    read_delays: DashMap<String, Duration>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    inserts: AtomicUsize,
    updates: AtomicUsize,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing counters and failure injection.
    pub fn seed(&self, row: ProfileRow) {
        self.rows.insert(row.id.clone(), row);
    }

    /// Current stored record, bypassing counters and failure injection.
    pub fn row(&self, id: &str) -> Option<ProfileRow> {
        self.rows.get(id).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Delay every read for `id` by `delay` before it completes.
    pub fn set_read_delay(&self, id: &str, delay: Duration) {
        self.read_delays.insert(id.to_string(), delay);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of insert attempts, including failed ones.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, id: &str) -> Result<Option<ProfileRow>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        // Copy out before awaiting so no map guard is held across the sleep.
        let delay = self.read_delays.get(id).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("connection refused".to_string()));
        }
        Ok(self.row(id))
    }

    async fn insert_profile(&self, row: &ProfileRow) -> Result<ProfileRow, AppError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;

        match self.rows.entry(row.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Database(format!(
                "profile {} already exists",
                row.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                Ok(row.clone())
            }
        }
    }

    async fn update_profile(&self, row: &ProfileRow) -> Result<(), AppError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;

        match self.rows.get_mut(&row.id) {
            Some(mut existing) => {
                *existing = row.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Profile {}", row.id))),
        }
    }
}
