// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile model: the persisted row and its normalized application view.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Application role. Determines which dashboard a profile is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    /// Legacy stored spellings that mean [`Role::Employee`].
    const EMPLOYEE_SYNONYMS: [&'static str; 3] = ["employee", "medarbejder", "bruger"];

    /// Normalize a stored role string.
    ///
    /// Returns `None` for anything that is not a known role or synonym.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        if raw == "admin" {
            Some(Role::Admin)
        } else if Self::EMPLOYEE_SYNONYMS.contains(&raw.as_str()) {
            Some(Role::Employee)
        } else {
            None
        }
    }

    /// Canonical spelling written to the record store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile record as stored in the `profiles` collection.
///
/// `role` is kept as the raw stored string; use [`Profile::from_row`] to
/// normalize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// Auth subject id (also used as document ID)
    pub id: String,
    pub email: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: String,
    /// Billing rate used by the wage panels
    #[serde(default)]
    pub hourly_rate: Option<f64>,
}

/// Normalized profile handed to the router and the panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub full_name: Option<String>,
    /// `None` when the stored role string is not recognized.
    pub role: Option<Role>,
    pub hourly_rate: Option<f64>,
}

impl Profile {
    /// Build the application view of a stored row.
    pub fn from_row(row: ProfileRow) -> Self {
        let role = Role::from_stored(&row.role);
        if role.is_none() {
            tracing::warn!(user_id = %row.id, role = %row.role, "Unrecognized stored role");
        }
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            full_name: row.full_name,
            role,
            hourly_rate: row.hourly_rate,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}
