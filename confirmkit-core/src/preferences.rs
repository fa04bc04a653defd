//! User preferences consumed by the confirmers.
//!
//! Persistence lives outside this crate; controllers only read `theme` and
//! `behavior` from whatever store the application provides.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Whether signing waits for an explicit click.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ConfirmBehavior {
    /// The user must press the confirm button.
    #[default]
    RequireClick,
    /// The flow proceeds without a click once the UI is shown.
    AutoProceed,
}

/// Color theme of the confirmer UI.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum Theme {
    /// Dark theme.
    #[default]
    Dark,
    /// Light theme.
    Light,
}

/// Preferences stored per account. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct UserPreferences {
    /// Confirmation behavior.
    pub behavior: ConfirmBehavior,
    /// UI theme.
    pub theme: Theme,
}

/// Read/update access to per-account preferences.
pub trait PreferenceStore: Send + Sync {
    /// Preferences of `account_id`, if any were stored.
    fn preferences(&self, account_id: &str) -> Option<UserPreferences>;

    /// Replaces the preferences of `account_id`.
    fn update(&self, account_id: &str, preferences: UserPreferences);

    /// Stored preferences or the defaults.
    fn preferences_or_default(&self, account_id: &str) -> UserPreferences {
        self.preferences(account_id).unwrap_or_default()
    }
}

/// Process-local preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, UserPreferences>>,
}

impl MemoryPreferenceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn preferences(&self, account_id: &str) -> Option<UserPreferences> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account_id)
            .copied()
    }

    fn update(&self, account_id: &str, preferences: UserPreferences) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account_id.to_string(), preferences);
    }
}
