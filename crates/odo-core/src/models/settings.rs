//! Sync settings model

use serde::{Deserialize, Serialize};

/// Default interval between automatic sync runs
pub const DEFAULT_AUTO_SYNC_INTERVAL_SECS: u64 = 30;

/// Persisted sync preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Whether the recurring auto-sync timer is enabled
    pub auto_sync_enabled: bool,
    /// Seconds between automatic sync runs
    pub auto_sync_interval_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            auto_sync_enabled: false,
            auto_sync_interval_secs: DEFAULT_AUTO_SYNC_INTERVAL_SECS,
        }
    }
}

/// Partial update for [`SyncSettings`].
///
/// Each recognized field is enumerated explicitly; `None` leaves the current
/// value untouched. This replaces open-ended partial-update payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettingsUpdate {
    pub auto_sync_enabled: Option<bool>,
    pub auto_sync_interval_secs: Option<u64>,
}

impl SyncSettingsUpdate {
    /// Apply this update on top of existing settings
    #[must_use]
    pub fn apply(&self, mut settings: SyncSettings) -> SyncSettings {
        if let Some(enabled) = self.auto_sync_enabled {
            settings.auto_sync_enabled = enabled;
        }
        if let Some(interval) = self.auto_sync_interval_secs {
            settings.auto_sync_interval_secs = interval.max(1);
        }
        settings
    }
}
