//! Realtime status reporter
//!
//! Cheap, frequently-polled view of connectivity and aggregate counts for
//! display. Reading it never performs network or storage I/O; the cached
//! values are maintained by the sync coordinator (connectivity after each
//! remote call, counts after each merge) or by an explicit `refresh`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::db::AggregateCounts;
use crate::error::{Error, Result};
use crate::services::StoreService;

/// Snapshot of connectivity and aggregate counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RealtimeStatus {
    /// Last-known connectivity to the backend
    pub connected: bool,
    /// Number of employee profiles in the local store
    pub employees: usize,
    /// Number of active mileage entries
    pub mileage_entries: usize,
    /// Number of active receipts
    pub receipts: usize,
    /// When the counts were last recomputed (Unix ms)
    pub last_refreshed: Option<i64>,
}

#[derive(Default)]
struct ReporterInner {
    connected: AtomicBool,
    counts: Mutex<(AggregateCounts, Option<i64>)>,
}

/// Maintains the cached status served by [`RealtimeStatus`]
#[derive(Clone, Default)]
pub struct StatusReporter {
    inner: Arc<ReporterInner>,
}

impl StatusReporter {
    /// Create a reporter with no cached data and connectivity unknown (false)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of the most recent remote call
    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::SeqCst);
    }

    /// Last-known connectivity
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Recompute aggregate counts from local data only
    pub fn refresh(&self, store: &StoreService) -> Result<()> {
        let counts = store.counts()?;
        let now = chrono::Utc::now().timestamp_millis();
        let mut cached = self
            .inner
            .counts
            .lock()
            .map_err(|_| Error::Database("status cache mutex poisoned".to_string()))?;
        *cached = (counts, Some(now));
        Ok(())
    }

    /// Current snapshot; synchronous and side-effect-free
    #[must_use]
    pub fn get_sync_status(&self) -> RealtimeStatus {
        let (counts, last_refreshed) = self
            .inner
            .counts
            .lock()
            .map_or((AggregateCounts::default(), None), |cached| *cached);

        RealtimeStatus {
            connected: self.is_connected(),
            employees: counts.employees,
            mileage_entries: counts.mileage_entries,
            receipts: counts.receipts,
            last_refreshed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeProfile, MileageEntry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_reporter_defaults() {
        let reporter = StatusReporter::new();
        let status = reporter.get_sync_status();
        assert_eq!(status, RealtimeStatus::default());
    }

    #[test]
    fn test_refresh_caches_counts() {
        let store = StoreService::open_in_memory().unwrap();
        let profile = EmployeeProfile::new("Sam", "sam@example.com");
        store.save_employee(&profile).unwrap();
        store
            .add_mileage_entry(&MileageEntry::new(profile.id, "2024-03-01".parse().unwrap(), 7.5))
            .unwrap();

        let reporter = StatusReporter::new();
        reporter.refresh(&store).unwrap();
        reporter.set_connected(true);

        let status = reporter.get_sync_status();
        assert!(status.connected);
        assert_eq!(status.employees, 1);
        assert_eq!(status.mileage_entries, 1);
        assert_eq!(status.receipts, 0);
        assert!(status.last_refreshed.is_some());
    }

    #[test]
    fn test_get_sync_status_does_not_touch_store() {
        // The snapshot must stay stale until an explicit refresh
        let store = StoreService::open_in_memory().unwrap();
        let reporter = StatusReporter::new();
        reporter.refresh(&store).unwrap();

        store
            .save_employee(&EmployeeProfile::new("Lee", "lee@example.com"))
            .unwrap();

        assert_eq!(reporter.get_sync_status().employees, 0);
    }
}
