//! Sync coordinator
//!
//! Single authority for when and how local changes reach the remote endpoint
//! and vice versa. Owns the in-flight guard, the auto-sync timer, and the
//! status channel; remote and store failures are translated into
//! [`SyncResult`] values at this boundary.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::models::{EmployeeId, SyncRecord, SyncSettingsUpdate};
use crate::remote::{PushBatch, RemoteClient};
use crate::services::StoreService;
use crate::sync::StatusReporter;

/// Default deadline for a single sync attempt
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 30;

/// Immutable read of coordinator state at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncStatusSnapshot {
    /// Pending local mutations awaiting transmission
    pub queue_len: usize,
    /// True while a sync operation is in flight
    pub is_processing: bool,
    /// Whether the recurring auto-sync timer is enabled
    pub auto_sync_enabled: bool,
    /// Last fully successful sync (Unix ms)
    pub last_sync_time: Option<i64>,
    /// Seconds until the next scheduled auto-sync tick
    pub next_auto_sync_in_secs: Option<u64>,
}

/// Outcome of one push or pull attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncResult {
    /// True when the attempt completed without error
    pub success: bool,
    /// Human-readable error description for failed attempts
    pub error: Option<String>,
    /// Records transmitted to the backend
    pub pushed: usize,
    /// Records received from the backend
    pub pulled: usize,
}

impl SyncResult {
    fn pushed(count: usize) -> Self {
        Self {
            success: true,
            pushed: count,
            ..Self::default()
        }
    }

    fn pulled(count: usize) -> Self {
        Self {
            success: true,
            pulled: count,
            ..Self::default()
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Outcome of a bidirectional sync; the halves are reported distinctly so a
/// caller can tell the user exactly which one failed
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    pub push: SyncResult,
    pub pull: SyncResult,
}

impl SyncReport {
    /// True only when both halves succeeded
    #[must_use]
    pub const fn success(&self) -> bool {
        self.push.success && self.pull.success
    }
}

struct AutoSyncState {
    enabled: bool,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
    next_tick_at: Option<i64>,
}

struct Inner {
    store: StoreService,
    remote: Arc<dyn RemoteClient>,
    employee_id: EmployeeId,
    reporter: StatusReporter,
    /// In-flight guard: at most one sync operation system-wide
    op_gate: tokio::sync::Mutex<()>,
    is_processing: AtomicBool,
    timeout: Duration,
    auto_sync: StdMutex<AutoSyncState>,
    status_tx: watch::Sender<SyncStatusSnapshot>,
}

/// Coordinates local-to-remote and remote-to-local data transfer for one
/// employee's store.
///
/// Cheap to clone; all clones share the same guard and timer. Must be
/// created within a Tokio runtime so the auto-sync timer can be spawned.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

/// Clears the processing flag and publishes a snapshot when an operation
/// ends, including early returns on store failure.
struct FlightGuard<'a> {
    coordinator: &'a SyncCoordinator,
    _permit: tokio::sync::MutexGuard<'a, ()>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.coordinator
            .inner
            .is_processing
            .store(false, Ordering::SeqCst);
        self.coordinator.publish();
    }
}

impl SyncCoordinator {
    /// Create a coordinator with the default sync timeout
    pub fn new(
        store: StoreService,
        remote: Arc<dyn RemoteClient>,
        employee_id: EmployeeId,
    ) -> Result<Self> {
        Self::with_sync_timeout(
            store,
            remote,
            employee_id,
            Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
        )
    }

    /// Create a coordinator with an explicit sync timeout
    pub fn with_sync_timeout(
        store: StoreService,
        remote: Arc<dyn RemoteClient>,
        employee_id: EmployeeId,
        timeout: Duration,
    ) -> Result<Self> {
        let settings = store.load_sync_settings()?;
        let (status_tx, _) = watch::channel(SyncStatusSnapshot::default());

        let coordinator = Self {
            inner: Arc::new(Inner {
                store,
                remote,
                employee_id,
                reporter: StatusReporter::new(),
                op_gate: tokio::sync::Mutex::new(()),
                is_processing: AtomicBool::new(false),
                timeout,
                auto_sync: StdMutex::new(AutoSyncState {
                    enabled: false,
                    interval: Duration::from_secs(settings.auto_sync_interval_secs),
                    handle: None,
                    next_tick_at: None,
                }),
                status_tx,
            }),
        };

        if settings.auto_sync_enabled {
            coordinator.start_auto_sync(Duration::from_secs(settings.auto_sync_interval_secs))?;
        }
        coordinator.inner.reporter.refresh(&coordinator.inner.store)?;
        coordinator.publish();
        Ok(coordinator)
    }

    /// The realtime status reporter fed by this coordinator
    #[must_use]
    pub fn reporter(&self) -> &StatusReporter {
        &self.inner.reporter
    }

    /// Subscribe to status snapshots; the receiver sees every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncStatusSnapshot> {
        self.inner.status_tx.subscribe()
    }

    /// Current status snapshot; synchronous, no network call
    #[must_use]
    pub fn get_sync_queue_status(&self) -> SyncStatusSnapshot {
        self.snapshot()
    }

    /// Push the pending queue to the backend as one all-or-nothing batch.
    ///
    /// On success the transmitted queue items are cleared; on failure the
    /// queue is left untouched for retry. Returns `Err` only for local
    /// persistence failures or when a sync is already in flight.
    pub async fn sync_to_backend(&self) -> Result<SyncResult> {
        let _flight = self.begin()?;
        self.push_pending().await
    }

    /// Pull remote changes and merge them into the local store.
    ///
    /// Merge is last-write-wins per record; a failed pull discards nothing.
    pub async fn sync_from_backend(&self) -> Result<SyncResult> {
        let _flight = self.begin()?;
        self.pull_remote().await
    }

    /// Push local edits first, then pull remote state.
    ///
    /// The pull proceeds even when the push fails, but the report keeps the
    /// two outcomes distinct. The push completes before the pull starts, so
    /// the backend holds the client's outstanding edits before any server
    /// state is merged back.
    pub async fn bidirectional_sync(&self) -> Result<SyncReport> {
        let _flight = self.begin()?;

        let push = self.push_pending().await?;
        if !push.success {
            tracing::warn!(
                error = push.error.as_deref().unwrap_or("unknown"),
                "Push failed; proceeding with pull"
            );
        }
        let pull = self.pull_remote().await?;

        Ok(SyncReport { push, pull })
    }

    /// Drain the entire queue regardless of the auto-sync setting.
    ///
    /// Returns `Ok(true)` only if the queue fully drained with no errors.
    pub async fn force_sync(&self) -> Result<bool> {
        let _flight = self.begin()?;
        let result = self.push_pending().await?;
        Ok(result.success && self.inner.store.queue_len()? == 0)
    }

    /// Toggle the recurring auto-sync timer; takes effect immediately
    pub fn set_auto_sync_enabled(&self, enabled: bool) -> Result<()> {
        let settings = self.inner.store.update_sync_settings(&SyncSettingsUpdate {
            auto_sync_enabled: Some(enabled),
            auto_sync_interval_secs: None,
        })?;

        if enabled {
            self.start_auto_sync(Duration::from_secs(settings.auto_sync_interval_secs))?;
        } else {
            self.stop_auto_sync()?;
        }
        self.publish();
        Ok(())
    }

    fn begin(&self) -> Result<FlightGuard<'_>> {
        let permit = self
            .inner
            .op_gate
            .try_lock()
            .map_err(|_| Error::SyncInProgress)?;
        self.inner.is_processing.store(true, Ordering::SeqCst);
        self.publish();
        Ok(FlightGuard {
            coordinator: self,
            _permit: permit,
        })
    }

    /// Wrap a remote call in the configured deadline. A timed-out attempt is
    /// a failure like any other; the guard is released normally.
    async fn remote_call<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.inner.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::SyncTimeout(self.inner.timeout.as_secs())),
        }
    }

    async fn push_pending(&self) -> Result<SyncResult> {
        let pending = self.inner.store.pending_queue()?;
        if pending.is_empty() {
            tracing::debug!("Nothing queued; push skipped");
            return Ok(SyncResult::pushed(0));
        }

        let mut records: Vec<SyncRecord> = Vec::with_capacity(pending.len());
        for item in &pending {
            match self.inner.store.get_record(item.record_type, &item.record_id)? {
                Some(record) => records.push(record),
                // Stale queue row with no backing record; cleared with the
                // batch on success.
                None => tracing::warn!(
                    record_id = %item.record_id,
                    "Queued record no longer exists"
                ),
            }
        }

        let batch = PushBatch::from_records(&records);
        match self.remote_call(self.inner.remote.push_batch(&batch)).await {
            Ok(ack) => {
                self.inner.store.remove_queue_items(&pending)?;
                let now = chrono::Utc::now().timestamp_millis();
                self.inner
                    .store
                    .set_last_sync_time(self.inner.employee_id, now)?;
                self.inner.reporter.set_connected(true);
                tracing::info!(pushed = records.len(), accepted = ack.accepted, "Push complete");
                Ok(SyncResult::pushed(records.len()))
            }
            Err(error) => {
                self.inner.reporter.set_connected(false);
                tracing::warn!(%error, queued = pending.len(), "Push failed; queue retained");
                Ok(SyncResult::failed(error.to_string()))
            }
        }
    }

    async fn pull_remote(&self) -> Result<SyncResult> {
        let since = self.inner.store.last_pull_at(self.inner.employee_id)?;
        let pull = self
            .remote_call(self.inner.remote.pull_changes(self.inner.employee_id, since));

        match pull.await {
            Ok(response) => {
                let outcome = self.inner.store.apply_remote(&response.records)?;
                self.inner
                    .store
                    .set_last_pull_at(self.inner.employee_id, response.server_time)?;
                self.inner.reporter.set_connected(true);
                self.inner.reporter.refresh(&self.inner.store)?;
                tracing::info!(
                    received = response.records.len(),
                    applied = outcome.applied,
                    skipped = outcome.skipped,
                    "Pull complete"
                );
                Ok(SyncResult::pulled(response.records.len()))
            }
            Err(error) => {
                self.inner.reporter.set_connected(false);
                tracing::warn!(%error, "Pull failed; local data unchanged");
                Ok(SyncResult::failed(error.to_string()))
            }
        }
    }

    fn start_auto_sync(&self, interval: Duration) -> Result<()> {
        let mut auto = self
            .inner
            .auto_sync
            .lock()
            .map_err(|_| Error::Database("auto-sync mutex poisoned".to_string()))?;

        if let Some(handle) = auto.handle.take() {
            handle.abort();
        }
        auto.enabled = true;
        auto.interval = interval;
        auto.next_tick_at =
            Some(chrono::Utc::now().timestamp_millis() + interval_ms(interval));
        auto.handle = Some(self.spawn_auto_sync(interval));
        Ok(())
    }

    fn stop_auto_sync(&self) -> Result<()> {
        let mut auto = self
            .inner
            .auto_sync
            .lock()
            .map_err(|_| Error::Database("auto-sync mutex poisoned".to_string()))?;

        if let Some(handle) = auto.handle.take() {
            handle.abort();
        }
        auto.enabled = false;
        auto.next_tick_at = None;
        Ok(())
    }

    fn spawn_auto_sync(&self, interval: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so enabling
            // auto-sync does not fire a sync on the spot.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let coordinator = SyncCoordinator { inner };

                if let Ok(mut auto) = coordinator.inner.auto_sync.lock() {
                    auto.next_tick_at =
                        Some(chrono::Utc::now().timestamp_millis() + interval_ms(interval));
                }

                match coordinator.force_sync().await {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!("Auto-sync left items queued"),
                    // A manual sync is in flight; this tick is skipped, not
                    // queued behind it.
                    Err(Error::SyncInProgress) => {
                        tracing::debug!("Auto-sync tick skipped; sync already in flight");
                    }
                    Err(error) => tracing::warn!(%error, "Auto-sync failed"),
                }
            }
        })
    }

    fn snapshot(&self) -> SyncStatusSnapshot {
        let queue_len = self.inner.store.queue_len().unwrap_or(0);
        let last_sync_time = self
            .inner
            .store
            .last_sync_time(self.inner.employee_id)
            .ok()
            .flatten();

        let (auto_sync_enabled, next_auto_sync_in_secs) =
            self.inner.auto_sync.lock().map_or((false, None), |auto| {
                let remaining = auto.next_tick_at.map(|at| {
                    let now = chrono::Utc::now().timestamp_millis();
                    u64::try_from((at - now).max(0) / 1000).unwrap_or(0)
                });
                (auto.enabled, remaining)
            });

        SyncStatusSnapshot {
            queue_len,
            is_processing: self.inner.is_processing.load(Ordering::SeqCst),
            auto_sync_enabled,
            last_sync_time,
            next_auto_sync_in_secs,
        }
    }

    fn publish(&self) {
        self.inner.status_tx.send_replace(self.snapshot());
    }
}

fn interval_ms(interval: Duration) -> i64 {
    i64::try_from(interval.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{DailyDescription, EmployeeId, Receipt};
    use crate::remote::{PullResponse, PushAck};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Scripted remote endpoint: call log, failure injection, optional
    /// hold-until-released push for concurrency tests.
    #[derive(Default)]
    struct FakeRemote {
        calls: Mutex<Vec<&'static str>>,
        fail_push: Mutex<bool>,
        fail_pull: Mutex<bool>,
        pull_records: Mutex<Vec<SyncRecord>>,
        push_delay: Option<Duration>,
        push_entered: Arc<Notify>,
        push_release: Arc<Notify>,
        hold_push: bool,
    }

    impl FakeRemote {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn push_count(&self) -> usize {
            self.calls().iter().filter(|c| **c == "push").count()
        }

        fn set_fail_push(&self, fail: bool) {
            *self.fail_push.lock().unwrap() = fail;
        }

        fn set_pull_records(&self, records: Vec<SyncRecord>) {
            *self.pull_records.lock().unwrap() = records;
        }
    }

    #[async_trait]
    impl RemoteClient for FakeRemote {
        async fn push_batch(&self, batch: &PushBatch) -> crate::Result<PushAck> {
            self.calls.lock().unwrap().push("push");
            if self.hold_push {
                self.push_entered.notify_one();
                self.push_release.notified().await;
            }
            if let Some(delay) = self.push_delay {
                tokio::time::sleep(delay).await;
            }
            if *self.fail_push.lock().unwrap() {
                return Err(Error::Remote("connection reset".to_string()));
            }
            Ok(PushAck {
                accepted: batch.len(),
            })
        }

        async fn pull_changes(
            &self,
            _employee_id: EmployeeId,
            _since: Option<i64>,
        ) -> crate::Result<PullResponse> {
            self.calls.lock().unwrap().push("pull");
            if *self.fail_pull.lock().unwrap() {
                return Err(Error::Remote("gateway timeout".to_string()));
            }
            Ok(PullResponse {
                records: self.pull_records.lock().unwrap().clone(),
                server_time: chrono::Utc::now().timestamp_millis(),
            })
        }
    }

    fn setup(remote: Arc<FakeRemote>) -> (StoreService, SyncCoordinator, EmployeeId) {
        let store = StoreService::open_in_memory().unwrap();
        let employee = EmployeeId::new();
        let coordinator = SyncCoordinator::new(store.clone(), remote, employee).unwrap();
        (store, coordinator, employee)
    }

    fn queue_three_edits(store: &StoreService, employee: EmployeeId) {
        for day in ["2024-03-01", "2024-03-02", "2024-03-03"] {
            store
                .save_daily_description(employee, date(day), "Edits pending")
                .unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_push_success_clears_queue_and_sets_last_sync() {
        let remote = Arc::new(FakeRemote::default());
        let (store, coordinator, employee) = setup(Arc::clone(&remote));
        queue_three_edits(&store, employee);
        assert_eq!(store.queue_len().unwrap(), 3);

        let result = coordinator.sync_to_backend().await.unwrap();

        assert!(result.success);
        assert_eq!(result.pushed, 3);
        assert_eq!(store.queue_len().unwrap(), 0);

        let status = coordinator.get_sync_queue_status();
        assert_eq!(status.queue_len, 0);
        assert!(status.last_sync_time.is_some());
        assert!(!status.is_processing);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_push_failure_retains_queue() {
        let remote = Arc::new(FakeRemote::default());
        remote.set_fail_push(true);
        let (store, coordinator, employee) = setup(Arc::clone(&remote));
        queue_three_edits(&store, employee);

        let result = coordinator.sync_to_backend().await.unwrap();

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or("").contains("connection"));
        assert_eq!(store.queue_len().unwrap(), 3);
        assert!(coordinator.get_sync_queue_status().last_sync_time.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bidirectional_pushes_before_pulling() {
        let remote = Arc::new(FakeRemote::default());
        let (store, coordinator, employee) = setup(Arc::clone(&remote));
        store
            .save_daily_description(employee, date("2024-03-01"), "Ordered")
            .unwrap();

        let report = coordinator.bidirectional_sync().await.unwrap();

        assert!(report.success());
        assert_eq!(remote.calls(), vec!["push", "pull"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bidirectional_reports_halves_distinctly() {
        let remote = Arc::new(FakeRemote::default());
        remote.set_fail_push(true);
        let (store, coordinator, employee) = setup(Arc::clone(&remote));
        store
            .save_daily_description(employee, date("2024-03-01"), "Will fail to push")
            .unwrap();

        let report = coordinator.bidirectional_sync().await.unwrap();

        assert!(!report.push.success);
        assert!(report.pull.success);
        assert!(!report.success());
        // Pull still ran after the failed push
        assert_eq!(remote.calls(), vec!["push", "pull"]);
        // And the queue survived for retry
        assert_eq!(store.queue_len().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_second_caller_rejected_while_in_flight() {
        let remote = Arc::new(FakeRemote {
            hold_push: true,
            ..FakeRemote::default()
        });
        let (store, coordinator, employee) = setup(Arc::clone(&remote));
        store
            .save_daily_description(employee, date("2024-03-01"), "Busy")
            .unwrap();

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.force_sync().await })
        };
        remote.push_entered.notified().await;

        // A concurrent caller observes the in-flight state and is rejected;
        // an auto-sync tick takes the same path.
        assert!(coordinator.get_sync_queue_status().is_processing);
        let second = coordinator.force_sync().await;
        assert!(matches!(second, Err(Error::SyncInProgress)));

        remote.push_release.notify_one();
        assert!(first.await.unwrap().unwrap());
        assert_eq!(remote.push_count(), 1);
        assert!(!coordinator.get_sync_queue_status().is_processing);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_edit_during_push_stays_queued() {
        let remote = Arc::new(FakeRemote {
            hold_push: true,
            ..FakeRemote::default()
        });
        let (store, coordinator, employee) = setup(Arc::clone(&remote));
        let receipt = Receipt::new(employee, date("2024-03-01"), 3_000);
        store.add_receipt(&receipt).unwrap();

        let sync = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.sync_to_backend().await })
        };
        remote.push_entered.notified().await;

        // User edits the same record while the push is in flight
        tokio::time::sleep(Duration::from_millis(5)).await;
        store
            .delete_record(crate::models::RecordType::Receipt, &receipt.id.as_str())
            .unwrap();

        remote.push_release.notify_one();
        let result = sync.await.unwrap().unwrap();
        assert!(result.success);

        // The in-flight edit was not clobbered by queue cleanup
        assert_eq!(store.queue_len().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pull_merges_newer_remote_record() {
        let remote = Arc::new(FakeRemote::default());
        let (store, coordinator, employee) = setup(Arc::clone(&remote));

        let mut local = DailyDescription::new(employee, date("2024-03-01"), "Local version");
        local.updated_at = 1_000;
        store
            .apply_remote(&[SyncRecord::DailyDescription(local.clone())])
            .unwrap();

        let mut newer = local.clone();
        newer.body = "Remote version".to_string();
        newer.updated_at = 2_000;
        remote.set_pull_records(vec![SyncRecord::DailyDescription(newer.clone())]);

        let result = coordinator.sync_from_backend().await.unwrap();
        assert!(result.success);
        assert_eq!(result.pulled, 1);

        let merged = store
            .get_daily_description(employee, date("2024-03-01"))
            .unwrap()
            .unwrap();
        assert_eq!(merged, newer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failure_and_releases_guard() {
        let remote = Arc::new(FakeRemote {
            push_delay: Some(Duration::from_secs(300)),
            ..FakeRemote::default()
        });
        let store = StoreService::open_in_memory().unwrap();
        let employee = EmployeeId::new();
        let coordinator = SyncCoordinator::with_sync_timeout(
            store.clone(),
            Arc::clone(&remote) as Arc<dyn RemoteClient>,
            employee,
            Duration::from_secs(1),
        )
        .unwrap();
        store
            .save_daily_description(employee, date("2024-03-01"), "Slow push")
            .unwrap();

        let result = coordinator.sync_to_backend().await.unwrap();

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or("").contains("timed out"));
        assert_eq!(store.queue_len().unwrap(), 1);
        assert!(!coordinator.get_sync_queue_status().is_processing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_sync_timer_pushes_periodically() {
        let remote = Arc::new(FakeRemote::default());
        let store = StoreService::open_in_memory().unwrap();
        let employee = EmployeeId::new();
        let coordinator = SyncCoordinator::new(
            store.clone(),
            Arc::clone(&remote) as Arc<dyn RemoteClient>,
            employee,
        )
        .unwrap();

        coordinator.set_auto_sync_enabled(true).unwrap();
        store
            .save_daily_description(employee, date("2024-03-01"), "Background")
            .unwrap();

        tokio::time::sleep(Duration::from_secs(35)).await;

        assert!(remote.push_count() >= 1);
        assert_eq!(store.queue_len().unwrap(), 0);

        // Disabling cancels the pending tick
        coordinator.set_auto_sync_enabled(false).unwrap();
        let pushes = remote.push_count();
        store
            .save_daily_description(employee, date("2024-03-02"), "No timer now")
            .unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(remote.push_count(), pushes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_sync_tick_skipped_while_manual_sync_in_flight() {
        let remote = Arc::new(FakeRemote {
            hold_push: true,
            ..FakeRemote::default()
        });
        let store = StoreService::open_in_memory().unwrap();
        let employee = EmployeeId::new();
        // Timeout well past the timer interval so the held push outlives a tick
        let coordinator = SyncCoordinator::with_sync_timeout(
            store.clone(),
            Arc::clone(&remote) as Arc<dyn RemoteClient>,
            employee,
            Duration::from_secs(600),
        )
        .unwrap();
        coordinator.set_auto_sync_enabled(true).unwrap();
        store
            .save_daily_description(employee, date("2024-03-01"), "Held open")
            .unwrap();

        let manual = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.force_sync().await })
        };
        remote.push_entered.notified().await;

        // The timer fires while the manual push is still in flight; that tick
        // is skipped rather than queued behind the guard.
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(remote.push_count(), 1);

        remote.push_release.notify_one();
        assert!(manual.await.unwrap().unwrap());
        assert_eq!(store.queue_len().unwrap(), 0);
        assert!(!coordinator.get_sync_queue_status().is_processing);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_snapshot_reflects_auto_sync_toggle() {
        let remote = Arc::new(FakeRemote::default());
        let (store, coordinator, _) = setup(remote);

        assert!(!coordinator.get_sync_queue_status().auto_sync_enabled);

        coordinator.set_auto_sync_enabled(true).unwrap();
        let status = coordinator.get_sync_queue_status();
        assert!(status.auto_sync_enabled);
        assert!(status.next_auto_sync_in_secs.is_some());
        assert!(store.load_sync_settings().unwrap().auto_sync_enabled);

        coordinator.set_auto_sync_enabled(false).unwrap();
        let status = coordinator.get_sync_queue_status();
        assert!(!status.auto_sync_enabled);
        assert_eq!(status.next_auto_sync_in_secs, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_subscribe_observes_state_changes() {
        let remote = Arc::new(FakeRemote::default());
        let (store, coordinator, employee) = setup(remote);
        let mut receiver = coordinator.subscribe();

        store
            .save_daily_description(employee, date("2024-03-01"), "Watched")
            .unwrap();
        coordinator.sync_to_backend().await.unwrap();

        receiver.changed().await.unwrap();
        let status = *receiver.borrow();
        assert_eq!(status.queue_len, 0);
        assert!(status.last_sync_time.is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_queue_push_skips_remote() {
        let remote = Arc::new(FakeRemote::default());
        let (_, coordinator, _) = setup(Arc::clone(&remote));

        let result = coordinator.sync_to_backend().await.unwrap();
        assert!(result.success);
        assert_eq!(result.pushed, 0);
        assert_eq!(remote.push_count(), 0);
    }
}
