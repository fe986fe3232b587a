//! Shared local-store service wrapper used across clients.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::db::{
    AggregateCounts, Database, MergeOutcome, RecordStore, SqliteRecordStore, SyncConflict,
};
use crate::error::{Error, Result};
use crate::models::{
    DailyDescription, EmployeeId, EmployeeProfile, MileageEntry, QueueOp, Receipt, RecordType,
    SyncQueueItem, SyncRecord, SyncSettings, SyncSettingsUpdate,
};

/// Thread-safe handle to the local store.
///
/// The sync coordinator and direct user-edit paths are the only mutators of
/// the store; both go through this service. Every local mutation enqueues a
/// sync-queue item under the same lock, so a concurrently running sync never
/// observes a record change without its queue entry.
///
/// The inner mutex is a standard mutex: all storage calls are synchronous
/// and the guard is never held across an await point.
#[derive(Clone)]
pub struct StoreService {
    db: Arc<Mutex<Database>>,
}

impl StoreService {
    /// Open a store at the given filesystem path
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Open an in-memory store (primarily for tests)
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| Error::Database("store mutex poisoned".to_string()))
    }

    /// Save a daily description for (employee, date), enqueueing the mutation.
    ///
    /// At most one description exists per pair; saving again for the same
    /// date updates the stored row.
    pub fn save_daily_description(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
        body: impl Into<String>,
    ) -> Result<DailyDescription> {
        let record = DailyDescription::new(employee_id, date, body);
        if record.is_empty() {
            return Err(Error::InvalidInput(
                "Daily description must not be empty".to_string(),
            ));
        }

        let db = self.lock()?;
        let store = SqliteRecordStore::new(db.connection());

        let op = if store.get_daily_description(employee_id, date)?.is_some() {
            QueueOp::Update
        } else {
            QueueOp::Create
        };
        let saved = store.save_daily_description(&record)?;
        store.enqueue(RecordType::DailyDescription, &saved.id.as_str(), op)?;
        Ok(saved)
    }

    /// Add a mileage entry, enqueueing the mutation
    pub fn add_mileage_entry(&self, entry: &MileageEntry) -> Result<()> {
        if entry.miles <= 0.0 {
            return Err(Error::InvalidInput("Miles must be positive".to_string()));
        }

        let db = self.lock()?;
        let store = SqliteRecordStore::new(db.connection());
        store.insert_mileage_entry(entry)?;
        store.enqueue(
            RecordType::MileageEntry,
            &entry.id.as_str(),
            QueueOp::Create,
        )
    }

    /// Add a receipt, enqueueing the mutation
    pub fn add_receipt(&self, receipt: &Receipt) -> Result<()> {
        let db = self.lock()?;
        let store = SqliteRecordStore::new(db.connection());
        store.insert_receipt(receipt)?;
        store.enqueue(RecordType::Receipt, &receipt.id.as_str(), QueueOp::Create)
    }

    /// Soft delete a record, enqueueing the mutation
    pub fn delete_record(&self, record_type: RecordType, record_id: &str) -> Result<()> {
        let db = self.lock()?;
        let store = SqliteRecordStore::new(db.connection());
        store.mark_deleted(record_type, record_id)?;
        store.enqueue(record_type, record_id, QueueOp::Delete)
    }

    /// Insert or update an employee profile, enqueueing the mutation
    pub fn save_employee(&self, profile: &EmployeeProfile) -> Result<()> {
        let db = self.lock()?;
        let store = SqliteRecordStore::new(db.connection());
        let op = if store.get_employee(profile.id)?.is_some() {
            QueueOp::Update
        } else {
            QueueOp::Create
        };
        store.upsert_employee(profile)?;
        store.enqueue(RecordType::EmployeeProfile, &profile.id.as_str(), op)
    }

    /// Get an employee profile
    pub fn get_employee(&self, id: EmployeeId) -> Result<Option<EmployeeProfile>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).get_employee(id)
    }

    /// Get a daily description by employee and date
    pub fn get_daily_description(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<DailyDescription>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).get_daily_description(employee_id, date)
    }

    /// Get any record by type and identifier
    pub fn get_record(
        &self,
        record_type: RecordType,
        record_id: &str,
    ) -> Result<Option<SyncRecord>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).get_record(record_type, record_id)
    }

    /// All records owned by an employee
    pub fn records_for_employee(
        &self,
        employee_id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Vec<SyncRecord>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).records_for_employee(employee_id, include_deleted)
    }

    /// Merge remote records into the store (last-write-wins by timestamp)
    pub fn apply_remote(&self, records: &[SyncRecord]) -> Result<MergeOutcome> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).apply_remote(records)
    }

    /// Aggregate counts over local data
    pub fn counts(&self) -> Result<AggregateCounts> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).counts()
    }

    /// Pending queue items, FIFO
    pub fn pending_queue(&self) -> Result<Vec<SyncQueueItem>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).pending_queue()
    }

    /// Remove transmitted queue items, skipping rows revised since capture
    pub fn remove_queue_items(&self, items: &[SyncQueueItem]) -> Result<()> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).remove_queue_items(items)
    }

    /// Current queue length
    pub fn queue_len(&self) -> Result<usize> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).queue_len()
    }

    /// Timestamp of the last successful pull for an employee
    pub fn last_pull_at(&self, employee_id: EmployeeId) -> Result<Option<i64>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).last_pull_at(employee_id)
    }

    /// Record the timestamp of a successful pull
    pub fn set_last_pull_at(&self, employee_id: EmployeeId, timestamp: i64) -> Result<()> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).set_last_pull_at(employee_id, timestamp)
    }

    /// Timestamp of the last fully successful sync for an employee
    pub fn last_sync_time(&self, employee_id: EmployeeId) -> Result<Option<i64>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).last_sync_time(employee_id)
    }

    /// Record the timestamp of a successful sync
    pub fn set_last_sync_time(&self, employee_id: EmployeeId, timestamp: i64) -> Result<()> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).set_last_sync_time(employee_id, timestamp)
    }

    /// Load persisted sync settings
    pub fn load_sync_settings(&self) -> Result<SyncSettings> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).load_sync_settings()
    }

    /// Apply a partial settings update and persist the result
    pub fn update_sync_settings(&self, update: &SyncSettingsUpdate) -> Result<SyncSettings> {
        let db = self.lock()?;
        let store = SqliteRecordStore::new(db.connection());
        let settings = update.apply(store.load_sync_settings()?);
        store.save_sync_settings(&settings)?;
        Ok(settings)
    }

    /// Recently resolved merge conflicts, newest first
    pub fn recent_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        let db = self.lock()?;
        SqliteRecordStore::new(db.connection()).recent_conflicts(limit)
    }
}
