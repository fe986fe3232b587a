//! Record store implementation

use crate::error::{Error, Result};
use crate::models::{
    DailyDescription, EmployeeId, EmployeeProfile, MileageEntry, QueueOp, Receipt, RecordType,
    SyncQueueItem, SyncRecord, SyncSettings,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

/// Aggregate counts over local data, used by the status reporter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateCounts {
    pub employees: usize,
    pub mileage_entries: usize,
    pub receipts: usize,
}

/// Result of merging a batch of remote records into the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Records written to the store (remote was newer or unknown locally)
    pub applied: usize,
    /// Records skipped because the local copy was at least as new
    pub skipped: usize,
}

/// Recorded merge conflict resolved by last-write-wins
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SyncConflict {
    /// Conflict row identifier
    pub id: i64,
    /// Kind of the record involved
    pub record_type: String,
    /// Record involved in the conflict
    pub record_id: String,
    /// Local row's timestamp when the conflict occurred
    pub local_updated_at: i64,
    /// Incoming row's timestamp that was rejected
    pub incoming_updated_at: i64,
    /// Resolution timestamp (Unix ms)
    pub resolved_at: i64,
    /// Resolution strategy name
    pub strategy: String,
}

/// Trait for syncable-record storage operations
pub trait RecordStore {
    /// Insert or update an employee profile
    fn upsert_employee(&self, profile: &EmployeeProfile) -> Result<()>;

    /// Get an employee profile by ID
    fn get_employee(&self, id: EmployeeId) -> Result<Option<EmployeeProfile>>;

    /// Upsert a daily description, keyed by (employee, date).
    ///
    /// If a row already exists for the pair, its body and timestamp are
    /// updated in place and the stored record (original ID) is returned.
    fn save_daily_description(&self, record: &DailyDescription) -> Result<DailyDescription>;

    /// Get a daily description by employee and date
    fn get_daily_description(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<DailyDescription>>;

    /// Insert a new mileage entry
    fn insert_mileage_entry(&self, record: &MileageEntry) -> Result<()>;

    /// Insert a new receipt
    fn insert_receipt(&self, record: &Receipt) -> Result<()>;

    /// Get any record by type and identifier (including soft-deleted rows)
    fn get_record(&self, record_type: RecordType, record_id: &str) -> Result<Option<SyncRecord>>;

    /// Soft delete a record, bumping its modification timestamp
    fn mark_deleted(&self, record_type: RecordType, record_id: &str) -> Result<()>;

    /// All records owned by an employee, in stable (type, date, id) order
    fn records_for_employee(
        &self,
        employee_id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Vec<SyncRecord>>;

    /// Merge remote records into the store, last-write-wins by timestamp.
    ///
    /// A remote record strictly newer than the local copy overwrites it;
    /// otherwise the local copy is kept. Ties keep local, which makes
    /// re-applying the same pull a no-op. The backend's tie-break rule is
    /// unverified, so this is a client policy, not an authoritative one.
    fn apply_remote(&self, records: &[SyncRecord]) -> Result<MergeOutcome>;

    /// Aggregate counts over local data
    fn counts(&self) -> Result<AggregateCounts>;

    /// Queue a local mutation for transmission.
    ///
    /// A second mutation of the same record collapses into the existing
    /// queue row: position is kept, the operation kind is replaced.
    fn enqueue(&self, record_type: RecordType, record_id: &str, op: QueueOp) -> Result<()>;

    /// Pending queue items, FIFO by enqueue timestamp
    fn pending_queue(&self) -> Result<Vec<SyncQueueItem>>;

    /// Remove transmitted queue items, skipping rows revised since capture
    fn remove_queue_items(&self, items: &[SyncQueueItem]) -> Result<()>;

    /// Current queue length
    fn queue_len(&self) -> Result<usize>;
}

/// `SQLite` implementation of `RecordStore`
pub struct SqliteRecordStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRecordStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_employee(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmployeeProfile> {
        let id: String = row.get(0)?;
        Ok(EmployeeProfile {
            id: id.parse().unwrap_or_default(),
            name: row.get(1)?,
            email: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn parse_daily(row: &rusqlite::Row<'_>) -> rusqlite::Result<DailyDescription> {
        let id: String = row.get(0)?;
        let employee_id: String = row.get(1)?;
        let date: String = row.get(2)?;
        Ok(DailyDescription {
            id: id.parse().unwrap_or_default(),
            employee_id: employee_id.parse().unwrap_or_default(),
            date: date.parse().unwrap_or_default(),
            body: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            is_deleted: row.get::<_, i32>(6)? != 0,
        })
    }

    fn parse_mileage(row: &rusqlite::Row<'_>) -> rusqlite::Result<MileageEntry> {
        let id: String = row.get(0)?;
        let employee_id: String = row.get(1)?;
        let date: String = row.get(2)?;
        Ok(MileageEntry {
            id: id.parse().unwrap_or_default(),
            employee_id: employee_id.parse().unwrap_or_default(),
            date: date.parse().unwrap_or_default(),
            miles: row.get(3)?,
            from_location: row.get(4)?,
            to_location: row.get(5)?,
            purpose: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            is_deleted: row.get::<_, i32>(9)? != 0,
        })
    }

    fn parse_receipt(row: &rusqlite::Row<'_>) -> rusqlite::Result<Receipt> {
        let id: String = row.get(0)?;
        let employee_id: String = row.get(1)?;
        let date: String = row.get(2)?;
        Ok(Receipt {
            id: id.parse().unwrap_or_default(),
            employee_id: employee_id.parse().unwrap_or_default(),
            date: date.parse().unwrap_or_default(),
            amount_cents: row.get(3)?,
            vendor: row.get(4)?,
            category: row.get(5)?,
            note: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            is_deleted: row.get::<_, i32>(9)? != 0,
        })
    }

    fn parse_queue_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<SyncQueueItem> {
        let record_type: String = row.get(1)?;
        let op: String = row.get(3)?;
        Ok(SyncQueueItem {
            id: row.get(0)?,
            record_type: record_type
                .parse()
                .unwrap_or(RecordType::DailyDescription),
            record_id: row.get(2)?,
            op: op.parse().unwrap_or(QueueOp::Update),
            enqueued_at: row.get(4)?,
            revised_at: row.get(5)?,
        })
    }

    /// Write a record unconditionally, replacing any row with the same ID
    fn write_record(&self, record: &SyncRecord) -> Result<()> {
        match record {
            SyncRecord::DailyDescription(r) => {
                // Replace by the (employee, date) key as well, so a remote
                // row with a different ID cannot violate the uniqueness
                // invariant.
                self.conn.execute(
                    "DELETE FROM daily_descriptions WHERE employee_id = ? AND date = ?",
                    params![r.employee_id.as_str(), r.date.to_string()],
                )?;
                self.conn.execute(
                    "INSERT OR REPLACE INTO daily_descriptions
                     (id, employee_id, date, body, created_at, updated_at, is_deleted)
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                    params![
                        r.id.as_str(),
                        r.employee_id.as_str(),
                        r.date.to_string(),
                        r.body,
                        r.created_at,
                        r.updated_at,
                        i32::from(r.is_deleted)
                    ],
                )?;
            }
            SyncRecord::MileageEntry(r) => {
                self.conn.execute(
                    "INSERT OR REPLACE INTO mileage_entries
                     (id, employee_id, date, miles, from_location, to_location, purpose,
                      created_at, updated_at, is_deleted)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        r.id.as_str(),
                        r.employee_id.as_str(),
                        r.date.to_string(),
                        r.miles,
                        r.from_location,
                        r.to_location,
                        r.purpose,
                        r.created_at,
                        r.updated_at,
                        i32::from(r.is_deleted)
                    ],
                )?;
            }
            SyncRecord::Receipt(r) => {
                self.conn.execute(
                    "INSERT OR REPLACE INTO receipts
                     (id, employee_id, date, amount_cents, vendor, category, note,
                      created_at, updated_at, is_deleted)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        r.id.as_str(),
                        r.employee_id.as_str(),
                        r.date.to_string(),
                        r.amount_cents,
                        r.vendor,
                        r.category,
                        r.note,
                        r.created_at,
                        r.updated_at,
                        i32::from(r.is_deleted)
                    ],
                )?;
            }
            SyncRecord::EmployeeProfile(r) => self.upsert_employee(r)?,
        }
        Ok(())
    }

    /// Find the local counterpart of an incoming record.
    ///
    /// Daily descriptions match by (employee, date) first since that pair is
    /// the logical key; everything else matches by ID.
    fn local_counterpart(&self, incoming: &SyncRecord) -> Result<Option<SyncRecord>> {
        if let SyncRecord::DailyDescription(r) = incoming {
            if let Some(existing) = self.get_daily_description(r.employee_id, r.date)? {
                return Ok(Some(SyncRecord::DailyDescription(existing)));
            }
        }
        self.get_record(incoming.record_type(), &incoming.record_id())
    }

    fn log_conflict(&self, incoming: &SyncRecord, local_updated_at: i64) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO sync_conflicts
             (record_type, record_id, local_updated_at, incoming_updated_at, resolved_at, strategy)
             VALUES (?, ?, ?, ?, ?, 'lww')",
            params![
                incoming.record_type().as_str(),
                incoming.record_id(),
                local_updated_at,
                incoming.updated_at(),
                now
            ],
        )?;
        Ok(())
    }

    /// Recently resolved merge conflicts, newest first
    pub fn recent_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, record_type, record_id, local_updated_at, incoming_updated_at,
                    resolved_at, strategy
             FROM sync_conflicts
             ORDER BY resolved_at DESC
             LIMIT ?",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let conflicts = stmt
            .query_map(params![limit as i64], |row| {
                Ok(SyncConflict {
                    id: row.get(0)?,
                    record_type: row.get(1)?,
                    record_id: row.get(2)?,
                    local_updated_at: row.get(3)?,
                    incoming_updated_at: row.get(4)?,
                    resolved_at: row.get(5)?,
                    strategy: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(conflicts)
    }

    /// Timestamp of the last successful pull for an employee
    pub fn last_pull_at(&self, employee_id: EmployeeId) -> Result<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT last_pull_at FROM sync_meta WHERE employee_id = ?",
                params![employee_id.as_str()],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    /// Record the timestamp of a successful pull
    pub fn set_last_pull_at(&self, employee_id: EmployeeId, timestamp: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_meta (employee_id, last_pull_at) VALUES (?, ?)
             ON CONFLICT(employee_id) DO UPDATE SET last_pull_at = excluded.last_pull_at",
            params![employee_id.as_str(), timestamp],
        )?;
        Ok(())
    }

    /// Timestamp of the last fully successful sync for an employee
    pub fn last_sync_time(&self, employee_id: EmployeeId) -> Result<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT last_sync_time FROM sync_meta WHERE employee_id = ?",
                params![employee_id.as_str()],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    /// Record the timestamp of a successful sync
    pub fn set_last_sync_time(&self, employee_id: EmployeeId, timestamp: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_meta (employee_id, last_sync_time) VALUES (?, ?)
             ON CONFLICT(employee_id) DO UPDATE SET last_sync_time = excluded.last_sync_time",
            params![employee_id.as_str(), timestamp],
        )?;
        Ok(())
    }

    /// Load sync settings, falling back to defaults for missing keys
    pub fn load_sync_settings(&self) -> Result<SyncSettings> {
        let mut settings = SyncSettings::default();

        if let Some(value) = self.get_setting("auto_sync_enabled")? {
            settings.auto_sync_enabled = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(value) = self.get_setting("auto_sync_interval_secs")? {
            if let Ok(interval) = value.parse() {
                settings.auto_sync_interval_secs = interval;
            }
        }

        Ok(settings)
    }

    /// Persist sync settings
    pub fn save_sync_settings(&self, settings: &SyncSettings) -> Result<()> {
        self.set_setting(
            "auto_sync_enabled",
            if settings.auto_sync_enabled {
                "true"
            } else {
                "false"
            },
        )?;
        self.set_setting(
            "auto_sync_interval_secs",
            &settings.auto_sync_interval_secs.to_string(),
        )?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn upsert_employee(&self, profile: &EmployeeProfile) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO employees (id, name, email, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                profile.id.as_str(),
                profile.name,
                profile.email,
                profile.created_at,
                profile.updated_at
            ],
        )?;
        Ok(())
    }

    fn get_employee(&self, id: EmployeeId) -> Result<Option<EmployeeProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, name, email, created_at, updated_at FROM employees WHERE id = ?",
                params![id.as_str()],
                Self::parse_employee,
            )
            .optional()?;
        Ok(profile)
    }

    fn save_daily_description(&self, record: &DailyDescription) -> Result<DailyDescription> {
        if let Some(existing) = self.get_daily_description(record.employee_id, record.date)? {
            let now = chrono::Utc::now().timestamp_millis();
            self.conn.execute(
                "UPDATE daily_descriptions SET body = ?, updated_at = ?, is_deleted = 0
                 WHERE id = ?",
                params![record.body, now, existing.id.as_str()],
            )?;
            return Ok(DailyDescription {
                body: record.body.clone(),
                updated_at: now,
                is_deleted: false,
                ..existing
            });
        }

        self.conn.execute(
            "INSERT INTO daily_descriptions
             (id, employee_id, date, body, created_at, updated_at, is_deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id.as_str(),
                record.employee_id.as_str(),
                record.date.to_string(),
                record.body,
                record.created_at,
                record.updated_at,
                i32::from(record.is_deleted)
            ],
        )?;
        Ok(record.clone())
    }

    fn get_daily_description(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<DailyDescription>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, employee_id, date, body, created_at, updated_at, is_deleted
                 FROM daily_descriptions
                 WHERE employee_id = ? AND date = ?",
                params![employee_id.as_str(), date.to_string()],
                Self::parse_daily,
            )
            .optional()?;
        Ok(record)
    }

    fn insert_mileage_entry(&self, record: &MileageEntry) -> Result<()> {
        self.write_record(&SyncRecord::MileageEntry(record.clone()))
    }

    fn insert_receipt(&self, record: &Receipt) -> Result<()> {
        self.write_record(&SyncRecord::Receipt(record.clone()))
    }

    fn get_record(&self, record_type: RecordType, record_id: &str) -> Result<Option<SyncRecord>> {
        match record_type {
            RecordType::DailyDescription => Ok(self
                .conn
                .query_row(
                    "SELECT id, employee_id, date, body, created_at, updated_at, is_deleted
                     FROM daily_descriptions WHERE id = ?",
                    params![record_id],
                    Self::parse_daily,
                )
                .optional()?
                .map(SyncRecord::DailyDescription)),
            RecordType::MileageEntry => Ok(self
                .conn
                .query_row(
                    "SELECT id, employee_id, date, miles, from_location, to_location, purpose,
                            created_at, updated_at, is_deleted
                     FROM mileage_entries WHERE id = ?",
                    params![record_id],
                    Self::parse_mileage,
                )
                .optional()?
                .map(SyncRecord::MileageEntry)),
            RecordType::Receipt => Ok(self
                .conn
                .query_row(
                    "SELECT id, employee_id, date, amount_cents, vendor, category, note,
                            created_at, updated_at, is_deleted
                     FROM receipts WHERE id = ?",
                    params![record_id],
                    Self::parse_receipt,
                )
                .optional()?
                .map(SyncRecord::Receipt)),
            RecordType::EmployeeProfile => {
                let id: EmployeeId = record_id
                    .parse()
                    .map_err(|_| Error::InvalidInput("Invalid employee ID".into()))?;
                Ok(self.get_employee(id)?.map(SyncRecord::EmployeeProfile))
            }
        }
    }

    fn mark_deleted(&self, record_type: RecordType, record_id: &str) -> Result<()> {
        let table = match record_type {
            RecordType::DailyDescription => "daily_descriptions",
            RecordType::MileageEntry => "mileage_entries",
            RecordType::Receipt => "receipts",
            RecordType::EmployeeProfile => {
                return Err(Error::InvalidInput(
                    "Employee profiles cannot be deleted".into(),
                ))
            }
        };

        let now = chrono::Utc::now().timestamp_millis();
        let rows = self.conn.execute(
            &format!("UPDATE {table} SET is_deleted = 1, updated_at = ? WHERE id = ?"),
            params![now, record_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(record_id.to_string()));
        }
        Ok(())
    }

    fn records_for_employee(
        &self,
        employee_id: EmployeeId,
        include_deleted: bool,
    ) -> Result<Vec<SyncRecord>> {
        let deleted_cutoff = i32::from(include_deleted);
        let mut records = Vec::new();

        if let Some(profile) = self.get_employee(employee_id)? {
            records.push(SyncRecord::EmployeeProfile(profile));
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, employee_id, date, body, created_at, updated_at, is_deleted
             FROM daily_descriptions
             WHERE employee_id = ? AND is_deleted <= ?
             ORDER BY date ASC, id ASC",
        )?;
        records.extend(
            stmt.query_map(
                params![employee_id.as_str(), deleted_cutoff],
                Self::parse_daily,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(SyncRecord::DailyDescription),
        );

        let mut stmt = self.conn.prepare(
            "SELECT id, employee_id, date, miles, from_location, to_location, purpose,
                    created_at, updated_at, is_deleted
             FROM mileage_entries
             WHERE employee_id = ? AND is_deleted <= ?
             ORDER BY date ASC, id ASC",
        )?;
        records.extend(
            stmt.query_map(
                params![employee_id.as_str(), deleted_cutoff],
                Self::parse_mileage,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(SyncRecord::MileageEntry),
        );

        let mut stmt = self.conn.prepare(
            "SELECT id, employee_id, date, amount_cents, vendor, category, note,
                    created_at, updated_at, is_deleted
             FROM receipts
             WHERE employee_id = ? AND is_deleted <= ?
             ORDER BY date ASC, id ASC",
        )?;
        records.extend(
            stmt.query_map(
                params![employee_id.as_str(), deleted_cutoff],
                Self::parse_receipt,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(SyncRecord::Receipt),
        );

        Ok(records)
    }

    fn apply_remote(&self, records: &[SyncRecord]) -> Result<MergeOutcome> {
        let mut outcome = MergeOutcome::default();

        for incoming in records {
            match self.local_counterpart(incoming)? {
                None => {
                    self.write_record(incoming)?;
                    outcome.applied += 1;
                }
                Some(existing) if incoming.updated_at() > existing.updated_at() => {
                    self.write_record(incoming)?;
                    outcome.applied += 1;
                }
                Some(existing) => {
                    if incoming.updated_at() < existing.updated_at() {
                        tracing::debug!(
                            record_id = %incoming.record_id(),
                            local = existing.updated_at(),
                            incoming = incoming.updated_at(),
                            "Keeping local record over older remote copy"
                        );
                        self.log_conflict(incoming, existing.updated_at())?;
                    }
                    outcome.skipped += 1;
                }
            }
        }

        Ok(outcome)
    }

    fn counts(&self) -> Result<AggregateCounts> {
        let employees: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        let mileage_entries: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM mileage_entries WHERE is_deleted = 0",
            [],
            |row| row.get(0),
        )?;
        let receipts: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM receipts WHERE is_deleted = 0",
            [],
            |row| row.get(0),
        )?;

        Ok(AggregateCounts {
            employees,
            mileage_entries,
            receipts,
        })
    }

    fn enqueue(&self, record_type: RecordType, record_id: &str, op: QueueOp) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO sync_queue (record_type, record_id, op, enqueued_at, revised_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(record_id) DO UPDATE
                SET op = excluded.op, revised_at = excluded.revised_at",
            params![record_type.as_str(), record_id, op.as_str(), now, now],
        )?;
        Ok(())
    }

    fn pending_queue(&self) -> Result<Vec<SyncQueueItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, record_type, record_id, op, enqueued_at, revised_at
             FROM sync_queue
             ORDER BY enqueued_at ASC, id ASC",
        )?;

        let items = stmt
            .query_map([], Self::parse_queue_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    fn remove_queue_items(&self, items: &[SyncQueueItem]) -> Result<()> {
        for item in items {
            // Matching on revised_at keeps rows that collapsed a newer
            // mutation while these items were in flight.
            self.conn.execute(
                "DELETE FROM sync_queue WHERE id = ? AND revised_at = ?",
                params![item.id, item.revised_at],
            )?;
        }
        Ok(())
    }

    fn queue_len(&self) -> Result<usize> {
        let len: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))?;
        Ok(len)
    }
}
