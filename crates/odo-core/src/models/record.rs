//! Syncable record models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a syncable record, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new unique record ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A unique identifier for the employee who owns a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(Uuid);

impl EmployeeId {
    /// Create a new unique employee ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for EmployeeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EmployeeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Kind tag for syncable records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    DailyDescription,
    MileageEntry,
    Receipt,
    EmployeeProfile,
}

impl RecordType {
    /// Stable string form used in the database and on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DailyDescription => "daily_description",
            Self::MileageEntry => "mileage_entry",
            Self::Receipt => "receipt",
            Self::EmployeeProfile => "employee_profile",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily_description" => Ok(Self::DailyDescription),
            "mileage_entry" => Ok(Self::MileageEntry),
            "receipt" => Ok(Self::Receipt),
            "employee_profile" => Ok(Self::EmployeeProfile),
            other => Err(format!("unknown record type: {other}")),
        }
    }
}

/// Free-text description of one working day.
///
/// At most one exists per (employee, calendar date); writes for an existing
/// date update the row in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDescription {
    /// Unique identifier
    pub id: RecordId,
    /// Owning employee
    pub employee_id: EmployeeId,
    /// Calendar date the description covers
    pub date: NaiveDate,
    /// Description text
    pub body: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for sync
    pub is_deleted: bool,
}

impl DailyDescription {
    /// Create a new description for the given employee and date
    #[must_use]
    pub fn new(employee_id: EmployeeId, date: NaiveDate, body: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: RecordId::new(),
            employee_id,
            date,
            body: body.into(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// Check if the description body is empty (whitespace-only counts as empty)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// One mileage entry (a single trip)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageEntry {
    /// Unique identifier
    pub id: RecordId,
    /// Owning employee
    pub employee_id: EmployeeId,
    /// Calendar date of the trip
    pub date: NaiveDate,
    /// Distance driven in miles
    pub miles: f64,
    /// Trip origin
    pub from_location: String,
    /// Trip destination
    pub to_location: String,
    /// Business purpose of the trip
    pub purpose: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for sync
    pub is_deleted: bool,
}

impl MileageEntry {
    /// Create a new mileage entry
    #[must_use]
    pub fn new(employee_id: EmployeeId, date: NaiveDate, miles: f64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: RecordId::new(),
            employee_id,
            date,
            miles,
            from_location: String::new(),
            to_location: String::new(),
            purpose: String::new(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }
}

/// An expense receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique identifier
    pub id: RecordId,
    /// Owning employee
    pub employee_id: EmployeeId,
    /// Purchase date
    pub date: NaiveDate,
    /// Amount in cents (avoids float rounding in money math)
    pub amount_cents: i64,
    /// Vendor name
    pub vendor: String,
    /// Expense category
    pub category: String,
    /// Free-form note
    pub note: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for sync
    pub is_deleted: bool,
}

impl Receipt {
    /// Create a new receipt
    #[must_use]
    pub fn new(employee_id: EmployeeId, date: NaiveDate, amount_cents: i64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: RecordId::new(),
            employee_id,
            date,
            amount_cents,
            vendor: String::new(),
            category: String::new(),
            note: String::new(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }
}

/// Employee profile (read-mostly)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Employee identifier; doubles as the record's own ID
    pub id: EmployeeId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl EmployeeProfile {
    /// Create a new profile
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: EmployeeId::new(),
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Any record that participates in sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncRecord {
    DailyDescription(DailyDescription),
    MileageEntry(MileageEntry),
    Receipt(Receipt),
    EmployeeProfile(EmployeeProfile),
}

impl SyncRecord {
    /// Kind tag of this record
    #[must_use]
    pub const fn record_type(&self) -> RecordType {
        match self {
            Self::DailyDescription(_) => RecordType::DailyDescription,
            Self::MileageEntry(_) => RecordType::MileageEntry,
            Self::Receipt(_) => RecordType::Receipt,
            Self::EmployeeProfile(_) => RecordType::EmployeeProfile,
        }
    }

    /// Stable unique identifier as stored in the database
    #[must_use]
    pub fn record_id(&self) -> String {
        match self {
            Self::DailyDescription(r) => r.id.as_str(),
            Self::MileageEntry(r) => r.id.as_str(),
            Self::Receipt(r) => r.id.as_str(),
            Self::EmployeeProfile(r) => r.id.as_str(),
        }
    }

    /// Owning employee
    #[must_use]
    pub const fn employee_id(&self) -> EmployeeId {
        match self {
            Self::DailyDescription(r) => r.employee_id,
            Self::MileageEntry(r) => r.employee_id,
            Self::Receipt(r) => r.employee_id,
            Self::EmployeeProfile(r) => r.id,
        }
    }

    /// Last modification timestamp (Unix ms), used for last-write-wins merges
    #[must_use]
    pub const fn updated_at(&self) -> i64 {
        match self {
            Self::DailyDescription(r) => r.updated_at,
            Self::MileageEntry(r) => r.updated_at,
            Self::Receipt(r) => r.updated_at,
            Self::EmployeeProfile(r) => r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_record_id_unique() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_id_parse() {
        let id = RecordId::new();
        let parsed: RecordId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_record_type_round_trip() {
        for kind in [
            RecordType::DailyDescription,
            RecordType::MileageEntry,
            RecordType::Receipt,
            RecordType::EmployeeProfile,
        ] {
            let parsed: RecordType = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert!("journal".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_daily_description_new() {
        let desc = DailyDescription::new(EmployeeId::new(), date("2024-03-01"), "Client visits");
        assert_eq!(desc.body, "Client visits");
        assert!(!desc.is_deleted);
        assert!(desc.created_at > 0);
        assert_eq!(desc.created_at, desc.updated_at);
    }

    #[test]
    fn test_daily_description_is_empty() {
        let employee = EmployeeId::new();
        assert!(DailyDescription::new(employee, date("2024-03-01"), "   ").is_empty());
        assert!(!DailyDescription::new(employee, date("2024-03-01"), "work").is_empty());
    }

    #[test]
    fn test_sync_record_accessors() {
        let entry = MileageEntry::new(EmployeeId::new(), date("2024-03-02"), 12.5);
        let record = SyncRecord::MileageEntry(entry.clone());

        assert_eq!(record.record_type(), RecordType::MileageEntry);
        assert_eq!(record.record_id(), entry.id.as_str());
        assert_eq!(record.employee_id(), entry.employee_id);
        assert_eq!(record.updated_at(), entry.updated_at);
    }

    #[test]
    fn test_sync_record_serde_tag() {
        let receipt = Receipt::new(EmployeeId::new(), date("2024-03-03"), 1299);
        let json = serde_json::to_string(&SyncRecord::Receipt(receipt)).unwrap();
        assert!(json.contains("\"type\":\"receipt\""));
    }
}
