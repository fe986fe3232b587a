//! Data models for Odo

mod queue;
mod record;
mod settings;

pub use queue::{QueueOp, SyncQueueItem};
pub use record::{
    DailyDescription, EmployeeId, EmployeeProfile, MileageEntry, Receipt, RecordId, RecordType,
    SyncRecord,
};
pub use settings::{SyncSettings, SyncSettingsUpdate};
