//! Sync coordination: push/pull sequencing, status snapshots, reporting

mod coordinator;
mod status;

pub use coordinator::{SyncCoordinator, SyncReport, SyncResult, SyncStatusSnapshot};
pub use status::{RealtimeStatus, StatusReporter};
