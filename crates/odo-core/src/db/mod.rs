//! Local store for Odo

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{AggregateCounts, MergeOutcome, RecordStore, SqliteRecordStore, SyncConflict};
