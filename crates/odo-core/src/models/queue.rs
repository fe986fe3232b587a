//! Sync queue model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::RecordType;

/// Operation kind carried by a queued mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOp {
    Create,
    Update,
    Delete,
}

impl QueueOp {
    /// Stable string form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for QueueOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown queue op: {other}")),
        }
    }
}

/// A pending local mutation awaiting transmission to the backend.
///
/// Rows are FIFO by `enqueued_at`. A later mutation of the same record
/// collapses into the existing row: the queue position is kept, the
/// operation kind is replaced with the newer one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncQueueItem {
    /// Queue row identifier
    pub id: i64,
    /// Kind of the referenced record
    pub record_type: RecordType,
    /// Identifier of the referenced record
    pub record_id: String,
    /// Mutation kind
    pub op: QueueOp,
    /// Enqueue timestamp (Unix ms)
    pub enqueued_at: i64,
    /// Bumped whenever a later mutation collapses into this row.
    ///
    /// Queue removal after a successful push matches on (id, revised_at), so
    /// a record edited while its row was being transmitted stays queued.
    pub revised_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_op_round_trip() {
        for op in [QueueOp::Create, QueueOp::Update, QueueOp::Delete] {
            let parsed: QueueOp = op.as_str().parse().unwrap();
            assert_eq!(op, parsed);
        }
        assert!("upsert".parse::<QueueOp>().is_err());
    }
}
