//! Storage seam for snapshot data.
//!
//! The structural engine never reads source files or databases itself. A
//! [`SnapshotStore`] hands it the function and call-edge collections for a
//! snapshot id; tests and the binary use the in-memory and JSON-file
//! implementations in [`super::snapshot`].

use crate::core::{CallEdge, FunctionRecord};
use crate::errors::Result;

/// Query interface returning the records of one snapshot.
///
/// Implementations should be thread-safe (`Send + Sync`) so a single store
/// can serve concurrent analyses.
pub trait SnapshotStore: Send + Sync {
    /// All functions recorded for `snapshot_id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` when the snapshot is unknown or unreadable.
    fn functions(&self, snapshot_id: &str) -> Result<Vec<FunctionRecord>>;

    /// All call edges recorded for `snapshot_id`, repeats included.
    fn call_edges(&self, snapshot_id: &str) -> Result<Vec<CallEdge>>;
}
