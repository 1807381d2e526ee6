use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::traits::SnapshotStore;
use crate::core::{CallEdge, FunctionRecord};
use crate::errors::{Error, Result, ResultExt};

/// Functions and edges of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotData {
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,
    #[serde(default)]
    pub edges: Vec<CallEdge>,
}

/// Snapshots held in memory, keyed by id
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: RwLock<HashMap<String, SnapshotData>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        snapshot_id: impl Into<String>,
        functions: Vec<FunctionRecord>,
        edges: Vec<CallEdge>,
    ) {
        self.snapshots
            .write()
            .insert(snapshot_id.into(), SnapshotData { functions, edges });
    }

    /// Replace only the edges of an existing snapshot
    pub fn replace_edges(&self, snapshot_id: &str, edges: Vec<CallEdge>) -> Result<()> {
        let mut snapshots = self.snapshots.write();
        let data = snapshots
            .get_mut(snapshot_id)
            .ok_or_else(|| Error::storage(snapshot_id, "unknown snapshot"))?;
        data.edges = edges;
        Ok(())
    }

    pub fn remove(&self, snapshot_id: &str) -> bool {
        self.snapshots.write().remove(snapshot_id).is_some()
    }

    fn with_snapshot<T>(&self, snapshot_id: &str, f: impl FnOnce(&SnapshotData) -> T) -> Result<T> {
        self.snapshots
            .read()
            .get(snapshot_id)
            .map(f)
            .ok_or_else(|| Error::storage(snapshot_id, "unknown snapshot"))
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn functions(&self, snapshot_id: &str) -> Result<Vec<FunctionRecord>> {
        self.with_snapshot(snapshot_id, |data| data.functions.clone())
    }

    fn call_edges(&self, snapshot_id: &str) -> Result<Vec<CallEdge>> {
        self.with_snapshot(snapshot_id, |data| data.edges.clone())
    }
}

/// A single snapshot stored as a JSON document:
///
/// ```json
/// { "snapshot_id": "abc", "functions": [...], "edges": [...] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSnapshotFile {
    pub snapshot_id: String,
    #[serde(flatten)]
    pub data: SnapshotData,
}

impl JsonSnapshotFile {
    pub fn new(snapshot_id: impl Into<String>, functions: Vec<FunctionRecord>, edges: Vec<CallEdge>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            data: SnapshotData { functions, edges },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(Error::from)
            .context(format!("Failed to read snapshot file {}", path.display()))?;
        Self::parse(&contents).context(format!("Failed to parse snapshot file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn check_id(&self, snapshot_id: &str) -> Result<&SnapshotData> {
        if snapshot_id == self.snapshot_id {
            Ok(&self.data)
        } else {
            Err(Error::storage(
                snapshot_id,
                format!("file holds snapshot '{}'", self.snapshot_id),
            ))
        }
    }
}

impl SnapshotStore for JsonSnapshotFile {
    fn functions(&self, snapshot_id: &str) -> Result<Vec<FunctionRecord>> {
        Ok(self.check_id(snapshot_id)?.functions.clone())
    }

    fn call_edges(&self, snapshot_id: &str) -> Result<Vec<CallEdge>> {
        Ok(self.check_id(snapshot_id)?.edges.clone())
    }
}
