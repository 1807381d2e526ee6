pub mod snapshot;
pub mod traits;

pub use snapshot::{InMemorySnapshotStore, JsonSnapshotFile, SnapshotData};
pub use traits::SnapshotStore;
