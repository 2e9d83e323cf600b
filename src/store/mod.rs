//! Persisted record of the last scan, stored as bincode compressed with zstd.

mod snapshot;

pub use snapshot::{
    SNAPSHOT_VERSION, Snapshot, SnapshotDirectory, SnapshotError, SnapshotState, SnapshotStore,
};
