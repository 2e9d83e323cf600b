//! Directory hierarchies in memory.
//!
//! Both sides of a reconciliation are expressed as the same [`Tree`] shape:
//! one scanned from the live disk, one rebuilt from persisted records.

mod db_builder;
mod fs_builder;
mod tree;

pub use db_builder::{DirectoryRecord, PersistedState, build_from_db, build_from_state};
pub use fs_builder::{
    DirectoryLister, FsTreeError, ListedEntry, LocalLister, build_from_path, build_with_lister,
};
pub use tree::{DirId, DirectoryNode, FileId, FileNode, Tree};
