use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ext::PathExt;
use crate::filesystem::{DirId, Tree};

/// A directory as the persisted record knows it. `path` is relative to the
/// scan root; the empty path is the root itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub path: PathBuf,
    pub excluded: bool,
}

impl DirectoryRecord {
    pub fn new(path: impl Into<PathBuf>, excluded: bool) -> Self {
        Self {
            path: path.into(),
            excluded,
        }
    }
}

/// Read side of whatever stores the previously scanned tree.
pub trait PersistedState {
    fn directories(&self) -> Vec<DirectoryRecord>;

    /// Titles of the files recorded directly under `directory`.
    fn belonging_items(&self, directory: &Path) -> Vec<String>;
}

pub fn build_from_state(root_title: impl Into<String>, state: &impl PersistedState) -> Tree {
    build_from_db(root_title, state.directories(), |path| {
        state.belonging_items(path)
    })
}

/// Rebuilds the tree shape described by `records`.
///
/// Intermediate directories that were never recorded themselves are created
/// on the way down. Files are only fetched for directories named by a record,
/// and only once per directory.
pub fn build_from_db(
    root_title: impl Into<String>,
    records: impl IntoIterator<Item = DirectoryRecord>,
    mut belonging_items: impl FnMut(&Path) -> Vec<String>,
) -> Tree {
    let mut tree = Tree::new(root_title);
    let mut populated = HashSet::new();

    for record in records {
        let directory = locate_or_create(&mut tree, &record.path.name_segments());
        tree.set_excluded(directory, record.excluded);

        if !populated.insert(directory) {
            debug!("Directory {} recorded twice", record.path.display());
            continue;
        }
        for title in belonging_items(&record.path) {
            tree.add_file(directory, title);
        }
    }

    debug!(
        "Rebuilt recorded tree: {} directories, {} files",
        tree.directory_count(),
        tree.file_count()
    );
    tree
}

fn locate_or_create(tree: &mut Tree, segments: &[String]) -> DirId {
    let mut current = tree.root();
    for segment in segments {
        current = match tree.child_directory(current, segment) {
            Some(existing) => existing,
            None => tree.add_directory(current, segment.as_str()),
        };
    }
    current
}
