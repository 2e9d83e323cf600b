use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use snafu::{ResultExt, Snafu};
use tracing::{debug, info, trace};

use crate::ext::PathExt;
use crate::filesystem::Tree;

/// One entry returned by a [`DirectoryLister`].
///
/// `name` is the name as stored on disk. Node titles use its lossy UTF-8 form,
/// but paths handed to the filter and the lister are built from the real one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: OsString,
    pub is_dir: bool,
}

impl ListedEntry {
    pub fn directory(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

pub trait DirectoryLister {
    fn list(&self, path: &Path) -> io::Result<Vec<ListedEntry>>;
}

/// Lists directories on the local disk. Symlinks are reported as files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLister;

impl DirectoryLister for LocalLister {
    fn list(&self, path: &Path) -> io::Result<Vec<ListedEntry>> {
        fs::read_dir(path)?
            .map(|entry| {
                let entry = entry?;
                Ok(ListedEntry {
                    name: entry.file_name(),
                    is_dir: entry.file_type()?.is_dir(),
                })
            })
            .collect()
    }
}

/// Scans `root` on the local disk, visiting only entries accepted by `filter`.
pub fn build_from_path(
    root: &Path,
    filter: impl Fn(&Path) -> bool,
) -> Result<Tree, FsTreeError> {
    build_with_lister(&LocalLister, root, filter)
}

/// Builds a tree out of whatever `lister` reports, starting at `root`.
///
/// The first listing failure aborts the build. A partial tree compared
/// against a full record would turn every unvisited path into a removal.
pub fn build_with_lister(
    lister: &impl DirectoryLister,
    root: &Path,
    filter: impl Fn(&Path) -> bool,
) -> Result<Tree, FsTreeError> {
    let mut tree = Tree::new(root.to_string_lossy());
    let mut pending = vec![(tree.root(), root.to_path_buf())];

    while let Some((directory, directory_path)) = pending.pop() {
        debug!("Listing {}", directory_path.display());
        let entries = lister.list(&directory_path).context(ListSnafu {
            path: directory_path.clone(),
        })?;

        for entry in entries {
            let entry_path = directory_path.join(&entry.name);
            if !filter(&entry_path) {
                trace!("Skipping filtered entry {}", entry_path.display());
                continue;
            }

            let title = entry.name.to_string_lossy();
            if entry.is_dir {
                let child = tree.add_directory(directory, title);
                pending.push((child, entry_path));
            } else {
                tree.add_file(directory, title);
            }
        }
    }

    info!(
        "Scanned {}: {} directories, {} files",
        root.display(),
        tree.directory_count(),
        tree.file_count()
    );
    Ok(tree)
}

#[derive(Debug, Snafu)]
pub enum FsTreeError {
    #[snafu(display("Failed to list directory {}", path.best_effort_path_display()))]
    ListError { path: PathBuf, source: io::Error },
}
