use tracing::debug;

use crate::filesystem::Tree;
use crate::reconcile::Stale;

/// Collects every recorded directory and file at or below an excluded
/// directory. Flags further down an excluded subtree are irrelevant.
pub fn find_stale(db: &Tree) -> Stale {
    let mut stale = Stale::default();
    let mut pending = vec![(db.root(), false)];

    while let Some((directory, inside_excluded)) = pending.pop() {
        let node = db.directory(directory);
        let excluded = inside_excluded || node.is_excluded();

        if excluded {
            stale.directories.push(db.directory_path(directory));
            stale
                .files
                .extend(node.files().iter().map(|&file| db.file_path(file)));
        }
        pending.extend(
            node.directories()
                .iter()
                .rev()
                .map(|&child| (child, excluded)),
        );
    }

    debug!(
        "Found {} stale directories and {} stale files",
        stale.directories.len(),
        stale.files.len()
    );
    stale
}
