use std::path::PathBuf;

use hashlink::LinkedHashMap;
use tracing::debug;

use crate::filesystem::{DirId, Tree};
use crate::reconcile::{Change, ChangeKind, Diff, detect_moves};

/// Compares the live tree against the recorded one, pairing up renames and
/// moves. A missing `db` means nothing was recorded yet.
pub fn compare(fs: &Tree, db: Option<&Tree>) -> Diff {
    detect_moves(compare_raw(fs, db))
}

/// Structural comparison without move detection.
///
/// New directories are walked so every descendant is reported as added.
/// Removed directories are reported once; whatever was below them is implied.
pub fn compare_raw(fs: &Tree, db: Option<&Tree>) -> Diff {
    let mut changes = Vec::new();
    let mut pending = vec![(fs.root(), db.map(Tree::root))];

    while let Some((fs_directory, db_directory)) = pending.pop() {
        match (db, db_directory) {
            (Some(db), Some(db_directory)) => compare_directories(
                fs,
                fs_directory,
                db,
                db_directory,
                &mut changes,
                &mut pending,
            ),
            _ => enumerate_added(fs, fs_directory, &mut changes, &mut pending),
        }
    }

    debug!("Raw comparison produced {} changes", changes.len());
    Diff::from(changes)
}

type Pending = Vec<(DirId, Option<DirId>)>;

fn compare_directories(
    fs: &Tree,
    fs_directory: DirId,
    db: &Tree,
    db_directory: DirId,
    changes: &mut Vec<Change>,
    pending: &mut Pending,
) {
    let fs_children = directories_by_title(fs, fs_directory);
    let db_children = directories_by_title(db, db_directory);

    for (title, &fs_child) in &fs_children {
        match db_children.get(title) {
            Some(&db_child) => pending.push((fs_child, Some(db_child))),
            None => {
                changes.push(Change::new(
                    ChangeKind::DirectoryAdded,
                    fs.directory_path(fs_child),
                ));
                pending.push((fs_child, None));
            }
        }
    }
    for (title, &db_child) in &db_children {
        if !fs_children.contains_key(title) {
            changes.push(Change::new(
                ChangeKind::DirectoryRemoved,
                db.directory_path(db_child),
            ));
        }
    }

    let files = partition_files(fs, fs_directory, db, db_directory);
    changes.extend(
        files
            .fs_only
            .into_iter()
            .map(|path| Change::new(ChangeKind::FileAdded, path)),
    );
    changes.extend(
        files
            .db_only
            .into_iter()
            .map(|path| Change::new(ChangeKind::FileRemoved, path)),
    );
}

fn enumerate_added(fs: &Tree, directory: DirId, changes: &mut Vec<Change>, pending: &mut Pending) {
    let node = fs.directory(directory);
    for &child in node.directories() {
        changes.push(Change::new(
            ChangeKind::DirectoryAdded,
            fs.directory_path(child),
        ));
        pending.push((child, None));
    }
    for &file in node.files() {
        changes.push(Change::new(ChangeKind::FileAdded, fs.file_path(file)));
    }
}

fn directories_by_title(tree: &Tree, directory: DirId) -> LinkedHashMap<&str, DirId> {
    tree.directory(directory)
        .directories()
        .iter()
        .map(|&child| (tree.directory(child).title(), child))
        .collect()
}

/// Files of one directory pair, split by which side they exist on. Files
/// present on both sides are unchanged; existence is the only criterion.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct FilePartition {
    pub fs_only: Vec<PathBuf>,
    pub db_only: Vec<PathBuf>,
}

pub(crate) fn partition_files(
    fs: &Tree,
    fs_directory: DirId,
    db: &Tree,
    db_directory: DirId,
) -> FilePartition {
    let fs_files: LinkedHashMap<&str, _> = fs
        .directory(fs_directory)
        .files()
        .iter()
        .map(|&file| (fs.file(file).title(), file))
        .collect();
    let db_files: LinkedHashMap<&str, _> = db
        .directory(db_directory)
        .files()
        .iter()
        .map(|&file| (db.file(file).title(), file))
        .collect();

    let mut partition = FilePartition::default();
    for (title, &file) in &fs_files {
        if !db_files.contains_key(title) {
            partition.fs_only.push(fs.file_path(file));
        }
    }
    for (title, &file) in &db_files {
        if !fs_files.contains_key(title) {
            partition.db_only.push(db.file_path(file));
        }
    }
    partition
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::*;
    use crate::filesystem::{DirectoryRecord, build_from_db};
    use crate::reconcile::Entity;

    /// Builds a tree from `/`-separated paths; a trailing `/` marks a directory.
    fn tree(paths: &[&str]) -> Tree {
        let mut tree = Tree::new("root");
        for path in paths {
            let is_directory = path.ends_with('/');
            let segments = path.trim_end_matches('/').split('/').collect::<Vec<_>>();
            let (leaf, parents) = segments.split_last().unwrap();
            let mut current = tree.root();
            for segment in parents {
                current = match tree.child_directory(current, segment) {
                    Some(existing) => existing,
                    None => tree.add_directory(current, *segment),
                };
            }
            if is_directory {
                if tree.child_directory(current, leaf).is_none() {
                    tree.add_directory(current, *leaf);
                }
            } else {
                tree.add_file(current, *leaf);
            }
        }
        tree
    }

    fn sorted(diff: Diff) -> Vec<Change> {
        let mut changes = diff.into_changes();
        changes.sort_by(|a, b| a.path1.cmp(&b.path1));
        changes
    }

    const LIBRARY: &[&str] = &[
        "photos/trip/beach.jpg",
        "photos/trip/sunset.jpg",
        "photos/portrait.png",
        "music/",
        "notes.txt",
    ];

    #[rstest]
    #[case(&[])]
    #[case(&["only.txt"])]
    #[case(LIBRARY)]
    fn identical_trees_have_no_changes(#[case] paths: &[&str]) {
        assert!(compare(&tree(paths), Some(&tree(paths))).is_empty());
    }

    #[test]
    fn absent_record_reports_every_node_as_added() {
        let fs = tree(LIBRARY);

        let diff = compare(&fs, None);

        assert_eq!(diff.len(), (fs.directory_count() - 1) + fs.file_count());
        assert_eq!(diff.count(ChangeKind::DirectoryAdded), 3);
        assert_eq!(diff.count(ChangeKind::FileAdded), 4);
        assert!(diff.iter().all(|change| change.path2.is_none()));
    }

    #[test]
    fn new_empty_directory_is_a_single_addition() {
        let mut with_new = LIBRARY.to_vec();
        with_new.push("new-dir/");

        let diff = compare(&tree(&with_new), Some(&tree(LIBRARY)));

        assert_eq!(
            diff.into_changes(),
            vec![Change::new(ChangeKind::DirectoryAdded, "root/new-dir")]
        );
    }

    #[test]
    fn new_directory_reports_its_whole_subtree() {
        let diff = compare(
            &tree(&["kept.txt", "fresh/inner/a.txt", "fresh/b.txt"]),
            Some(&tree(&["kept.txt"])),
        );

        assert_eq!(
            sorted(diff),
            vec![
                Change::new(ChangeKind::DirectoryAdded, "root/fresh"),
                Change::new(ChangeKind::FileAdded, "root/fresh/b.txt"),
                Change::new(ChangeKind::DirectoryAdded, "root/fresh/inner"),
                Change::new(ChangeKind::FileAdded, "root/fresh/inner/a.txt"),
            ]
        );
    }

    #[test]
    fn removed_directory_is_reported_once() {
        let diff = compare(
            &tree(&["music/"]),
            Some(&tree(&["music/", "photos/trip/beach.jpg", "photos/cover.png"])),
        );

        assert_eq!(
            diff.into_changes(),
            vec![Change::new(ChangeKind::DirectoryRemoved, "root/photos")]
        );
    }

    #[test]
    fn renamed_leaf_directory_is_a_single_move() {
        let diff = compare(
            &tree(&["photos/holiday/", "photos/cover.png", "music/"]),
            Some(&tree(&["photos/trip/", "photos/cover.png", "music/"])),
        );

        assert_eq!(
            diff.into_changes(),
            vec![Change::moved(
                Entity::Directory,
                "root/photos/trip",
                "root/photos/holiday"
            )]
        );
    }

    #[test]
    fn directory_moved_to_another_parent_is_a_single_move() {
        let diff = compare(
            &tree(&["archive/trip/", "photos/"]),
            Some(&tree(&["archive/", "photos/trip/"])),
        );

        assert_eq!(
            diff.into_changes(),
            vec![Change::moved(
                Entity::Directory,
                "root/photos/trip",
                "root/archive/trip"
            )]
        );
    }

    #[test]
    fn file_moved_to_another_parent_is_a_single_move() {
        let diff = compare(
            &tree(&["a/", "b/report.pdf"]),
            Some(&tree(&["a/report.pdf", "b/"])),
        );

        assert_eq!(
            diff.into_changes(),
            vec![Change::moved(Entity::File, "root/a/report.pdf", "root/b/report.pdf")]
        );
    }

    #[test]
    fn file_moved_up_one_level_matches_recorded_layout() {
        let records = ["1", "1/2", "1/2/3", "1/2/3/4", "1/2/3.1", "1/2/3.2"]
            .map(|path| DirectoryRecord::new(path, false));
        let db = build_from_db("root", records, |path| {
            if path == Path::new("1/2/3/4") {
                vec!["file4-3".to_string()]
            } else {
                Vec::new()
            }
        });
        let fs = tree(&["1/2/3/4/", "1/2/3/file4-3", "1/2/3.1/", "1/2/3.2/"]);

        let diff = compare(&fs, Some(&db));

        assert_eq!(
            diff.into_changes(),
            vec![Change {
                path1: PathBuf::from("root/1/2/3/4/file4-3"),
                path2: Some(PathBuf::from("root/1/2/3/file4-3")),
                kind: ChangeKind::FileMoved,
            }]
        );
    }

    #[test]
    fn added_and_removed_files_in_the_same_directory() {
        let diff = compare(
            &tree(&["docs/new.md", "docs/same.md"]),
            Some(&tree(&["docs/old.md", "docs/same.md"])),
        );

        assert_eq!(
            sorted(diff),
            vec![
                Change::new(ChangeKind::FileAdded, "root/docs/new.md"),
                Change::new(ChangeKind::FileRemoved, "root/docs/old.md"),
            ]
        );
    }

    #[test]
    fn raw_comparison_keeps_moves_as_add_and_remove() {
        let diff = compare_raw(&tree(&["b/x.txt", "a/"]), Some(&tree(&["a/x.txt", "b/"])));

        assert_eq!(diff.count(ChangeKind::FileAdded), 1);
        assert_eq!(diff.count(ChangeKind::FileRemoved), 1);
    }

    #[test]
    fn recorded_only_file_is_partitioned_as_removed_not_added() {
        let fs = tree(&["dir/live.txt", "dir/both.txt"]);
        let db = tree(&["dir/recorded.txt", "dir/both.txt"]);
        let fs_dir = fs.child_directory(fs.root(), "dir").unwrap();
        let db_dir = db.child_directory(db.root(), "dir").unwrap();

        let partition = partition_files(&fs, fs_dir, &db, db_dir);

        assert_eq!(
            partition,
            FilePartition {
                fs_only: vec![PathBuf::from("root/dir/live.txt")],
                db_only: vec![PathBuf::from("root/dir/recorded.txt")],
            }
        );
    }
}
