use std::ffi::OsStr;
use std::path::PathBuf;

use derive_more::{Deref, Display, From};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Entity {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ChangeKind {
    #[display("directory added")]
    DirectoryAdded,
    #[display("directory removed")]
    DirectoryRemoved,
    #[display("directory moved")]
    DirectoryMoved,
    #[display("file added")]
    FileAdded,
    #[display("file removed")]
    FileRemoved,
    #[display("file moved")]
    FileMoved,
}

impl ChangeKind {
    pub fn added(entity: Entity) -> Self {
        match entity {
            Entity::Directory => ChangeKind::DirectoryAdded,
            Entity::File => ChangeKind::FileAdded,
        }
    }

    pub fn removed(entity: Entity) -> Self {
        match entity {
            Entity::Directory => ChangeKind::DirectoryRemoved,
            Entity::File => ChangeKind::FileRemoved,
        }
    }

    pub fn moved(entity: Entity) -> Self {
        match entity {
            Entity::Directory => ChangeKind::DirectoryMoved,
            Entity::File => ChangeKind::FileMoved,
        }
    }

    pub fn entity(self) -> Entity {
        match self {
            ChangeKind::DirectoryAdded
            | ChangeKind::DirectoryRemoved
            | ChangeKind::DirectoryMoved => Entity::Directory,
            ChangeKind::FileAdded | ChangeKind::FileRemoved | ChangeKind::FileMoved => Entity::File,
        }
    }
}

/// One difference between the live tree and the recorded one.
///
/// `path2` is only present on moves, where `path1` is the recorded location
/// and `path2` the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path1: PathBuf,
    pub path2: Option<PathBuf>,
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            path1: path.into(),
            path2: None,
            kind,
        }
    }

    pub fn moved(entity: Entity, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            path1: from.into(),
            path2: Some(to.into()),
            kind: ChangeKind::moved(entity),
        }
    }

    pub fn basename(&self) -> Option<&OsStr> {
        self.path1.file_name()
    }
}

/// Changes found by one comparison. Consumers must not rely on the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, From)]
pub struct Diff {
    changes: Vec<Change>,
}

impl Diff {
    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes
            .iter()
            .filter(|change| change.kind == kind)
            .count()
    }
}

/// Everything recorded at or below an excluded directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stale {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl Stale {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ChangeKind::DirectoryAdded, Entity::Directory)]
    #[case(ChangeKind::DirectoryMoved, Entity::Directory)]
    #[case(ChangeKind::FileRemoved, Entity::File)]
    #[case(ChangeKind::FileMoved, Entity::File)]
    fn kinds_know_their_entity(#[case] kind: ChangeKind, #[case] entity: Entity) {
        assert_eq!(kind.entity(), entity);
    }

    #[test]
    fn kinds_display_in_words() {
        assert_eq!(ChangeKind::DirectoryRemoved.to_string(), "directory removed");
        assert_eq!(ChangeKind::FileMoved.to_string(), "file moved");
    }

    #[test]
    fn move_carries_both_paths() {
        let change = Change::moved(Entity::File, "old/a.txt", "new/a.txt");

        assert_eq!(change.kind, ChangeKind::FileMoved);
        assert_eq!(change.path2, Some(PathBuf::from("new/a.txt")));
        assert_eq!(change.basename(), Some(OsStr::new("a.txt")));
    }

    #[test]
    fn diff_counts_by_kind() {
        let diff = Diff::from(vec![
            Change::new(ChangeKind::FileAdded, "a"),
            Change::new(ChangeKind::FileAdded, "b"),
            Change::new(ChangeKind::DirectoryRemoved, "c"),
        ]);

        assert_eq!(diff.len(), 3);
        assert_eq!(diff.count(ChangeKind::FileAdded), 2);
        assert_eq!(diff.count(ChangeKind::FileMoved), 0);
    }
}
