use std::path::PathBuf;

/// Position of a directory inside the [`Tree`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirId(usize);

/// Position of a file inside the [`Tree`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    title: String,
    parent: Option<DirId>,
    directories: Vec<DirId>,
    files: Vec<FileId>,
    excluded: bool,
}

impl DirectoryNode {
    fn new(title: String, parent: Option<DirId>) -> Self {
        Self {
            title,
            parent,
            directories: Vec::new(),
            files: Vec::new(),
            excluded: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn parent(&self) -> Option<DirId> {
        self.parent
    }

    pub fn directories(&self) -> &[DirId] {
        &self.directories
    }

    pub fn files(&self) -> &[FileId] {
        &self.files
    }

    /// Only ever set on trees rebuilt from persisted records.
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    title: String,
    parent: DirId,
}

impl FileNode {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn parent(&self) -> DirId {
        self.parent
    }
}

/// Arena holding one directory hierarchy.
///
/// The tree owns every node; parents are referenced by id only, so a node's
/// full path is rebuilt by walking the parent chain up to the root, whose
/// title is the scan root path itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    directories: Vec<DirectoryNode>,
    files: Vec<FileNode>,
}

impl Tree {
    pub fn new(root_title: impl Into<String>) -> Self {
        Self {
            directories: vec![DirectoryNode::new(root_title.into(), None)],
            files: Vec::new(),
        }
    }

    pub fn root(&self) -> DirId {
        DirId(0)
    }

    pub fn directory(&self, id: DirId) -> &DirectoryNode {
        &self.directories[id.0]
    }

    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.0]
    }

    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn add_directory(&mut self, parent: DirId, title: impl Into<String>) -> DirId {
        let id = DirId(self.directories.len());
        self.directories
            .push(DirectoryNode::new(title.into(), Some(parent)));
        self.directories[parent.0].directories.push(id);
        id
    }

    pub fn add_file(&mut self, parent: DirId, title: impl Into<String>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(FileNode {
            title: title.into(),
            parent,
        });
        self.directories[parent.0].files.push(id);
        id
    }

    pub fn child_directory(&self, parent: DirId, title: &str) -> Option<DirId> {
        self.directory(parent)
            .directories
            .iter()
            .copied()
            .find(|&child| self.directory(child).title == title)
    }

    pub(crate) fn set_excluded(&mut self, id: DirId, excluded: bool) {
        self.directories[id.0].excluded = excluded;
    }

    /// Titles from just below the root down to `id`.
    pub fn relative_segments(&self, id: DirId) -> Vec<&str> {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent) = self.directory(current).parent {
            segments.push(self.directory(current).title());
            current = parent;
        }
        segments.reverse();
        segments
    }

    pub fn directory_path(&self, id: DirId) -> PathBuf {
        let mut path = PathBuf::from(self.directory(self.root()).title());
        path.extend(self.relative_segments(id));
        path
    }

    pub fn file_path(&self, id: FileId) -> PathBuf {
        let file = self.file(id);
        self.directory_path(file.parent).join(&file.title)
    }

    /// Pre-order walk over every directory, root first.
    pub fn walk_directories(&self) -> impl Iterator<Item = DirId> + '_ {
        let mut pending = vec![self.root()];
        std::iter::from_fn(move || {
            let id = pending.pop()?;
            pending.extend(self.directory(id).directories.iter().rev().copied());
            Some(id)
        })
    }
}
