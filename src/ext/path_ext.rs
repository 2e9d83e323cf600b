use std::path::{Component, Path, PathBuf};

/// Renders a path for log and error messages, preferring the canonical form and
/// falling back to a lexically normalized absolute path when the target is gone.
pub fn best_effort_path_display(path: &Path) -> String {
    if let Ok(canonical) = path.canonicalize() {
        return canonical.display().to_string();
    }

    lexical_absolute(path).display().to_string()
}

/// Absolute form of `path` with `.` and `..` resolved lexically. Symlinks are
/// not followed, so the result is comparable with paths joined onto a root.
pub fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|current_dir| current_dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    normalize_path(&absolute)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(components.last(), None | Some(Component::RootDir)) {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

pub trait PathExt {
    fn best_effort_path_display(&self) -> String;

    /// Plain name segments of a relative record path. `.`, leading `/` and
    /// prefixes carry no tree position and are dropped.
    fn name_segments(&self) -> Vec<String>;

    /// Segments joined with `/`, the key format used by persisted records.
    fn record_key(&self) -> String {
        self.name_segments().join("/")
    }
}

impl PathExt for Path {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }

    fn name_segments(&self) -> Vec<String> {
        self.components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }
}

impl PathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        self.as_path().best_effort_path_display()
    }

    fn name_segments(&self) -> Vec<String> {
        self.as_path().name_segments()
    }
}

impl PathExt for str {
    fn best_effort_path_display(&self) -> String {
        Path::new(self).best_effort_path_display()
    }

    fn name_segments(&self) -> Vec<String> {
        Path::new(self).name_segments()
    }
}
