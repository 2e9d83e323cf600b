use std::fmt::Write as _;
use std::path::Path;

use colored::{Color, Colorize};

use crate::reconcile::{Change, ChangeKind, Diff, Stale};

/// Human readable summary of one reconciliation pass.
pub struct Report<'a> {
    diff: &'a Diff,
    stale: &'a Stale,
    root: &'a Path,
    use_color: bool,
}

impl<'a> Report<'a> {
    /// Paths are shown relative to `root` when they live below it.
    pub fn new(diff: &'a Diff, stale: &'a Stale, root: &'a Path) -> Self {
        Self {
            diff,
            stale,
            root,
            use_color: false,
        }
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.diff.is_empty() && self.stale.is_empty() {
            let _ = writeln!(out, "Up to date");
            return out;
        }

        for change in self.diff.iter() {
            let _ = writeln!(out, "{}", self.change_line(change));
        }
        for directory in &self.stale.directories {
            let _ = writeln!(out, "{}", self.stale_line("directory", directory));
        }
        for file in &self.stale.files {
            let _ = writeln!(out, "{}", self.stale_line("file", file));
        }

        let _ = writeln!(
            out,
            "{} changes, {} stale entries",
            self.diff.len(),
            self.stale.len()
        );
        out
    }

    fn change_line(&self, change: &Change) -> String {
        let (marker, color) = match change.kind {
            ChangeKind::DirectoryAdded | ChangeKind::FileAdded => ("+", Color::Green),
            ChangeKind::DirectoryRemoved | ChangeKind::FileRemoved => ("-", Color::Red),
            ChangeKind::DirectoryMoved | ChangeKind::FileMoved => ("~", Color::Yellow),
        };

        let mut line = format!(
            "{} {:<18} {}",
            marker,
            change.kind.to_string(),
            self.relative(&change.path1)
        );
        if let Some(path2) = &change.path2 {
            let _ = write!(line, " -> {}", self.relative(path2));
        }
        self.paint(line, color)
    }

    fn stale_line(&self, entity: &str, path: &Path) -> String {
        let line = format!(
            "! {:<18} {}",
            format!("stale {entity}"),
            self.relative(path)
        );
        self.paint(line, Color::Magenta)
    }

    fn paint(&self, line: String, color: Color) -> String {
        if self.use_color {
            line.as_str().color(color).to_string()
        } else {
            line
        }
    }

    fn relative(&self, path: &Path) -> String {
        let shown = path.strip_prefix(self.root).unwrap_or(path);
        shown.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::reconcile::Entity;

    #[test]
    fn empty_results_render_as_up_to_date() {
        let diff = Diff::default();
        let stale = Stale::default();

        assert_eq!(
            Report::new(&diff, &stale, Path::new("lib")).render(),
            "Up to date\n"
        );
    }

    #[test]
    fn changes_and_stale_entries_are_listed_relative_to_the_root() {
        let diff = Diff::from(vec![
            Change::new(ChangeKind::DirectoryAdded, "lib/new-dir"),
            Change::new(ChangeKind::FileRemoved, "lib/old.txt"),
            Change::moved(Entity::File, "lib/a/x.jpg", "lib/b/x.jpg"),
        ]);
        let stale = Stale {
            directories: vec![PathBuf::from("lib/private")],
            files: vec![PathBuf::from("lib/private/secret.txt")],
        };

        let rendered = Report::new(&diff, &stale, Path::new("lib")).render();

        assert_eq!(
            rendered.lines().collect::<Vec<_>>(),
            vec![
                "+ directory added    new-dir",
                "- file removed       old.txt",
                "~ file moved         a/x.jpg -> b/x.jpg",
                "! stale directory    private",
                "! stale file         private/secret.txt",
                "3 changes, 2 stale entries",
            ]
        );
    }

    #[test]
    fn paths_outside_the_root_are_shown_in_full() {
        let diff = Diff::from(vec![Change::new(ChangeKind::FileAdded, "/elsewhere/a.txt")]);
        let stale = Stale::default();

        let rendered = Report::new(&diff, &stale, Path::new("lib")).render();

        assert!(rendered.contains("/elsewhere/a.txt"));
    }

    #[test]
    fn colored_rendering_keeps_the_text() {
        let diff = Diff::from(vec![Change::new(ChangeKind::FileAdded, "lib/a.txt")]);
        let stale = Stale::default();

        let rendered = Report::new(&diff, &stale, Path::new("lib"))
            .with_color(true)
            .render();

        assert!(rendered.contains("file added"));
        assert!(rendered.contains("a.txt"));
    }
}
