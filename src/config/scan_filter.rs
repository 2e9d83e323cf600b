use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use snafu::ResultExt;

use tracing::debug;

use crate::config::{InvalidPatternSnafu, ScanConfig, ScanConfigError};
use crate::ext::{PathExt, lexical_absolute};

/// Decides which entries a scan visits.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    root: PathBuf,
    ignore_hidden: bool,
    ignore: GlobSet,
    /// Root-relative name segments of every skipped entry.
    skip: Vec<Vec<String>>,
}

impl ScanFilter {
    /// `skip` lists paths that are never visited, e.g. the snapshot file. They
    /// may be spelled differently from `root` (relative, with `.` or `..`);
    /// paths outside the root can never be visited and are dropped.
    /// Configured exclusions are resolved against `root` and skipped as well.
    pub fn new(
        config: &ScanConfig,
        root: &Path,
        skip: Vec<PathBuf>,
    ) -> Result<Self, ScanConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignore {
            builder.add(Glob::new(pattern).context(InvalidPatternSnafu {
                pattern: pattern.clone(),
            })?);
        }
        let ignore = builder.build().context(InvalidPatternSnafu {
            pattern: config.ignore.join(", "),
        })?;

        let absolute_root = lexical_absolute(root);
        let mut skip_segments = Vec::new();
        for path in &skip {
            match lexical_absolute(path).strip_prefix(&absolute_root) {
                Ok(relative) => skip_segments.push(relative.name_segments()),
                Err(_) => debug!("{} lies outside the scan root", path.display()),
            }
        }
        skip_segments.extend(config.exclude.iter().map(|excluded| excluded.name_segments()));

        Ok(Self {
            root: root.to_path_buf(),
            ignore_hidden: config.ignore_hidden,
            ignore,
            skip: skip_segments,
        })
    }

    /// `path` is expected to be `root` joined with the entry's relative path,
    /// as the scan produces it.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.is_skipped(path) {
            return false;
        }

        let Some(name) = path.file_name() else {
            return true;
        };
        if self.ignore_hidden && name.to_string_lossy().starts_with('.') {
            return false;
        }
        !self.ignore.is_match(name)
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let segments = relative.name_segments();
        self.skip.iter().any(|skipped| *skipped == segments)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn filter(config: ScanConfig) -> ScanFilter {
        ScanFilter::new(
            &config,
            Path::new("/lib"),
            vec![PathBuf::from("/lib/state.bin")],
        )
        .unwrap()
    }

    #[rstest]
    #[case("/lib/.git", false)]
    #[case("/lib/photos/.DS_Store", false)]
    #[case("/lib/photos/cover.jpg", true)]
    #[case("/lib/state.bin", false)]
    fn defaults_skip_hidden_entries(#[case] path: &str, #[case] accepted: bool) {
        assert_eq!(filter(ScanConfig::default()).accepts(Path::new(path)), accepted);
    }

    #[test]
    fn hidden_entries_can_be_included() {
        let filter = filter(ScanConfig {
            ignore_hidden: false,
            ..ScanConfig::default()
        });

        assert!(filter.accepts(Path::new("/lib/.config")));
    }

    #[rstest]
    #[case("/lib/a/draft.tmp", false)]
    #[case("/lib/a/Thumbs.db", false)]
    #[case("/lib/a/final.txt", true)]
    fn ignore_globs_match_entry_names(#[case] path: &str, #[case] accepted: bool) {
        let filter = filter(ScanConfig {
            ignore: vec!["*.tmp".into(), "Thumbs.db".into()],
            ..ScanConfig::default()
        });

        assert_eq!(filter.accepts(Path::new(path)), accepted);
    }

    #[test]
    fn excluded_directories_are_not_visited() {
        let filter = filter(ScanConfig {
            exclude: vec!["archive/old/".into()],
            ..ScanConfig::default()
        });

        assert!(!filter.accepts(Path::new("/lib/archive/old")));
        assert!(filter.accepts(Path::new("/lib/archive")));
        assert!(filter.accepts(Path::new("/lib/old")));
    }

    #[rstest]
    #[case("./lib", "lib/.scandiff/state.bin")]
    #[case("lib", "./lib/.scandiff/state.bin")]
    #[case("lib", "lib/other/../.scandiff/state.bin")]
    fn skipped_paths_match_however_they_are_spelled(#[case] root: &str, #[case] state: &str) {
        let filter = ScanFilter::new(
            &ScanConfig {
                ignore_hidden: false,
                ..ScanConfig::default()
            },
            Path::new(root),
            vec![PathBuf::from(state)],
        )
        .unwrap();

        assert!(!filter.accepts(&Path::new(root).join(".scandiff").join("state.bin")));
        assert!(filter.accepts(&Path::new(root).join(".scandiff")));
    }

    #[test]
    fn skipped_paths_outside_the_root_are_ignored() {
        let filter = ScanFilter::new(
            &ScanConfig::default(),
            Path::new("/lib"),
            vec![PathBuf::from("/elsewhere/state.bin")],
        )
        .unwrap();

        assert!(filter.accepts(Path::new("/lib/state.bin")));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let result = ScanFilter::new(
            &ScanConfig {
                ignore: vec!["[unclosed".into()],
                ..ScanConfig::default()
            },
            Path::new("/lib"),
            Vec::new(),
        );

        assert!(matches!(
            result,
            Err(ScanConfigError::InvalidPattern { pattern, .. }) if pattern == "[unclosed"
        ));
    }
}
