use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::config::ScanFilter;
use crate::ext::PathExt;

const CONFIG_FILE_NAME: &str = "scandiff.yaml";

const IGNORE_HIDDEN_KEY: &str = "ignore_hidden";
const IGNORE_KEY: &str = "ignore";
const EXCLUDE_KEY: &str = "exclude";

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Per-root scan settings read from `scandiff.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Skip entries whose name starts with a dot.
    pub ignore_hidden: bool,
    /// Glob patterns matched against entry names.
    pub ignore: Vec<String>,
    /// Root-relative directories the user no longer wants tracked.
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_hidden: true,
            ignore: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl ScanConfig {
    pub async fn read(root: &Path) -> Result<Self, ScanConfigError> {
        Self::from_path(get_config_file_path(root)).await
    }

    /// A missing file yields the defaults.
    pub async fn from_path(path: PathBuf) -> Result<Self, ScanConfigError> {
        debug!("Opening config file: {}", path.best_effort_path_display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    pub fn filter(&self, root: &Path, skip: Vec<PathBuf>) -> Result<ScanFilter, ScanConfigError> {
        ScanFilter::new(self, root, skip)
    }

    fn parse_top_level(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, ScanConfigError> {
        for key in top_level.keys() {
            match key.as_str() {
                Some(IGNORE_HIDDEN_KEY | IGNORE_KEY | EXCLUDE_KEY) => {}
                _ => warn!("Ignoring unknown config key: {:?}", key),
            }
        }

        let exclude = Self::parse_string_list(top_level, EXCLUDE_KEY)?;
        if let Some(entry) = exclude.iter().find(|entry| entry.name_segments().is_empty()) {
            return ExcludedRootSnafu {
                entry: entry.clone(),
            }
            .fail();
        }

        let defaults = Self::default();
        Ok(Self {
            ignore_hidden: Self::parse_bool(top_level, IGNORE_HIDDEN_KEY)?
                .unwrap_or(defaults.ignore_hidden),
            ignore: Self::parse_string_list(top_level, IGNORE_KEY)?,
            exclude,
        })
    }

    fn lookup<'a, 'input>(
        top_level: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
        key: &'static str,
    ) -> Option<&'a Yaml<'input>> {
        top_level
            .get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
            .filter(|value| !matches!(value, Yaml::Value(Scalar::Null)))
    }

    fn parse_bool(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<bool>, ScanConfigError> {
        match Self::lookup(top_level, key) {
            None => Ok(None),
            Some(Yaml::Value(Scalar::Boolean(value))) => Ok(Some(*value)),
            Some(_) => InvalidFieldSnafu {
                field: key,
                expected: "a boolean",
            }
            .fail(),
        }
    }

    fn parse_string_list(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Vec<String>, ScanConfigError> {
        let Some(value) = Self::lookup(top_level, key) else {
            return Ok(Vec::new());
        };
        let invalid = InvalidFieldSnafu {
            field: key,
            expected: "a list of strings",
        };

        value
            .as_sequence()
            .context(invalid)?
            .iter()
            .map(|item| item.as_str().map(str::to_string).context(invalid))
            .collect()
    }
}

impl TryFrom<&str> for ScanConfig {
    type Error = ScanConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents =
            Yaml::load_from_str(contents).map_err(|e| ScanConfigError::ParseError { source: e })?;
        let Some(document) = documents.first() else {
            return Ok(Self::default());
        };

        let top_level = document
            .as_mapping()
            .ok_or(ScanConfigError::TopLevelNotMap)?;
        Self::parse_top_level(top_level)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ScanConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The config file is not valid UTF-8: {}", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("'{}' should be {}", field, expected))]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[snafu(display("Exclusion '{}' names the scan root itself", entry))]
    ExcludedRoot { entry: String },
    #[snafu(display("Invalid ignore pattern '{}'", pattern))]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },
}
