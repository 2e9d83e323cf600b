use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use bincode::{Decode, Encode, config};
use compio::fs;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info, warn};

use crate::ext::PathExt;
use crate::filesystem::{DirectoryRecord, PersistedState, Tree};

pub const SNAPSHOT_VERSION: u32 = 1;
const COMPRESSION_LEVEL: i32 = 3;

/// A recorded directory. `path` is relative to the scan root and joined with
/// `/`; the root itself is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SnapshotDirectory {
    pub path: String,
    pub excluded: bool,
    pub files: Vec<String>,
}

/// The persisted record of one scan root.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Snapshot {
    version: u32,
    directories: Vec<SnapshotDirectory>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            directories: Vec::new(),
        }
    }
}

impl Snapshot {
    pub fn from_directories(directories: Vec<SnapshotDirectory>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            directories,
        }
    }

    /// Records every directory of a scanned tree, root included.
    pub fn record(tree: &Tree) -> Self {
        let directories = tree
            .walk_directories()
            .map(|id| SnapshotDirectory {
                path: tree.relative_segments(id).join("/"),
                excluded: false,
                files: tree
                    .directory(id)
                    .files()
                    .iter()
                    .map(|&file| tree.file(file).title().to_string())
                    .collect(),
            })
            .collect();
        Self::from_directories(directories)
    }

    pub fn directories(&self) -> &[SnapshotDirectory] {
        &self.directories
    }

    /// Marks the given root-relative directories as excluded. A directory with
    /// no record of its own gets one only when something below it was recorded;
    /// otherwise there is nothing to purge.
    pub fn apply_exclusions<S: AsRef<str>>(&mut self, excluded: &[S]) {
        for path in excluded {
            let key = path.as_ref().record_key();
            if key.is_empty() {
                warn!("Ignoring exclusion of the snapshot root");
                continue;
            }
            if let Some(record) = self.directories.iter_mut().find(|record| record.path == key) {
                record.excluded = true;
                continue;
            }

            let prefix = format!("{key}/");
            if self
                .directories
                .iter()
                .any(|record| record.path.starts_with(&prefix))
            {
                debug!("Marking unrecorded directory '{}' as excluded", key);
                self.directories.push(SnapshotDirectory {
                    path: key,
                    excluded: true,
                    files: Vec::new(),
                });
            }
        }
    }

    /// Indexed view used to rebuild the recorded tree.
    pub fn state(&self) -> SnapshotState<'_> {
        SnapshotState {
            snapshot: self,
            by_path: self
                .directories
                .iter()
                .map(|record| (record.path.as_str(), record))
                .collect(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let raw = bincode::encode_to_vec(self, config::standard()).context(EncodeSnafu)?;
        zstd::encode_all(raw.as_slice(), COMPRESSION_LEVEL).context(CompressSnafu)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let raw = zstd::decode_all(bytes).context(DecompressSnafu)?;
        let (snapshot, _): (Self, usize) =
            bincode::decode_from_slice(&raw, config::standard()).context(DecodeSnafu)?;
        ensure!(
            snapshot.version == SNAPSHOT_VERSION,
            VersionMismatchSnafu {
                found: snapshot.version
            }
        );
        Ok(snapshot)
    }
}

pub struct SnapshotState<'a> {
    snapshot: &'a Snapshot,
    by_path: HashMap<&'a str, &'a SnapshotDirectory>,
}

impl PersistedState for SnapshotState<'_> {
    fn directories(&self) -> Vec<DirectoryRecord> {
        self.snapshot
            .directories
            .iter()
            .map(|record| DirectoryRecord::new(&record.path, record.excluded))
            .collect()
    }

    fn belonging_items(&self, directory: &Path) -> Vec<String> {
        self.by_path
            .get(directory.record_key().as_str())
            .map(|record| record.files.clone())
            .unwrap_or_default()
    }
}

/// Reads and writes a [`Snapshot`] file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty record. A file that exists but cannot be
    /// decoded is an error, never an empty record.
    pub async fn read(&self) -> Result<Snapshot, SnapshotError> {
        debug!("Reading snapshot from {}", self.path.best_effort_path_display());
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No existing snapshot found, starting fresh");
                return Ok(Snapshot::default());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    path: self.path.clone(),
                });
            }
        };

        let snapshot = Snapshot::decode(&bytes)?;
        debug!(
            "Read snapshot with {} directories",
            snapshot.directories.len()
        );
        Ok(snapshot)
    }

    pub async fn write(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.context(WriteSnafu {
                path: parent.to_path_buf(),
            })?;
        }

        let bytes = snapshot.encode()?;
        let size = bytes.len();
        fs::write(&self.path, bytes).await.0.context(WriteSnafu {
            path: self.path.clone(),
        })?;
        info!(
            "Wrote snapshot to {} ({} bytes)",
            self.path.best_effort_path_display(),
            size
        );
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Failed to read snapshot {}", path.best_effort_path_display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to write snapshot {}", path.best_effort_path_display()))]
    WriteError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to decompress snapshot"))]
    DecompressError { source: io::Error },
    #[snafu(display("Failed to compress snapshot"))]
    CompressError { source: io::Error },
    #[snafu(display("Failed to decode snapshot"))]
    DecodeError { source: bincode::error::DecodeError },
    #[snafu(display("Failed to encode snapshot"))]
    EncodeError { source: bincode::error::EncodeError },
    #[snafu(display(
        "Snapshot version {} is not supported (expected {})",
        found,
        SNAPSHOT_VERSION
    ))]
    VersionMismatch { found: u32 },
}
