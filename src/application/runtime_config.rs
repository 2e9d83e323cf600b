use std::path::PathBuf;

use scandiff::ext::lexical_absolute;

use crate::application::data::ColorChoice;
use crate::cli::Cli;

const STATE_DIR_NAME: &str = ".scandiff";
const STATE_FILE_NAME: &str = "state.bin.zst";

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub state_path: PathBuf,
    pub record: bool,
    pub color: ColorChoice,
}

impl RuntimeConfig {
    /// Paths the scan must never report: the snapshot file and, when it has a
    /// directory of its own inside the root, that directory.
    pub fn skipped_paths(&self) -> Vec<PathBuf> {
        let mut skipped = vec![self.state_path.clone()];
        if let Some(state_dir) = self
            .state_path
            .parent()
            .filter(|state_dir| lexical_absolute(state_dir) != lexical_absolute(&self.root))
        {
            skipped.push(state_dir.to_path_buf());
        }
        skipped
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let state_path = cli
            .state
            .unwrap_or_else(|| cli.root.join(STATE_DIR_NAME).join(STATE_FILE_NAME));
        Self {
            root: cli.root,
            state_path,
            record: cli.record,
            color: cli.color,
        }
    }
}
