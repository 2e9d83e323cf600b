use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{ColorChoice, LogLevel};

/// Reports what changed in a directory tree since it was last recorded.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// The root directory to reconcile
    #[clap(default_value = ".")]
    pub root: PathBuf,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Snapshot file holding the last recorded tree [default: <ROOT>/.scandiff/state.bin.zst]
    #[clap(long, short)]
    pub state: Option<PathBuf>,

    /// Record the scanned tree as the new snapshot after reporting
    #[clap(long, short)]
    pub record: bool,

    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,
}
