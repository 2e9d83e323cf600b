use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use scandiff::config::{ScanConfig, ScanConfigError};
use scandiff::filesystem::{self, FsTreeError, Tree};
use scandiff::reconcile::{Diff, Stale, compare, find_stale};
use scandiff::report::Report;
use scandiff::store::{Snapshot, SnapshotError, SnapshotStore};

use crate::application::RuntimeConfig;

pub struct Application;

/// Outcome of comparing the root against its snapshot.
struct Reconciliation {
    fs_tree: Tree,
    diff: Diff,
    stale: Stale,
}

impl Application {
    /// Runs one reconciliation pass over the configured root.
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let Reconciliation {
            fs_tree,
            diff,
            stale,
        } = Self::reconcile(&app_config).await?;

        let use_color = app_config.color.use_color();
        colored::control::set_override(use_color);
        print!(
            "{}",
            Report::new(&diff, &stale, &app_config.root)
                .with_color(use_color)
                .render()
        );

        if app_config.record {
            info!("Recording scanned tree");
            SnapshotStore::new(&app_config.state_path)
                .write(&Snapshot::record(&fs_tree))
                .await
                .context(SnapshotSnafu)?;
        }

        Ok(())
    }

    async fn reconcile(app_config: &RuntimeConfig) -> Result<Reconciliation, ApplicationError> {
        let config = ScanConfig::read(&app_config.root)
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        let filter = config
            .filter(&app_config.root, app_config.skipped_paths())
            .context(ConfigSnafu)?;
        let fs_tree = filesystem::build_from_path(&app_config.root, |path| filter.accepts(path))
            .context(ScanSnafu)?;

        let mut snapshot = SnapshotStore::new(&app_config.state_path)
            .read()
            .await
            .context(SnapshotSnafu)?;
        snapshot.apply_exclusions(config.exclude.as_slice());

        let root_title = fs_tree.directory(fs_tree.root()).title().to_string();
        let db_tree = filesystem::build_from_state(root_title, &snapshot.state());

        let diff = compare(&fs_tree, Some(&db_tree));
        let stale = find_stale(&db_tree);
        info!(
            "Found {} changes and {} stale entries",
            diff.len(),
            stale.len()
        );

        Ok(Reconciliation {
            fs_tree,
            diff,
            stale,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ScanConfigError },
    #[snafu(display("Critical failure encountered while scanning the root"))]
    ScanError { source: FsTreeError },
    #[snafu(display("Critical failure encountered while accessing the snapshot"))]
    SnapshotError { source: SnapshotError },
}
