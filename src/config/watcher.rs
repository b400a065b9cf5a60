//! Hot reload of the configuration file.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which save by rename still trigger a reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::SsrConfig;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Publishes every configuration that loads and validates after a file change.
pub struct ConfigWatcher {
    file: PathBuf,
    reloads: mpsc::UnboundedSender<SsrConfig>,
}

impl ConfigWatcher {
    pub fn new(file: &Path) -> (Self, mpsc::UnboundedReceiver<SsrConfig>) {
        let (reloads, updates) = mpsc::unbounded_channel();
        let watcher = Self {
            file: file.to_path_buf(),
            reloads,
        };
        (watcher, updates)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { file, reloads } = self;
        let watched_dir = file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let target = file.clone();

        let mut handle = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_file(&event, &target) => reload(&target, &reloads),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;
        handle.watch(&watched_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(file = %file.display(), "Watching configuration for changes");
        Ok(handle)
    }
}

fn reload(file: &Path, reloads: &mpsc::UnboundedSender<SsrConfig>) {
    match load_config(file) {
        Ok(config) => {
            tracing::info!(file = %file.display(), "Configuration reloaded");
            if reloads.send(config).is_err() {
                tracing::debug!("Configuration reload has no listener");
            }
        }
        Err(e) => {
            tracing::error!(file = %file.display(), error = %e, "Rejected configuration change; keeping current settings");
        }
    }
}

/// Whether a watch event writes or recreates `file`.
fn touches_file(event: &Event, file: &Path) -> bool {
    let writes = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_));
    writes
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == file.file_name())
}
