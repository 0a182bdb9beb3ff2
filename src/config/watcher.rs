//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself, so
//! editors that save by renaming a temp file over the original still
//! trigger a reload.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::SnapConfig;

/// Emits each valid, changed version of a theme config file.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<SnapConfig>,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<SnapConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let current = Mutex::new(load_config(&path).ok());
        let target = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Config watch error");
                        return;
                    }
                };
                if !touches(&event, &target) {
                    return;
                }

                let config = match load_config(&target) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::error!(error = %e, "Config reload rejected, keeping current configuration");
                        return;
                    }
                };

                let Ok(mut last) = current.lock() else {
                    return;
                };
                if last.as_ref() == Some(&config) {
                    tracing::trace!("Config unchanged");
                    return;
                }
                *last = Some(config.clone());
                tracing::info!(path = %target.display(), "Config reloaded");
                let _ = update_tx.send(config);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Whether `event` writes to the file at `target`.
fn touches(event: &Event, target: &Path) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    let name = target.file_name();
    event
        .paths
        .iter()
        .any(|p| p == target || (name.is_some() && p.file_name() == name))
}
