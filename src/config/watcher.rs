//! Configuration file watcher for hot reload of the routing table.
//!
//! # Design Decisions
//! - Watches the parent directory, not the file. Editors save by renaming a
//!   temp file over the original, which would orphan a watch on the file itself
//! - Events are debounced until the file has been quiet for `SETTLE`, so a
//!   rewrite is read once, after the new content is in place
//! - An empty file is a save in progress, never a config: it is skipped

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::ProxyConfig;

/// Quiet period after the last file event before the file is read.
const SETTLE: Duration = Duration::from_millis(300);

/// Watches the configuration file and emits every valid new version.
///
/// Invalid edits are logged and dropped so the live table stays in place.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ProxyConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path` and the receiver its updates arrive on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ProxyConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Must be called within a Tokio runtime.
    ///
    /// The returned handle must be kept alive; dropping it stops the watcher
    /// and its debounce task.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;

        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_file(&event, &file_name) => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tokio::spawn(debounce(path.clone(), event_rx, update_tx));

        tracing::info!(path = %path.display(), dir = %dir.display(), "Config watcher started");
        Ok(watcher)
    }
}

fn touches_file(event: &Event, file_name: &OsString) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

async fn debounce(
    path: PathBuf,
    mut events: mpsc::UnboundedReceiver<()>,
    update_tx: mpsc::UnboundedSender<ProxyConfig>,
) {
    while events.recv().await.is_some() {
        loop {
            match tokio::time::timeout(SETTLE, events.recv()).await {
                Ok(Some(())) => continue,
                // Watcher dropped.
                Ok(None) => return,
                Err(_) => break,
            }
        }
        reload(&path, &update_tx);
    }
}

fn reload(path: &Path, update_tx: &mpsc::UnboundedSender<ProxyConfig>) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Failed to read config; keeping current routing table"
            );
            return;
        }
    };

    if content.trim().is_empty() {
        tracing::warn!(path = %path.display(), "Config file is empty; keeping current routing table");
        return;
    }

    match parse_config(&content) {
        Ok(config) => {
            tracing::info!(
                path = %path.display(),
                domains = config.domains.len(),
                "Config file changed, routing table reload queued"
            );
            if update_tx.send(config).is_err() {
                tracing::debug!("Config update receiver dropped");
            }
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Failed to reload config; keeping current routing table"
            );
        }
    }
}
