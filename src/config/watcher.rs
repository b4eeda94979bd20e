//! Config file watching for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors and
//! deploy tools often save by writing a sibling and renaming it over the
//! original, which replaces the watched inode. Events are filtered down to
//! the config file name.
//!
//! One save usually fires several events. A reload is only sent when the
//! validated config differs from the last one sent.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Sends a validated [`GatewayConfig`] each time the file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: GatewayConfig,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// `current` is the config already in effect, loaded from `path`.
    pub fn new(
        path: &Path,
        current: GatewayConfig,
    ) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Some(file_name) = self.path.file_name().map(OsString::from) else {
            return Err(notify::Error::path_not_found().add_path(self.path));
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let path = self.path;
        let tx = self.update_tx;
        let mut last = self.current;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };

                let touches_config = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(file_name.as_os_str()));
                if !touches_config || !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }

                match load_config(Some(&path)) {
                    Ok(next) if next == last => {}
                    Ok(next) => {
                        tracing::info!(
                            path = %path.display(),
                            backend_url = %next.upstream.backend_url,
                            "Config file changed"
                        );
                        last = next.clone();
                        let _ = tx.send(next);
                    }
                    // Mid-write states fail to parse; the final write fires again.
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring unreadable config, keeping current"
                    ),
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(directory = %dir.display(), "Config watcher started");
        Ok(watcher)
    }
}
