//! Workspace save watcher.
//!
//! Wraps a `notify` watcher on the workspace root and forwards create and
//! modify events for `.tex` files over a channel. Events for the same path
//! inside a short window collapse to one, so a build touching aux files or
//! the pipeline's own rewrite cannot start an event storm.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Window within which repeated events for one path are collapsed.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Streams saved `.tex` paths from a workspace.
pub struct SaveWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<PathBuf>,
    last_seen: HashMap<PathBuf, Instant>,
}

impl SaveWatcher {
    /// Start watching a workspace root recursively.
    pub fn new(root: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                        for path in event.paths {
                            if path.extension().and_then(|s| s.to_str()) == Some("tex") {
                                let _ = tx.send(path);
                            }
                        }
                    }
                }
                Err(e) => {
                    log::warn!("File watcher error: {}", e);
                }
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;

        Ok(Self {
            _watcher: watcher,
            rx,
            last_seen: HashMap::new(),
        })
    }

    /// Next saved `.tex` path, debounced. `None` when the watcher is gone.
    pub async fn next_save(&mut self) -> Option<PathBuf> {
        while let Some(path) = self.rx.recv().await {
            let now = Instant::now();
            if let Some(prev) = self.last_seen.get(&path) {
                if now.duration_since(*prev) < DEBOUNCE_WINDOW {
                    log::debug!("Debounced event for {}", path.display());
                    continue;
                }
            }
            self.last_seen.insert(path.clone(), now);
            return Some(path);
        }
        None
    }
}
