use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Collapses a burst of raw filesystem events into one fire per quiet window.
/// Every observed event cancels the pending fire and schedules a new one, so
/// N events inside the window produce exactly one fire, after the burst ends.
/// The pending sleep task is the only cancellable scheduled work in the crate.
pub struct Debouncer {
    window: Duration,
    fire_tx: mpsc::UnboundedSender<()>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration, fire_tx: mpsc::UnboundedSender<()>) -> Self {
        Self {
            window,
            fire_tx,
            pending: None,
        }
    }

    pub fn observe(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let window = self.window;
        let fire_tx = self.fire_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = fire_tx.send(());
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

/// Watches the transcript root for write-class events and fires debounced
/// refresh triggers into `fire_tx`.
///
/// The OS watch handle is owned exclusively here; [`restart`] drops it before
/// establishing the replacement, so reconfiguring the root at runtime cannot
/// leak descriptors.
///
/// [`restart`]: ChangeMonitor::restart
pub struct ChangeMonitor {
    watcher: Option<RecommendedWatcher>,
    raw_tx: mpsc::UnboundedSender<()>,
    root: PathBuf,
}

impl ChangeMonitor {
    /// Start watching `root`. Returns `None` (unavailable, not a crash) when
    /// the root does not exist or the watch cannot be established.
    pub fn start(
        root: &Path,
        window: Duration,
        fire_tx: mpsc::UnboundedSender<()>,
    ) -> Option<Self> {
        if !root.is_dir() {
            warn!("Change monitor unavailable: {:?} is not a directory", root);
            return None;
        }

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<()>();

        // Bridge raw events into the debouncer on the runtime; the notify
        // callback runs on the watcher's own thread.
        tokio::spawn(async move {
            let mut debouncer = Debouncer::new(window, fire_tx);
            while raw_rx.recv().await.is_some() {
                debouncer.observe();
            }
        });

        let watcher = match attach_watcher(root, raw_tx.clone()) {
            Ok(watcher) => watcher,
            Err(e) => {
                warn!("Change monitor unavailable for {:?}: {}", root, e);
                return None;
            }
        };
        info!("Watching {:?} for transcript changes", root);

        Some(Self {
            watcher: Some(watcher),
            raw_tx,
            root: root.to_path_buf(),
        })
    }

    /// Re-point the monitor at a new root. The previous OS watch handle is
    /// fully released before the new one is created. Returns false when the
    /// new root cannot be watched; the monitor is then dormant until the
    /// next successful restart.
    pub fn restart(&mut self, new_root: &Path) -> bool {
        self.watcher = None; // drop the old handle first

        if !new_root.is_dir() {
            warn!("Cannot watch {:?}: not a directory", new_root);
            return false;
        }
        match attach_watcher(new_root, self.raw_tx.clone()) {
            Ok(watcher) => {
                self.watcher = Some(watcher);
                self.root = new_root.to_path_buf();
                info!("Now watching {:?}", new_root);
                true
            }
            Err(e) => {
                warn!("Failed to watch {:?}: {}", new_root, e);
                false
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

fn attach_watcher(
    root: &Path,
    raw_tx: mpsc::UnboundedSender<()>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |result: Result<Event, notify::Error>| match result {
            Ok(event) if is_write_event(&event) => {
                let _ = raw_tx.send(());
            }
            Ok(_) => {}
            Err(e) => error!("File watcher error: {:?}", e),
        },
        Config::default(),
    )?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    Ok(watcher)
}

fn is_write_event(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
