use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::info;

use crate::cache::SessionCache;
use crate::config::Config;
use crate::gitmeta::{GitProbe, SystemGit};
use crate::model::{Message, Session};
use crate::monitor::ChangeMonitor;
use crate::pipeline::{PipelineStatus, RefreshHandle};

/// Facade over the whole refresh machinery: cache + refresh actor + change
/// monitor + periodic safety-net timer. This is the surface consumed by the
/// HTTP gateway and by any embedding UI layer; it only produces data and
/// accepts triggers, it never renders anything.
pub struct TranscriptService {
    cache: Arc<SessionCache>,
    refresh: RefreshHandle,
    monitor: Mutex<Option<ChangeMonitor>>,
    debounce: Duration,
    fire_tx: mpsc::UnboundedSender<()>,
}

impl TranscriptService {
    /// Wire up the service against `root` using the real git binary.
    pub fn start(root: PathBuf, config: &Config) -> Arc<Self> {
        let probe = SystemGit::new(Duration::from_secs(config.scan.git_timeout_secs));
        Self::start_with_probe(root, config, probe)
    }

    pub fn start_with_probe<G>(root: PathBuf, config: &Config, probe: G) -> Arc<Self>
    where
        G: GitProbe + 'static,
    {
        let cache = Arc::new(SessionCache::new());
        let refresh = RefreshHandle::spawn(
            root.clone(),
            config.scan.max_messages_to_index,
            probe,
            Arc::clone(&cache),
        );

        // Debounced watcher fires land here and become refresh triggers.
        let (fire_tx, mut fire_rx) = mpsc::unbounded_channel();
        {
            let refresh = refresh.clone();
            tokio::spawn(async move {
                while fire_rx.recv().await.is_some() {
                    refresh.trigger();
                }
            });
        }

        let debounce = Duration::from_millis(config.scan.debounce_ms);
        let monitor = ChangeMonitor::start(&root, debounce, fire_tx.clone());
        if monitor.is_none() {
            info!("Change monitoring unavailable; relying on periodic refresh");
        }

        // Safety net for platforms where the watcher drops events. Coalesced
        // by the pipeline like any other trigger.
        let periodic = Duration::from_secs(config.scan.periodic_refresh_secs.max(1));
        {
            let refresh = refresh.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(periodic);
                interval.tick().await; // immediate first tick
                loop {
                    interval.tick().await;
                    refresh.trigger();
                }
            });
        }

        Arc::new(Self {
            cache,
            refresh,
            monitor: Mutex::new(monitor),
            debounce,
            fire_tx,
        })
    }

    /// Trigger a refresh and wait for the resulting snapshot swap.
    pub async fn refresh(&self) {
        self.refresh.refresh().await;
    }

    /// Fire-and-forget refresh trigger.
    pub fn trigger_refresh(&self) {
        self.refresh.trigger();
    }

    pub async fn get_all_sessions(&self) -> Vec<Session> {
        self.cache.get_all_sessions().await
    }

    pub async fn get_session(&self, id: &str) -> Option<Session> {
        self.cache.get_session(id).await
    }

    pub async fn search(&self, query: &str) -> Vec<Session> {
        self.cache.search_sessions(query).await
    }

    pub async fn get_messages(&self, id: &str) -> Vec<Message> {
        self.cache.get_messages(id).await
    }

    pub async fn status(&self) -> PipelineStatus {
        self.refresh.status().await
    }

    /// Change-notification subscription: one payload-free event per completed
    /// snapshot swap.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.refresh.subscribe()
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// Re-point the change monitor at a new root (runtime reconfiguration).
    /// The old OS watch handle is released before the new one is created.
    /// Scanning still targets the root the service was started with; callers
    /// that move the root restart the service.
    pub async fn restart_monitor(&self, new_root: &Path) -> bool {
        let mut guard = self.monitor.lock().await;
        match guard.as_mut() {
            Some(monitor) => monitor.restart(new_root),
            None => {
                let restarted = ChangeMonitor::start(new_root, self.debounce, self.fire_tx.clone());
                let available = restarted.is_some();
                *guard = restarted;
                available
            }
        }
    }
}
