use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::cache::SessionCache;
use crate::gitmeta::GitProbe;
use crate::index::SearchIndex;
use crate::model::{Message, Session};
use crate::scanner;

/// Refresh pipeline phases. Only one pipeline instance is ever in flight;
/// the actor drops triggers that arrive while the state is not `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Scanning,
    Building,
    Swapping,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub last_refresh: Option<DateTime<Utc>>,
    /// Directory-level problem from the last cycle, e.g. a missing root.
    /// Per-file parse failures never show up here.
    pub last_error: Option<String>,
}

enum RefreshCommand {
    /// A refresh trigger from any source: debounce fire, periodic timer, or
    /// an explicit request. Coalesced to a no-op while a pipeline is active.
    Trigger,
    Status {
        reply: oneshot::Sender<PipelineStatus>,
    },
}

/// Progress reports from the in-flight scan task back to the actor.
enum PipelineEvent {
    Building,
    Swap {
        sessions: Vec<Session>,
        index: SearchIndex,
        messages: HashMap<String, Vec<Message>>,
        error: Option<String>,
    },
}

/// Handle to the refresh actor. Cheap to clone; the UI layer and the HTTP
/// gateway both hold one.
#[derive(Clone)]
pub struct RefreshHandle {
    command_tx: mpsc::UnboundedSender<RefreshCommand>,
    changed_tx: broadcast::Sender<()>,
}

impl RefreshHandle {
    /// Spawn the refresh actor for `root`, writing into `cache`.
    pub fn spawn<G>(root: PathBuf, max_messages: usize, probe: G, cache: Arc<SessionCache>) -> Self
    where
        G: GitProbe + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (changed_tx, _) = broadcast::channel(16);

        let actor = RefreshActor {
            root,
            max_messages,
            probe: Arc::new(probe),
            cache,
            changed_tx: changed_tx.clone(),
            state: PipelineState::Idle,
            last_refresh: None,
            last_error: None,
            command_rx,
        };
        tokio::spawn(actor.run());

        Self {
            command_tx,
            changed_tx,
        }
    }

    /// Fire-and-forget refresh trigger.
    pub fn trigger(&self) {
        let _ = self.command_tx.send(RefreshCommand::Trigger);
    }

    /// Trigger a refresh and wait for the next snapshot swap. Note that when
    /// a pipeline is already running, the awaited swap is that pipeline's.
    pub async fn refresh(&self) {
        let mut changed = self.changed_tx.subscribe();
        self.trigger();
        let _ = changed.recv().await;
    }

    pub async fn status(&self) -> PipelineStatus {
        let (reply, reply_rx) = oneshot::channel();
        if self
            .command_tx
            .send(RefreshCommand::Status { reply })
            .is_err()
        {
            return PipelineStatus {
                state: PipelineState::Idle,
                last_refresh: None,
                last_error: Some("refresh actor is not running".to_string()),
            };
        }
        reply_rx.await.unwrap_or(PipelineStatus {
            state: PipelineState::Idle,
            last_refresh: None,
            last_error: Some("refresh actor did not respond".to_string()),
        })
    }

    /// Subscribe to "sessions changed" notifications. One payload-free event
    /// per completed swap; subscribers re-pull through the read surface.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changed_tx.subscribe()
    }
}

struct RefreshActor<G: GitProbe> {
    root: PathBuf,
    max_messages: usize,
    probe: Arc<G>,
    cache: Arc<SessionCache>,
    changed_tx: broadcast::Sender<()>,
    state: PipelineState,
    last_refresh: Option<DateTime<Utc>>,
    last_error: Option<String>,
    command_rx: mpsc::UnboundedReceiver<RefreshCommand>,
}

impl<G: GitProbe + 'static> RefreshActor<G> {
    async fn run(mut self) {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    self.handle_command(command, &event_tx);
                }
                Some(event) = event_rx.recv() => {
                    self.handle_event(event).await;
                }
                else => {
                    info!("Refresh actor shutting down");
                    break;
                }
            }
        }
    }

    fn handle_command(
        &mut self,
        command: RefreshCommand,
        event_tx: &mpsc::UnboundedSender<PipelineEvent>,
    ) {
        match command {
            RefreshCommand::Trigger => {
                if self.state != PipelineState::Idle {
                    debug!("Refresh trigger coalesced; pipeline is {:?}", self.state);
                    return;
                }
                self.state = PipelineState::Scanning;
                let root = self.root.clone();
                let max_messages = self.max_messages;
                let probe = Arc::clone(&self.probe);
                let event_tx = event_tx.clone();

                // The pipeline runs to completion once started; only debounce
                // timers are cancellable, never this task.
                tokio::spawn(async move {
                    let (parsed, error) = match scanner::scan_root(&root, probe.as_ref()).await {
                        Ok(parsed) => (parsed, None),
                        Err(e) => {
                            warn!("Scan of {:?} failed: {}", root, e);
                            (Vec::new(), Some(format!("scan failed: {}", e)))
                        }
                    };

                    let _ = event_tx.send(PipelineEvent::Building);
                    let index = SearchIndex::build(&parsed, max_messages);
                    let mut sessions = Vec::with_capacity(parsed.len());
                    let mut messages = HashMap::with_capacity(parsed.len());
                    for item in parsed {
                        messages.insert(item.session.id.clone(), item.messages);
                        sessions.push(item.session);
                    }

                    let _ = event_tx.send(PipelineEvent::Swap {
                        sessions,
                        index,
                        messages,
                        error,
                    });
                });
            }
            RefreshCommand::Status { reply } => {
                let _ = reply.send(PipelineStatus {
                    state: self.state,
                    last_refresh: self.last_refresh,
                    last_error: self.last_error.clone(),
                });
            }
        }
    }

    async fn handle_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Building => {
                self.state = PipelineState::Building;
            }
            PipelineEvent::Swap {
                sessions,
                index,
                messages,
                error,
            } => {
                self.state = PipelineState::Swapping;
                let count = sessions.len();
                self.cache.update(sessions, index, messages).await;
                self.last_refresh = Some(Utc::now());
                self.last_error = error;
                self.state = PipelineState::Idle;
                info!("Snapshot swapped: {} sessions", count);
                // No payload: subscribers re-pull via the read endpoints.
                let _ = self.changed_tx.send(());
            }
        }
    }
}
