use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;

use tokio_util::sync::CancellationToken;

use dashboard_core::MessageId;
use dashboard_logging::{dash_error, dash_info, dash_trace};

use crate::api::{ApiClient, ApiSettings, ReqwestApiClient};
use crate::cache::DocsCache;
use crate::poller::{self, ChannelEventSink, EventSink, PollSettings};
use crate::query;
use crate::types::{ApiError, EngineEvent};
use crate::upload;

/// Commands the shell sends into the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    RefreshDocuments {
        force: bool,
    },
    BeginUpload {
        temp_id: String,
        filename: String,
        bytes: Vec<u8>,
    },
    WatchJob {
        job_id: String,
    },
    UnwatchJob {
        job_id: String,
    },
    WatchChain {
        job_id: String,
    },
    UnwatchChain {
        job_id: String,
    },
    SubmitQuery {
        job_id: String,
        message_id: MessageId,
        question: String,
    },
    TriggerProcessing {
        job_id: String,
    },
    FetchSentenceChain {
        sentence_hash: String,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WatchKey {
    Job(String),
    Chain(String),
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub poll: PollSettings,
}

/// Handle to the engine thread. Cloneable; commands go in through a channel
/// and events are drained with [`EngineHandle::try_recv`].
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: Sender<EngineCommand>,
    event_rx: Arc<Mutex<Receiver<EngineEvent>>>,
}

impl EngineHandle {
    /// Spawn the engine on its own thread with a dedicated tokio runtime.
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let client = ReqwestApiClient::new(config.api.clone())?;
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        thread::Builder::new()
            .name("dashboard-engine".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        dash_error!("failed to start engine runtime: {err}");
                        return;
                    }
                };
                runtime.block_on(run_engine(
                    Arc::new(client),
                    config.poll,
                    command_rx,
                    ChannelEventSink::new(event_tx),
                ));
            })
            .map_err(|err| {
                ApiError::new(crate::types::ApiErrorKind::Network, err.to_string())
            })?;
        Ok(Self {
            command_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn send(&self, command: EngineCommand) {
        if self.command_tx.send(command).is_err() {
            dash_error!("engine thread is gone, command dropped");
        }
    }

    /// Non-blocking drain of the next engine event, if any.
    pub fn try_recv(&self) -> Option<EngineEvent> {
        let guard = self.event_rx.lock().ok()?;
        match guard.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }
}

/// Engine main loop: owns the pollers, the docs cache and the per-identifier
/// sequence counters. Each watch gets a cancellation token; re-watching an
/// identifier cancels the previous task but keeps its sequence counter, so
/// responses stay monotonically ordered across watch generations.
pub async fn run_engine(
    client: Arc<dyn ApiClient>,
    poll: PollSettings,
    commands: Receiver<EngineCommand>,
    sink: ChannelEventSink,
) {
    let cache = Arc::new(DocsCache::default());
    let shutdown = CancellationToken::new();
    let mut watches: HashMap<WatchKey, CancellationToken> = HashMap::new();
    let mut sequences: HashMap<WatchKey, Arc<AtomicU64>> = HashMap::new();

    dash_info!("engine started");
    loop {
        // The command channel is std mpsc; poll it without blocking the
        // runtime worker.
        let command = match commands.try_recv() {
            Ok(command) => command,
            Err(TryRecvError::Empty) => {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                continue;
            }
            Err(TryRecvError::Disconnected) => break,
        };
        dash_trace!("engine command: {command:?}");
        match command {
            EngineCommand::RefreshDocuments { force } => {
                let client = Arc::clone(&client);
                let cache = Arc::clone(&cache);
                let sink = sink.clone();
                tokio::spawn(async move {
                    if !force {
                        if let Some(documents) = cache.fresh() {
                            sink.emit(EngineEvent::Documents {
                                result: Ok(documents),
                            });
                            return;
                        }
                    }
                    let result = client.get_docs().await;
                    if let Ok(documents) = &result {
                        cache.store(documents.clone());
                    }
                    sink.emit(EngineEvent::Documents { result });
                });
            }
            EngineCommand::BeginUpload {
                temp_id,
                filename,
                bytes,
            } => {
                let client = Arc::clone(&client);
                let cache = Arc::clone(&cache);
                let sink = sink.clone();
                let token = shutdown.child_token();
                tokio::spawn(async move {
                    upload::run_upload(
                        client.as_ref(),
                        &cache,
                        &temp_id,
                        &filename,
                        bytes,
                        &token,
                        &sink,
                    )
                    .await;
                });
            }
            EngineCommand::WatchJob { job_id } => {
                let key = WatchKey::Job(job_id.clone());
                if let Some(previous) = watches.remove(&key) {
                    previous.cancel();
                }
                let seq = Arc::clone(
                    sequences
                        .entry(key.clone())
                        .or_insert_with(|| Arc::new(AtomicU64::new(0))),
                );
                let token = shutdown.child_token();
                watches.insert(key, token.clone());
                let client = Arc::clone(&client);
                let sink = sink.clone();
                let interval = poll.status_interval;
                tokio::spawn(async move {
                    poller::run_status_poll(
                        client.as_ref(),
                        &job_id,
                        &seq,
                        interval,
                        &token,
                        &sink,
                    )
                    .await;
                });
            }
            EngineCommand::UnwatchJob { job_id } => {
                if let Some(token) = watches.remove(&WatchKey::Job(job_id)) {
                    token.cancel();
                }
            }
            EngineCommand::WatchChain { job_id } => {
                let key = WatchKey::Chain(job_id.clone());
                if let Some(previous) = watches.remove(&key) {
                    previous.cancel();
                }
                let seq = Arc::clone(
                    sequences
                        .entry(key.clone())
                        .or_insert_with(|| Arc::new(AtomicU64::new(0))),
                );
                let token = shutdown.child_token();
                watches.insert(key, token.clone());
                let client = Arc::clone(&client);
                let sink = sink.clone();
                let settings = poll.clone();
                tokio::spawn(async move {
                    poller::run_chain_poll(
                        client.as_ref(),
                        &job_id,
                        &seq,
                        &settings,
                        &token,
                        &sink,
                    )
                    .await;
                });
            }
            EngineCommand::UnwatchChain { job_id } => {
                if let Some(token) = watches.remove(&WatchKey::Chain(job_id)) {
                    token.cancel();
                }
            }
            EngineCommand::SubmitQuery {
                job_id,
                message_id,
                question,
            } => {
                let client = Arc::clone(&client);
                let sink = sink.clone();
                let settings = poll.clone();
                let token = shutdown.child_token();
                tokio::spawn(async move {
                    query::run_query(
                        client.as_ref(),
                        &job_id,
                        message_id,
                        &question,
                        &settings,
                        &token,
                        &sink,
                    )
                    .await;
                });
            }
            EngineCommand::TriggerProcessing { job_id } => {
                let client = Arc::clone(&client);
                let cache = Arc::clone(&cache);
                let sink = sink.clone();
                tokio::spawn(async move {
                    let result = client.trigger_processing(&job_id).await;
                    if result.is_ok() {
                        cache.invalidate();
                    }
                    sink.emit(EngineEvent::TriggerFinished { job_id, result });
                });
            }
            EngineCommand::FetchSentenceChain { sentence_hash } => {
                let client = Arc::clone(&client);
                let sink = sink.clone();
                tokio::spawn(async move {
                    let result = client.get_sentence_chain(&sentence_hash).await;
                    sink.emit(EngineEvent::SentenceChain {
                        sentence_hash,
                        result,
                    });
                });
            }
            EngineCommand::Shutdown => break,
        }
    }
    shutdown.cancel();
    for (_, token) in watches.drain() {
        token.cancel();
    }
    dash_info!("engine stopped");
}
