use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use dashboard_core::{Effect, Msg};
use dashboard_engine::{EngineCommand, EngineConfig, EngineEvent, EngineHandle};
use dashboard_logging::dash_info;

/// Bridges the pure core and the engine: effects become engine commands,
/// engine events come back as messages on `msg_tx`.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(config)?;
        let runner = Self {
            engine,
            msg_tx: msg_tx.clone(),
        };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RefreshDocuments { force } => {
                    self.engine.send(EngineCommand::RefreshDocuments { force });
                }
                Effect::BeginUpload {
                    temp_id,
                    filename,
                    source,
                } => {
                    // The source token is the path the user gave; the bytes
                    // are read here so the engine never touches the disk.
                    match std::fs::read(&source) {
                        Ok(bytes) => {
                            dash_info!("uploading {filename} ({} bytes)", bytes.len());
                            self.engine.send(EngineCommand::BeginUpload {
                                temp_id,
                                filename,
                                bytes,
                            });
                        }
                        Err(err) => {
                            let _ = self.msg_tx.send(Msg::UploadFailed {
                                temp_id,
                                message: format!("Could not read {source}: {err}"),
                            });
                        }
                    }
                }
                Effect::WatchJob { job_id } => {
                    self.engine.send(EngineCommand::WatchJob { job_id });
                }
                Effect::UnwatchJob { job_id } => {
                    self.engine.send(EngineCommand::UnwatchJob { job_id });
                }
                Effect::WatchChain { job_id } => {
                    self.engine.send(EngineCommand::WatchChain { job_id });
                }
                Effect::UnwatchChain { job_id } => {
                    self.engine.send(EngineCommand::UnwatchChain { job_id });
                }
                Effect::SubmitQuery {
                    job_id,
                    message_id,
                    question,
                } => {
                    self.engine.send(EngineCommand::SubmitQuery {
                        job_id,
                        message_id,
                        question,
                    });
                }
                Effect::TriggerProcessing { job_id } => {
                    self.engine.send(EngineCommand::TriggerProcessing { job_id });
                }
                Effect::FetchSentenceChain { sentence_hash } => {
                    self.engine
                        .send(EngineCommand::FetchSentenceChain { sentence_hash });
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    return;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Documents { result } => match result {
            Ok(documents) => Msg::DocumentsLoaded(documents),
            Err(error) => Msg::DocumentsLoadFailed {
                message: error.to_string(),
            },
        },
        EngineEvent::UploadAccepted { temp_id, record } => {
            Msg::UploadAccepted { temp_id, record }
        }
        EngineEvent::UploadFinished {
            temp_id,
            record,
            trigger_error,
        } => Msg::UploadFinished {
            temp_id,
            record,
            trigger_error: trigger_error.map(|error| error.to_string()),
        },
        EngineEvent::UploadFailed { temp_id, error } => Msg::UploadFailed {
            temp_id,
            message: error.to_string(),
        },
        EngineEvent::Status {
            job_id,
            seq,
            result,
        } => match result {
            Ok(snapshot) => Msg::StatusArrived {
                job_id,
                seq,
                snapshot,
            },
            Err(error) => Msg::StatusPollFailed {
                job_id,
                message: error.to_string(),
            },
        },
        EngineEvent::Chain {
            job_id,
            seq,
            entries,
        } => Msg::ChainArrived {
            job_id,
            seq,
            entries,
        },
        EngineEvent::ChainStalled { job_id, error } => Msg::ChainStalled {
            job_id,
            message: error.to_string(),
        },
        EngineEvent::QueryAnswered {
            job_id,
            message_id,
            outcome,
        } => Msg::QueryAnswered {
            job_id,
            message_id,
            answer: outcome.answer,
            references: outcome.references,
        },
        EngineEvent::QueryFellBack {
            job_id, message_id, ..
        } => Msg::QueryFellBack { job_id, message_id },
        EngineEvent::QueryFailed {
            job_id,
            message_id,
            error,
        } => Msg::QueryFailed {
            job_id,
            message_id,
            message: error.to_string(),
        },
        EngineEvent::TriggerFinished { job_id, result } => match result {
            Ok(()) => Msg::TriggerSucceeded { job_id },
            Err(error) => Msg::TriggerFailed {
                job_id,
                message: error.to_string(),
            },
        },
        EngineEvent::SentenceChain {
            sentence_hash,
            result,
        } => match result {
            Ok(chain) => Msg::SentenceChainLoaded { chain },
            Err(error) => Msg::SentenceChainFailed {
                sentence_hash,
                message: error.to_string(),
            },
        },
    }
}
