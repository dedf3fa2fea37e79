use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use dashboard_core::derive_status;
use dashboard_logging::{dash_debug, dash_warn};

use crate::api::ApiClient;
use crate::types::EngineEvent;

/// Polling cadence and failure tolerances.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub status_interval: Duration,
    pub chain_interval: Duration,
    pub query_interval: Duration,
    /// Consecutive chain-poll failures tolerated before the stall is surfaced.
    pub chain_failure_tolerance: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_secs(5),
            chain_interval: Duration::from_secs(5),
            query_interval: Duration::from_secs(2),
            chain_failure_tolerance: 3,
        }
    }
}

/// Where a poll loop ended up when it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Completed,
    Failed,
    Cancelled,
}

/// Delivery of engine events back to the shell. Tasks never talk to the shell
/// directly; they only push events into a sink.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Sink backed by an std mpsc channel. Send failures mean the receiving side
/// is gone, which is only expected during shutdown.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: Sender<EngineEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        if self.sender.send(event).is_err() {
            dash_warn!("event receiver disconnected, dropping engine event");
        }
    }
}

/// Poll job status until the status goes terminal or the token is cancelled.
///
/// Every request is stamped with the next sequence number at the moment it is
/// issued. Responses that land after cancellation are discarded so a stale
/// snapshot can never follow a cancel.
pub async fn run_status_poll(
    client: &dyn ApiClient,
    job_id: &str,
    seq: &AtomicU64,
    interval: Duration,
    token: &CancellationToken,
    sink: &dyn EventSink,
) -> PollState {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => return PollState::Cancelled,
            _ = ticker.tick() => {}
        }
        let seq_no = seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = client.get_status(job_id).await;
        if token.is_cancelled() {
            dash_debug!("discarding status response for cancelled watch on {job_id}");
            return PollState::Cancelled;
        }
        let terminal = match &result {
            Ok(snapshot) => {
                let category = derive_status(Some(&snapshot.status));
                category.is_terminal().then_some(category)
            }
            Err(_) => None,
        };
        sink.emit(EngineEvent::Status {
            job_id: job_id.to_string(),
            seq: seq_no,
            result,
        });
        if let Some(category) = terminal {
            dash_debug!("status poll for {job_id} reached terminal state {category}");
            return if category == dashboard_core::StatusCategory::Failed {
                PollState::Failed
            } else {
                PollState::Completed
            };
        }
    }
}

/// Poll the processing chain until cancelled.
///
/// Failures are tolerated up to the configured count; at the tolerance a
/// single stall event is emitted and the counter resets, so a flapping
/// backend produces one notice per streak rather than one per miss.
pub async fn run_chain_poll(
    client: &dyn ApiClient,
    job_id: &str,
    seq: &AtomicU64,
    settings: &PollSettings,
    token: &CancellationToken,
    sink: &dyn EventSink,
) -> PollState {
    let mut ticker = tokio::time::interval(settings.chain_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut failures = 0u32;
    loop {
        tokio::select! {
            _ = token.cancelled() => return PollState::Cancelled,
            _ = ticker.tick() => {}
        }
        let seq_no = seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = client.get_processing_chain(job_id).await;
        if token.is_cancelled() {
            dash_debug!("discarding chain response for cancelled watch on {job_id}");
            return PollState::Cancelled;
        }
        match result {
            Ok(entries) => {
                failures = 0;
                sink.emit(EngineEvent::Chain {
                    job_id: job_id.to_string(),
                    seq: seq_no,
                    entries,
                });
            }
            Err(error) => {
                failures += 1;
                dash_warn!(
                    "chain poll for {job_id} failed ({failures}/{}): {error}",
                    settings.chain_failure_tolerance
                );
                if failures >= settings.chain_failure_tolerance {
                    failures = 0;
                    sink.emit(EngineEvent::ChainStalled {
                        job_id: job_id.to_string(),
                        error,
                    });
                }
            }
        }
    }
}
