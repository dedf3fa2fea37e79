use tokio_util::sync::CancellationToken;

use dashboard_core::{derive_status, MessageId, StatusCategory};
use dashboard_logging::{dash_debug, dash_info, dash_warn};

use crate::api::ApiClient;
use crate::poller::{EventSink, PollSettings};
use crate::types::{ApiError, ApiErrorKind, EngineEvent, QueryOutcome};

/// Whether a failed synchronous query should fall back to the asynchronous
/// submit-and-poll path. Client-side errors and plain server errors surface
/// directly; only transport problems and gateway-style upstream failures
/// justify retrying over the slower path.
pub fn should_fall_back(error: &ApiError) -> bool {
    match error.kind {
        ApiErrorKind::Timeout | ApiErrorKind::Network => true,
        ApiErrorKind::HttpStatus(status) => status > 500,
        _ => false,
    }
}

/// Run one question end to end: synchronous first, asynchronous fallback when
/// the synchronous path times out or dies in transit. The same `message_id`
/// is carried through both paths so the shell resolves a single placeholder.
pub async fn run_query(
    client: &dyn ApiClient,
    job_id: &str,
    message_id: MessageId,
    question: &str,
    settings: &PollSettings,
    token: &CancellationToken,
    sink: &dyn EventSink,
) {
    let sync_error = match client.post_query(question).await {
        Ok(outcome) => {
            sink.emit(EngineEvent::QueryAnswered {
                job_id: job_id.to_string(),
                message_id,
                outcome,
            });
            return;
        }
        Err(error) => error,
    };
    if token.is_cancelled() {
        return;
    }
    if !should_fall_back(&sync_error) {
        sink.emit(EngineEvent::QueryFailed {
            job_id: job_id.to_string(),
            message_id,
            error: sync_error,
        });
        return;
    }

    dash_info!("synchronous query failed ({sync_error}), falling back to async submission");
    let query_id = match client.post_query_submit(question).await {
        Ok(query_id) => query_id,
        Err(error) => {
            sink.emit(EngineEvent::QueryFailed {
                job_id: job_id.to_string(),
                message_id,
                error,
            });
            return;
        }
    };
    sink.emit(EngineEvent::QueryFellBack {
        job_id: job_id.to_string(),
        message_id,
        query_id: query_id.clone(),
    });

    let mut ticker = tokio::time::interval(settings.query_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }
        let status = match client.get_query_status(&query_id).await {
            Ok(status) => status,
            Err(error) => {
                // Transient poll misses are retried on the next tick.
                dash_warn!("query status poll for {query_id} failed: {error}");
                continue;
            }
        };
        if token.is_cancelled() {
            return;
        }
        match derive_status(Some(&status.status)) {
            StatusCategory::Completed => {
                sink.emit(EngineEvent::QueryAnswered {
                    job_id: job_id.to_string(),
                    message_id,
                    outcome: QueryOutcome {
                        answer: status.answer.unwrap_or_default(),
                        references: status.references,
                    },
                });
                return;
            }
            StatusCategory::Failed => {
                let message = status
                    .error
                    .or(status.message)
                    .unwrap_or_else(|| "Unknown error".to_string());
                sink.emit(EngineEvent::QueryFailed {
                    job_id: job_id.to_string(),
                    message_id,
                    error: ApiError::new(ApiErrorKind::Backend, message),
                });
                return;
            }
            other => {
                dash_debug!("query {query_id} still {other}, polling again");
            }
        }
    }
}
