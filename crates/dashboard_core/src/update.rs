use crate::records::{ChatMessage, ChatRole};
use crate::status::{derive_status, StatusCategory};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => {
            state.begin_documents_load();
            // Within the freshness window the engine answers from its cache.
            vec![Effect::RefreshDocuments { force: false }]
        }
        Msg::DocumentsLoaded(documents) => {
            state.set_documents(documents);
            sync_watchers(&mut state)
        }
        Msg::DocumentsLoadFailed { message } => {
            state.documents_load_failed(&message);
            state.notify_error("Could not load documents", &message);
            Vec::new()
        }
        Msg::UploadRequested { filename, source } => {
            if !is_supported_upload(&filename) {
                state.notify_error(
                    "Invalid file type",
                    "Only .txt files are supported for upload.",
                );
                return (state, Vec::new());
            }
            let temp_id = state.insert_provisional(&filename);
            let mut effects = sync_watchers(&mut state);
            effects.push(Effect::BeginUpload {
                temp_id,
                filename,
                source,
            });
            effects
        }
        Msg::UploadAccepted { temp_id, record } => {
            state.promote(&temp_id, record);
            Vec::new()
        }
        Msg::UploadFinished {
            temp_id,
            record,
            trigger_error,
        } => {
            let filename = record.filename.clone();
            state.finalize(&temp_id, record);
            match trigger_error {
                None => state.notify_info(
                    "Processing started",
                    &format!("{filename} is now being processed."),
                ),
                Some(message) => state.notify_error("Processing not triggered", &message),
            }
            let mut effects = sync_watchers(&mut state);
            // The list must pick up the new row; never serve a cached copy.
            effects.push(Effect::RefreshDocuments { force: true });
            effects
        }
        Msg::UploadFailed { temp_id, message } => {
            state.fail(&temp_id, &message);
            sync_watchers(&mut state)
        }
        Msg::DocumentSelected { job_id } => {
            if state.document(&job_id).is_none() {
                return (state, Vec::new());
            }
            state.select(Some(job_id));
            sync_watchers(&mut state)
        }
        Msg::SelectionCleared => {
            state.select(None);
            sync_watchers(&mut state)
        }
        Msg::StatusArrived {
            job_id,
            seq,
            snapshot,
        } => {
            if state.apply_status(&job_id, seq, snapshot) {
                sync_watchers(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::StatusPollFailed { job_id: _, message } => {
            state.notify_error("Status check failed", &message);
            Vec::new()
        }
        Msg::ChainArrived {
            job_id,
            seq,
            entries,
        } => {
            state.apply_chain(&job_id, seq, entries);
            Vec::new()
        }
        Msg::ChainStalled { job_id: _, message } => {
            state.notify_error("Processing log unavailable", &message);
            Vec::new()
        }
        Msg::QuestionSubmitted { job_id, text } => {
            let question = text.trim().to_string();
            if question.is_empty() {
                return (state, Vec::new());
            }
            if state.pending_query(&job_id).is_some() {
                state.notify_error(
                    "Question pending",
                    "Wait for the current answer before asking again.",
                );
                return (state, Vec::new());
            }
            let live = state.live_status(&job_id);
            if derive_status(live.as_deref()) != StatusCategory::Completed {
                state.notify_error(
                    "Chat unavailable",
                    "Chat will be enabled once processing is complete.",
                );
                return (state, Vec::new());
            }
            let user_id = state.allocate_message_id();
            state.push_message(
                &job_id,
                ChatMessage {
                    id: user_id,
                    role: ChatRole::User,
                    content: question.clone(),
                    references: Vec::new(),
                },
            );
            let message_id = state.allocate_message_id();
            state.push_message(
                &job_id,
                ChatMessage {
                    id: message_id,
                    role: ChatRole::Assistant,
                    content: "…".to_string(),
                    references: Vec::new(),
                },
            );
            state.set_pending_query(&job_id, message_id);
            vec![Effect::SubmitQuery {
                job_id,
                message_id,
                question,
            }]
        }
        Msg::QueryAnswered {
            job_id,
            message_id,
            answer,
            references,
        } => {
            state.resolve_message(&job_id, message_id, ChatRole::Assistant, answer, references);
            state.clear_pending_query(&job_id);
            Vec::new()
        }
        Msg::QueryFailed {
            job_id,
            message_id,
            message,
        } => {
            state.resolve_message(
                &job_id,
                message_id,
                ChatRole::Error,
                format!("Sorry, an error occurred: {message}"),
                Vec::new(),
            );
            state.clear_pending_query(&job_id);
            Vec::new()
        }
        Msg::QueryFellBack { job_id, message_id } => {
            state.resolve_message(
                &job_id,
                message_id,
                ChatRole::Assistant,
                "Processing your question…".to_string(),
                Vec::new(),
            );
            Vec::new()
        }
        Msg::SentenceChainRequested { sentence_hash } => {
            vec![Effect::FetchSentenceChain { sentence_hash }]
        }
        Msg::SentenceChainLoaded { chain } => {
            state.set_sentence_chain(Some(chain));
            Vec::new()
        }
        Msg::SentenceChainFailed {
            sentence_hash: _,
            message,
        } => {
            state.notify_error("Could not load reference detail", &message);
            Vec::new()
        }
        Msg::SentenceChainDismissed => {
            state.set_sentence_chain(None);
            Vec::new()
        }
        Msg::RetryProcessingRequested { job_id } => {
            vec![Effect::TriggerProcessing { job_id }]
        }
        Msg::TriggerSucceeded { job_id } => {
            state.notify_info(
                "Processing triggered",
                "The document has been queued for processing.",
            );
            // Drop the stale terminal snapshot so polling resumes.
            state.clear_status(&job_id);
            sync_watchers(&mut state)
        }
        Msg::TriggerFailed { job_id: _, message } => {
            state.notify_error("Trigger failed", &message);
            Vec::new()
        }
        Msg::NotificationDismissed => {
            state.dismiss_notification();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Client-side upload validation, checked before any network call.
fn is_supported_upload(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".txt")
}

/// Reconcile the running pollers with what the active selection needs.
///
/// Status polling follows the active document unless it is still uploading or
/// its latest snapshot is terminal. Chain polling follows the active document
/// only while it is pending, queued or processing. Emits unwatch effects for
/// anything no longer needed so in-flight responses get discarded.
fn sync_watchers(state: &mut AppState) -> Vec<Effect> {
    let desired_job = state.active_job().and_then(|job_id| {
        let record = state.document(job_id)?;
        if derive_status(Some(&record.status)) == StatusCategory::Uploading {
            return None;
        }
        if let Some(snapshot) = state.status_snapshot(job_id) {
            if derive_status(Some(&snapshot.status)).is_terminal() {
                return None;
            }
        }
        Some(job_id.to_string())
    });
    let desired_chain = state.active_job().and_then(|job_id| {
        let live = state.live_status(job_id)?;
        matches!(
            derive_status(Some(&live)),
            StatusCategory::Pending | StatusCategory::Queued | StatusCategory::Processing
        )
        .then(|| job_id.to_string())
    });

    let mut effects = Vec::new();
    if state.watched_job() != desired_job.as_deref() {
        if let Some(previous) = state.watched_job() {
            effects.push(Effect::UnwatchJob {
                job_id: previous.to_string(),
            });
        }
        if let Some(job_id) = &desired_job {
            effects.push(Effect::WatchJob {
                job_id: job_id.clone(),
            });
        }
        state.set_watched_job(desired_job);
    }
    if state.watched_chain() != desired_chain.as_deref() {
        if let Some(previous) = state.watched_chain() {
            effects.push(Effect::UnwatchChain {
                job_id: previous.to_string(),
            });
        }
        if let Some(job_id) = &desired_chain {
            effects.push(Effect::WatchChain {
                job_id: job_id.clone(),
            });
        }
        state.set_watched_chain(desired_chain);
    }
    effects
}
