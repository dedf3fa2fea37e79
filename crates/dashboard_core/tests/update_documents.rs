use pretty_assertions::assert_eq;

use dashboard_core::{
    update, ActivePanel, AppState, DocumentRecord, Effect, JobStatusSnapshot, Msg, NoticeSeverity,
    ProgressView, StatusCategory,
};

fn record(job_id: &str, filename: &str, status: &str) -> DocumentRecord {
    DocumentRecord {
        job_id: job_id.to_string(),
        filename: filename.to_string(),
        status: status.to_string(),
        created_at: None,
        failure_reason: None,
    }
}

fn snapshot(job_id: &str, status: &str) -> JobStatusSnapshot {
    JobStatusSnapshot {
        job_id: job_id.to_string(),
        status: status.to_string(),
        filename: None,
        progress_percentage: None,
        total_sentences: None,
        completed_sentences: None,
        llm_calls_made: None,
        failure_reason: None,
    }
}

fn upload(state: AppState, filename: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::UploadRequested {
            filename: filename.to_string(),
            source: format!("/tmp/{filename}"),
        },
    )
}

#[test]
fn upload_creates_one_provisional_row_and_selects_it() {
    let state = AppState::new();
    let (mut state, effects) = upload(state, "notes.txt");

    let view = state.view();
    assert_eq!(view.documents.len(), 1);
    assert_eq!(view.documents[0].filename, "notes.txt");
    assert_eq!(view.documents[0].category, StatusCategory::Uploading);
    assert!(view.documents[0].provisional);
    assert!(view.documents[0].active);
    assert!(matches!(view.active, ActivePanel::Uploading { .. }));
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::BeginUpload { filename, .. } if filename == "notes.txt")));
    assert!(state.consume_dirty());
}

#[test]
fn unsupported_extension_is_rejected_before_any_effect() {
    let state = AppState::new();
    let (mut state, effects) = upload(state, "notes.pdf");

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.documents.is_empty());
    let notice = view.notification.expect("notice shown");
    assert_eq!(notice.title, "Invalid file type");
    assert_eq!(notice.severity, NoticeSeverity::Error);
    assert!(state.consume_dirty());
}

#[test]
fn extension_check_is_case_insensitive() {
    let state = AppState::new();
    let (state, effects) = upload(state, "NOTES.TXT");
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().documents.len(), 1);
}

#[test]
fn promotion_rekeys_the_row_and_is_idempotent() {
    let state = AppState::new();
    let (state, effects) = upload(state, "notes.txt");
    let temp_id = match &effects[0] {
        Effect::BeginUpload { temp_id, .. } => temp_id.clone(),
        other => panic!("unexpected effect {other:?}"),
    };

    let accepted = Msg::UploadAccepted {
        temp_id: temp_id.clone(),
        record: record("job-1", "notes.txt", "uploading"),
    };
    let (state, _) = update(state, accepted.clone());
    let (mut state, _) = update(state, accepted);

    let view = state.view();
    assert_eq!(view.documents.len(), 1);
    assert_eq!(view.documents[0].job_id, "job-1");
    assert!(view.documents[0].provisional);
    assert!(view.documents[0].active);
    assert!(state.consume_dirty());
}

#[test]
fn refresh_prunes_provisional_rows_covered_by_the_list() {
    let state = AppState::new();
    let (state, effects) = upload(state, "notes.txt");
    let temp_id = match &effects[0] {
        Effect::BeginUpload { temp_id, .. } => temp_id.clone(),
        other => panic!("unexpected effect {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::UploadAccepted {
            temp_id: temp_id.clone(),
            record: record("job-1", "notes.txt", "uploading"),
        },
    );
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            temp_id,
            record: record("job-1", "notes.txt", "processing"),
            trigger_error: None,
        },
    );
    let (mut state, _) = update(
        state,
        Msg::DocumentsLoaded(vec![
            record("job-1", "notes.txt", "processing"),
            record("job-0", "older.txt", "completed"),
        ]),
    );

    // The server row replaces the provisional shadow; never two rows per job.
    let view = state.view();
    assert_eq!(view.documents.len(), 2);
    assert_eq!(view.documents[0].job_id, "job-1");
    assert!(!view.documents[0].provisional);
    assert!(state.consume_dirty());
}

#[test]
fn upload_failure_removes_the_row_and_surfaces_the_error() {
    let state = AppState::new();
    let (state, effects) = upload(state, "notes.txt");
    let temp_id = match &effects[0] {
        Effect::BeginUpload { temp_id, .. } => temp_id.clone(),
        other => panic!("unexpected effect {other:?}"),
    };

    let (mut state, _) = update(
        state,
        Msg::UploadFailed {
            temp_id,
            message: "File upload failed with status 403".to_string(),
        },
    );
    let view = state.view();
    assert!(view.documents.is_empty());
    assert!(matches!(view.active, ActivePanel::Empty));
    let notice = view.notification.expect("notice shown");
    assert_eq!(notice.title, "Upload failed");
    assert!(state.consume_dirty());
}

#[test]
fn documents_sort_newest_first_by_created_at() {
    let mut old = record("job-1", "old.txt", "completed");
    old.created_at = Some("2026-08-01T10:00:00Z".to_string());
    let mut new = record("job-2", "new.txt", "completed");
    new.created_at = Some("2026-08-20T10:00:00Z".to_string());
    let undated = record("job-3", "undated.txt", "completed");

    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![undated.clone(), old.clone(), new.clone()]),
    );
    let ids: Vec<_> = state
        .view()
        .documents
        .iter()
        .map(|row| row.job_id.clone())
        .collect();
    assert_eq!(ids, vec!["job-2", "job-1", "job-3"]);
}

#[test]
fn selecting_a_processing_document_starts_both_watches() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "processing")]),
    );
    let (_, effects) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::WatchJob { job_id } if job_id == "job-1")));
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::WatchChain { job_id } if job_id == "job-1")));
}

#[test]
fn terminal_status_stops_both_watches() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "processing")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    let (mut state, effects) = update(
        state,
        Msg::StatusArrived {
            job_id: "job-1".to_string(),
            seq: 1,
            snapshot: snapshot("job-1", "completed"),
        },
    );
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::UnwatchJob { job_id } if job_id == "job-1")));
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::UnwatchChain { job_id } if job_id == "job-1")));
    assert!(matches!(state.view().active, ActivePanel::Chat { .. }));
    assert!(state.consume_dirty());
}

#[test]
fn stale_status_sequences_are_discarded() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "processing")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusArrived {
            job_id: "job-1".to_string(),
            seq: 5,
            snapshot: snapshot("job-1", "completed"),
        },
    );
    // A response issued earlier lands later; it must not roll status back.
    let (state, effects) = update(
        state,
        Msg::StatusArrived {
            job_id: "job-1".to_string(),
            seq: 4,
            snapshot: snapshot("job-1", "processing"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.status_snapshot("job-1").map(|s| s.status.as_str()),
        Some("completed")
    );
}

#[test]
fn failed_document_shows_failure_reason() {
    let mut failed = record("job-1", "notes.txt", "failed");
    failed.failure_reason = Some("chunker crashed".to_string());
    let (state, _) = update(AppState::new(), Msg::DocumentsLoaded(vec![failed]));
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    match state.view().active {
        ActivePanel::Failed { message, .. } => assert_eq!(message, "chunker crashed"),
        other => panic!("unexpected panel {other:?}"),
    }
}

#[test]
fn failed_document_without_reason_gets_a_default_message() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "failed")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    match state.view().active {
        ActivePanel::Failed { message, .. } => {
            assert_eq!(message, "The document could not be processed.");
        }
        other => panic!("unexpected panel {other:?}"),
    }
}

#[test]
fn pending_document_offers_manual_trigger() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "pending")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    assert!(matches!(
        state.view().active,
        ActivePanel::PendingTrigger { .. }
    ));

    let (_, effects) = update(
        state,
        Msg::RetryProcessingRequested {
            job_id: "job-1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::TriggerProcessing {
            job_id: "job-1".to_string()
        }]
    );
}

#[test]
fn successful_trigger_clears_the_stale_snapshot_and_rewatches() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "pending")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    // A stale terminal snapshot from an earlier run would otherwise block
    // polling from restarting.
    let (state, _) = update(
        state,
        Msg::StatusArrived {
            job_id: "job-1".to_string(),
            seq: 1,
            snapshot: snapshot("job-1", "failed"),
        },
    );
    let (state, effects) = update(
        state,
        Msg::TriggerSucceeded {
            job_id: "job-1".to_string(),
        },
    );
    assert!(state.status_snapshot("job-1").is_none());
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::WatchJob { job_id } if job_id == "job-1")));
}

#[test]
fn user_refresh_goes_through_the_cache_window() {
    let (_, effects) = update(AppState::new(), Msg::RefreshRequested);
    assert_eq!(effects, vec![Effect::RefreshDocuments { force: false }]);
}

#[test]
fn post_upload_refresh_bypasses_the_cache() {
    let state = AppState::new();
    let (state, effects) = upload(state, "notes.txt");
    let temp_id = match &effects[0] {
        Effect::BeginUpload { temp_id, .. } => temp_id.clone(),
        other => panic!("unexpected effect {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::UploadAccepted {
            temp_id: temp_id.clone(),
            record: record("job-1", "notes.txt", "uploading"),
        },
    );
    let (_, effects) = update(
        state,
        Msg::UploadFinished {
            temp_id,
            record: record("job-1", "notes.txt", "processing"),
            trigger_error: None,
        },
    );
    // The new row must come from the server, not a cached copy.
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::RefreshDocuments { force: true })));
}

#[test]
fn progress_snapshot_shows_up_in_the_processing_panel() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "processing")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    let mut live = snapshot("job-1", "processing");
    live.progress_percentage = Some(42);
    live.total_sentences = Some(12);
    live.completed_sentences = Some(7);
    live.llm_calls_made = Some(3);
    let (state, effects) = update(
        state,
        Msg::StatusArrived {
            job_id: "job-1".to_string(),
            seq: 1,
            snapshot: live,
        },
    );
    // Non-terminal: the watch keeps running.
    assert!(effects
        .iter()
        .all(|effect| !matches!(effect, Effect::UnwatchJob { .. })));
    match state.view().active {
        ActivePanel::Processing {
            status_label,
            progress,
            ..
        } => {
            assert_eq!(status_label, "Processing");
            assert_eq!(
                progress,
                ProgressView {
                    percentage: Some(42),
                    total_sentences: Some(12),
                    completed_sentences: Some(7),
                    llm_calls_made: Some(3),
                }
            );
        }
        other => panic!("unexpected panel {other:?}"),
    }
}

#[test]
fn load_failure_keeps_previous_documents_and_notifies() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "notes.txt", "completed")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentsLoadFailed {
            message: "warming up".to_string(),
        },
    );
    let view = state.view();
    assert_eq!(view.documents.len(), 1);
    assert_eq!(view.documents_error.as_deref(), Some("warming up"));
    let notice = view.notification.expect("notice shown");
    assert_eq!(notice.title, "Could not load documents");
}
