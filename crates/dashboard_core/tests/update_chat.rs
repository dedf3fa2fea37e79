use pretty_assertions::assert_eq;

use dashboard_core::{
    update, ActivePanel, AppState, ChatRole, DocumentRecord, Effect, Msg, Reference, SentenceChain,
};

fn record(job_id: &str, status: &str) -> DocumentRecord {
    DocumentRecord {
        job_id: job_id.to_string(),
        filename: "notes.txt".to_string(),
        status: status.to_string(),
        created_at: None,
        failure_reason: None,
    }
}

fn completed_selection() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "completed")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    state
}

fn ask(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::QuestionSubmitted {
            job_id: "job-1".to_string(),
            text: text.to_string(),
        },
    )
}

fn chat_messages(state: &AppState) -> Vec<(u64, ChatRole, String)> {
    match state.view().active {
        ActivePanel::Chat { messages, .. } => messages
            .into_iter()
            .map(|m| (m.id, m.role, m.content))
            .collect(),
        other => panic!("unexpected panel {other:?}"),
    }
}

#[test]
fn question_adds_user_message_and_placeholder() {
    let state = completed_selection();
    let (state, effects) = ask(state, "  What is the capital?  ");

    let messages = chat_messages(&state);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].1, ChatRole::User);
    assert_eq!(messages[0].2, "What is the capital?");
    assert_eq!(messages[1].1, ChatRole::Assistant);
    assert_eq!(messages[1].2, "…");

    match &effects[..] {
        [Effect::SubmitQuery {
            job_id,
            message_id,
            question,
        }] => {
            assert_eq!(job_id, "job-1");
            assert_eq!(*message_id, messages[1].0);
            assert_eq!(question, "What is the capital?");
        }
        other => panic!("unexpected effects {other:?}"),
    }
    match state.view().active {
        ActivePanel::Chat { awaiting, .. } => assert!(awaiting),
        other => panic!("unexpected panel {other:?}"),
    }
}

#[test]
fn blank_question_is_ignored() {
    let state = completed_selection();
    let (state, effects) = ask(state, "   ");
    assert!(effects.is_empty());
    assert!(chat_messages(&state).is_empty());
}

#[test]
fn second_question_is_rejected_while_one_is_pending() {
    let state = completed_selection();
    let (state, _) = ask(state, "first?");
    let (state, effects) = ask(state, "second?");

    assert!(effects.is_empty());
    assert_eq!(chat_messages(&state).len(), 2);
    let notice = state.view().notification.expect("notice shown");
    assert_eq!(notice.title, "Question pending");
}

#[test]
fn chat_is_gated_until_processing_completes() {
    let (state, _) = update(
        AppState::new(),
        Msg::DocumentsLoaded(vec![record("job-1", "processing")]),
    );
    let (state, _) = update(
        state,
        Msg::DocumentSelected {
            job_id: "job-1".to_string(),
        },
    );
    let (state, effects) = ask(state, "too early?");

    assert!(effects.is_empty());
    let notice = state.view().notification.expect("notice shown");
    assert_eq!(notice.title, "Chat unavailable");
}

#[test]
fn answer_resolves_the_placeholder_in_place() {
    let state = completed_selection();
    let (state, effects) = ask(state, "capital?");
    let message_id = match &effects[..] {
        [Effect::SubmitQuery { message_id, .. }] => *message_id,
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, _) = update(
        state,
        Msg::QueryAnswered {
            job_id: "job-1".to_string(),
            message_id,
            answer: "Paris".to_string(),
            references: vec![Reference {
                sentence_text: "Paris is the capital.".to_string(),
                sentence_hash: "h1".to_string(),
                nodes: Vec::new(),
                edges: Vec::new(),
            }],
        },
    );
    let messages = chat_messages(&state);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], (message_id, ChatRole::Assistant, "Paris".to_string()));
    match state.view().active {
        ActivePanel::Chat { awaiting, .. } => assert!(!awaiting),
        other => panic!("unexpected panel {other:?}"),
    }

    // A new question is allowed again.
    let (_, effects) = ask(state, "next?");
    assert_eq!(effects.len(), 1);
}

#[test]
fn placeholder_id_survives_the_async_fallback() {
    let state = completed_selection();
    let (state, effects) = ask(state, "capital?");
    let message_id = match &effects[..] {
        [Effect::SubmitQuery { message_id, .. }] => *message_id,
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, _) = update(
        state,
        Msg::QueryFellBack {
            job_id: "job-1".to_string(),
            message_id,
        },
    );
    let messages = chat_messages(&state);
    assert_eq!(messages[1].0, message_id);
    assert_eq!(messages[1].2, "Processing your question…");
    // Still awaiting: the fallback path has not produced an answer yet.
    match state.view().active {
        ActivePanel::Chat { awaiting, .. } => assert!(awaiting),
        other => panic!("unexpected panel {other:?}"),
    }

    let (state, _) = update(
        state,
        Msg::QueryAnswered {
            job_id: "job-1".to_string(),
            message_id,
            answer: "Berlin".to_string(),
            references: Vec::new(),
        },
    );
    let messages = chat_messages(&state);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], (message_id, ChatRole::Assistant, "Berlin".to_string()));
}

#[test]
fn query_failure_turns_the_placeholder_into_an_error_message() {
    let state = completed_selection();
    let (state, effects) = ask(state, "capital?");
    let message_id = match &effects[..] {
        [Effect::SubmitQuery { message_id, .. }] => *message_id,
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, _) = update(
        state,
        Msg::QueryFailed {
            job_id: "job-1".to_string(),
            message_id,
            message: "index corrupted".to_string(),
        },
    );
    let messages = chat_messages(&state);
    assert_eq!(messages[1].1, ChatRole::Error);
    assert_eq!(messages[1].2, "Sorry, an error occurred: index corrupted");
    match state.view().active {
        ActivePanel::Chat { awaiting, .. } => assert!(!awaiting),
        other => panic!("unexpected panel {other:?}"),
    }
}

#[test]
fn sentence_chain_opens_and_dismisses() {
    let state = completed_selection();
    let (_, effects) = update(
        state.clone(),
        Msg::SentenceChainRequested {
            sentence_hash: "h1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchSentenceChain {
            sentence_hash: "h1".to_string()
        }]
    );

    let (state, _) = update(
        state,
        Msg::SentenceChainLoaded {
            chain: SentenceChain {
                sentence_hash: "h1".to_string(),
                stages: Vec::new(),
            },
        },
    );
    assert!(state.view().sentence_chain.is_some());

    let (state, _) = update(state, Msg::SentenceChainDismissed);
    assert!(state.view().sentence_chain.is_none());
}
