use crate::records::{ChainEntry, ChatMessage, SentenceChain};
use crate::status::StatusCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Error,
}

/// Dismissible notification shown by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub severity: NoticeSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub documents: Vec<DocumentRowView>,
    pub active: ActivePanel,
    /// Open reference detail, independent of the main panel.
    pub sentence_chain: Option<SentenceChain>,
    pub notification: Option<Notice>,
    pub loading_documents: bool,
    pub documents_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub job_id: String,
    pub filename: String,
    pub category: StatusCategory,
    pub status_label: String,
    pub provisional: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub percentage: Option<u8>,
    pub total_sentences: Option<u32>,
    pub completed_sentences: Option<u32>,
    pub llm_calls_made: Option<u32>,
}

/// What the main panel shows for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActivePanel {
    #[default]
    Empty,
    Uploading {
        filename: String,
    },
    /// Uploaded but processing never started; offers a retry trigger.
    PendingTrigger {
        job_id: String,
        filename: String,
    },
    Processing {
        job_id: String,
        filename: String,
        status_label: String,
        progress: ProgressView,
        chain: Vec<ChainEntry>,
    },
    Failed {
        job_id: String,
        filename: String,
        message: String,
    },
    Chat {
        job_id: String,
        filename: String,
        messages: Vec<ChatMessage>,
        awaiting: bool,
        /// Set while the job is not completed yet; input stays disabled.
        disabled_reason: Option<String>,
    },
}
