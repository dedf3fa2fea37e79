use crate::records::{
    ChainEntry, DocumentRecord, JobStatusSnapshot, MessageId, Reference, SentenceChain,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked for a fresh document list.
    RefreshRequested,
    /// Authoritative document list arrived from the backend.
    DocumentsLoaded(Vec<DocumentRecord>),
    DocumentsLoadFailed { message: String },
    /// User picked a file for upload. `source` is an opaque token echoed back
    /// in the effect so the shell can locate the bytes.
    UploadRequested { filename: String, source: String },
    /// Upload endpoint answered: the provisional row gets its real job id.
    UploadAccepted { temp_id: String, record: DocumentRecord },
    /// Bytes stored and processing trigger attempted. `trigger_error` is set
    /// when the trigger call failed and the document remains pending.
    UploadFinished {
        temp_id: String,
        record: DocumentRecord,
        trigger_error: Option<String>,
    },
    UploadFailed { temp_id: String, message: String },
    /// User selected a document row.
    DocumentSelected { job_id: String },
    SelectionCleared,
    /// Status poll response. `seq` was assigned at request-issue time;
    /// stale sequences are discarded.
    StatusArrived {
        job_id: String,
        seq: u64,
        snapshot: JobStatusSnapshot,
    },
    StatusPollFailed { job_id: String, message: String },
    /// Processing-chain poll response.
    ChainArrived {
        job_id: String,
        seq: u64,
        entries: Vec<ChainEntry>,
    },
    /// The chain poller hit its consecutive-failure tolerance; last-good
    /// entries stay visible and polling continues.
    ChainStalled { job_id: String, message: String },
    /// User submitted a chat question for the given job.
    QuestionSubmitted { job_id: String, text: String },
    QueryAnswered {
        job_id: String,
        message_id: MessageId,
        answer: String,
        references: Vec<Reference>,
    },
    QueryFailed {
        job_id: String,
        message_id: MessageId,
        message: String,
    },
    /// The synchronous query path gave up and the engine switched to
    /// submit-and-poll. The placeholder keeps its id.
    QueryFellBack { job_id: String, message_id: MessageId },
    /// User opened a reference; fetch the per-sentence processing history.
    SentenceChainRequested { sentence_hash: String },
    SentenceChainLoaded { chain: SentenceChain },
    SentenceChainFailed {
        sentence_hash: String,
        message: String,
    },
    /// User closed the reference detail panel.
    SentenceChainDismissed,
    /// User asked to re-trigger processing for a pending or failed job.
    RetryProcessingRequested { job_id: String },
    TriggerSucceeded { job_id: String },
    TriggerFailed { job_id: String, message: String },
    NotificationDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
