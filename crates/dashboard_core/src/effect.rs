use crate::records::MessageId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the document list. When `force` is false the engine may answer
    /// from its cache.
    RefreshDocuments { force: bool },
    /// Run the upload workflow for a provisional row.
    BeginUpload {
        temp_id: String,
        filename: String,
        source: String,
    },
    /// Start polling job status for an identifier.
    WatchJob { job_id: String },
    /// Stop polling job status; in-flight responses must be discarded.
    UnwatchJob { job_id: String },
    /// Start polling the processing chain for an identifier.
    WatchChain { job_id: String },
    UnwatchChain { job_id: String },
    /// Ask the assistant. `message_id` identifies the placeholder to resolve.
    SubmitQuery {
        job_id: String,
        message_id: MessageId,
        question: String,
    },
    /// Re-trigger backend processing for a job.
    TriggerProcessing { job_id: String },
    /// Fetch the processing history for one sentence hash.
    FetchSentenceChain { sentence_hash: String },
}
