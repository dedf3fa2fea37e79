use dashboard_core::{
    ChainEntry, DocumentRecord, JobStatusSnapshot, MessageId, Reference, SentenceChain,
};

/// Error classification for everything that can go wrong talking to the
/// backend. Transport and HTTP failures are normalized into this one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Timeout,
    HttpStatus(u16),
    MalformedPayload,
    /// The backend accepted the request but reported the work itself failed.
    Backend,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// Raw response body, when one was received and parsed.
    pub payload: Option<serde_json::Value>,
}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    pub(crate) fn http(status: u16, message: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self {
            kind: ApiErrorKind::HttpStatus(status),
            message: message.into(),
            payload,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::MalformedPayload, message)
    }

    /// HTTP status code, if this error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::HttpStatus(status) => Some(status),
            _ => None,
        }
    }
}

/// Response of the upload-initiation endpoint: the job id plus the presigned
/// write target for the raw file bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInit {
    pub job_id: String,
    pub pre_signed_url: String,
}

/// Answer of the synchronous query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryOutcome {
    pub answer: String,
    pub references: Vec<Reference>,
}

/// One poll result of the asynchronous query-status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryStatus {
    pub status: String,
    pub answer: Option<String>,
    pub references: Vec<Reference>,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Everything the engine reports back to the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Documents {
        result: Result<Vec<DocumentRecord>, ApiError>,
    },
    UploadAccepted {
        temp_id: String,
        record: DocumentRecord,
    },
    UploadFinished {
        temp_id: String,
        record: DocumentRecord,
        /// Set when the processing trigger failed; the document stays pending.
        trigger_error: Option<ApiError>,
    },
    UploadFailed {
        temp_id: String,
        error: ApiError,
    },
    Status {
        job_id: String,
        seq: u64,
        result: Result<JobStatusSnapshot, ApiError>,
    },
    Chain {
        job_id: String,
        seq: u64,
        entries: Vec<ChainEntry>,
    },
    /// The chain poller hit its consecutive-failure tolerance. Polling keeps
    /// going; the shell keeps showing the last-good entries.
    ChainStalled {
        job_id: String,
        error: ApiError,
    },
    QueryAnswered {
        job_id: String,
        message_id: MessageId,
        outcome: QueryOutcome,
    },
    /// The synchronous query path gave up; an async query was submitted and
    /// is being polled under `query_id`.
    QueryFellBack {
        job_id: String,
        message_id: MessageId,
        query_id: String,
    },
    QueryFailed {
        job_id: String,
        message_id: MessageId,
        error: ApiError,
    },
    TriggerFinished {
        job_id: String,
        result: Result<(), ApiError>,
    },
    SentenceChain {
        sentence_hash: String,
        result: Result<SentenceChain, ApiError>,
    },
}
