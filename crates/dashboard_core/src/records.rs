//! Canonical client-side records.
//!
//! The engine's adapter boundary is the only producer of these types; the
//! rest of the workspace never sees raw wire payloads.

/// Identifier for a chat message within the session. Stable across the
/// synchronous and asynchronous query paths so a placeholder resolves in
/// place.
pub type MessageId = u64;

/// One document row as listed by the backend, or provisionally by the client
/// while an upload is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentRecord {
    /// Server-assigned opaque identifier, or a `temp-*` id before promotion.
    pub job_id: String,
    pub filename: String,
    /// Raw server status vocabulary; categorize with [`crate::derive_status`].
    pub status: String,
    /// RFC 3339 creation time, used for newest-first ordering.
    pub created_at: Option<String>,
    pub failure_reason: Option<String>,
}

/// Live processing status for one job, as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStatusSnapshot {
    pub job_id: String,
    pub status: String,
    pub filename: Option<String>,
    pub progress_percentage: Option<u8>,
    pub total_sentences: Option<u32>,
    pub completed_sentences: Option<u32>,
    pub llm_calls_made: Option<u32>,
    pub failure_reason: Option<String>,
}

/// One timestamped backend processing stage. Append-only from the client's
/// perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub stage: String,
    pub timestamp: String,
    pub status: Option<String>,
    pub sentence_number: Option<u32>,
    pub duration_ms: Option<u64>,
    pub message: Option<String>,
}

/// Node of a knowledge-graph fragment. The `node_type` is a kāraka role
/// label, opaque to the dashboard beyond display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub node_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// A citation linking an answer to a sentence and its graph fragment.
/// Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub sentence_text: String,
    pub sentence_hash: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Processing history for a single sentence, keyed by its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceChain {
    pub sentence_hash: String,
    pub stages: Vec<ChainEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    Error,
    System,
}

/// One transcript entry. Assistant placeholders are inserted at submission
/// time and resolved in place when the answer (or failure) arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    pub references: Vec<Reference>,
}
