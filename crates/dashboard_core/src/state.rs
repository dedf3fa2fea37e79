use std::collections::BTreeMap;

use crate::records::{
    ChainEntry, ChatMessage, ChatRole, DocumentRecord, JobStatusSnapshot, MessageId, Reference,
    SentenceChain,
};
use crate::status::{derive_status, format_status_label, StatusCategory};
use crate::view_model::{
    ActivePanel, AppViewModel, DocumentRowView, Notice, NoticeSeverity, ProgressView,
};

/// Client-side session state.
///
/// Documents live in two layers: `provisional` rows created optimistically at
/// submission time (newest first) and the authoritative `fetched` list. The
/// visible list is the deduplicated union, provisional rows first; at most one
/// row per job identifier is ever visible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    provisional: Vec<DocumentRecord>,
    /// temp id -> server-assigned job id, installed at promotion.
    temp_to_job: BTreeMap<String, String>,
    fetched: Vec<DocumentRecord>,
    statuses: BTreeMap<String, JobStatusSnapshot>,
    status_seq: BTreeMap<String, u64>,
    chains: BTreeMap<String, Vec<ChainEntry>>,
    chain_seq: BTreeMap<String, u64>,
    chats: BTreeMap<String, Vec<ChatMessage>>,
    /// job id -> placeholder message awaiting an answer.
    pending_queries: BTreeMap<String, MessageId>,
    active: Option<String>,
    watched_job: Option<String>,
    watched_chain: Option<String>,
    /// Reference detail currently open, fetched by sentence hash.
    sentence_chain: Option<SentenceChain>,
    notification: Option<Notice>,
    loading_documents: bool,
    documents_error: Option<String>,
    next_temp: u64,
    next_message: MessageId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once after any state change; used to coalesce rendering.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Insert a provisional row under a fresh temporary id and select it.
    pub(crate) fn insert_provisional(&mut self, filename: &str) -> String {
        self.next_temp += 1;
        let temp_id = format!("temp-{}", self.next_temp);
        self.provisional.insert(
            0,
            DocumentRecord {
                job_id: temp_id.clone(),
                filename: filename.to_string(),
                status: "uploading".to_string(),
                created_at: None,
                failure_reason: None,
            },
        );
        self.active = Some(temp_id.clone());
        self.mark_dirty();
        temp_id
    }

    /// Re-key a provisional row to its server-assigned job id.
    ///
    /// Idempotent: promoting the same temp id to the same job id again is a
    /// no-op after the first call.
    pub(crate) fn promote(&mut self, temp_id: &str, record: DocumentRecord) {
        if self.temp_to_job.get(temp_id).map(String::as_str) == Some(record.job_id.as_str()) {
            return;
        }
        let job_id = record.job_id.clone();
        if let Some(row) = self
            .provisional
            .iter_mut()
            .find(|row| row.job_id == temp_id || row.job_id == job_id)
        {
            *row = record;
        }
        self.temp_to_job.insert(temp_id.to_string(), job_id.clone());
        if self.active.as_deref() == Some(temp_id) {
            self.active = Some(job_id);
        }
        self.mark_dirty();
    }

    /// Replace the provisional row with its terminal upload record. The row
    /// stays visible until the next authoritative list refresh prunes it.
    pub(crate) fn finalize(&mut self, temp_id: &str, record: DocumentRecord) {
        let resolved = self.resolve_id(temp_id);
        if let Some(row) = self
            .provisional
            .iter_mut()
            .find(|row| row.job_id == temp_id || row.job_id == resolved)
        {
            *row = record;
        }
        self.temp_to_job.remove(temp_id);
        self.mark_dirty();
    }

    /// Drop the provisional row after an upload failure and surface the error.
    pub(crate) fn fail(&mut self, temp_id: &str, message: &str) {
        let resolved = self.resolve_id(temp_id);
        self.provisional
            .retain(|row| row.job_id != temp_id && row.job_id != resolved);
        self.temp_to_job.remove(temp_id);
        if self.active.as_deref() == Some(temp_id) || self.active.as_deref() == Some(&resolved) {
            self.active = None;
        }
        self.notify_error("Upload failed", message);
        self.mark_dirty();
    }

    fn resolve_id(&self, id: &str) -> String {
        self.temp_to_job
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub(crate) fn begin_documents_load(&mut self) {
        self.loading_documents = true;
        self.documents_error = None;
        self.mark_dirty();
    }

    /// Install the authoritative list, newest first, and prune any
    /// provisional shadow it now covers.
    pub(crate) fn set_documents(&mut self, mut documents: Vec<DocumentRecord>) {
        // RFC 3339 compares lexicographically; None sorts below Some, so
        // undated rows end up last.
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.provisional
            .retain(|row| !documents.iter().any(|doc| doc.job_id == row.job_id));
        let provisional = &self.provisional;
        self.temp_to_job
            .retain(|_, job_id| provisional.iter().any(|row| row.job_id == *job_id));
        self.fetched = documents;
        self.loading_documents = false;
        self.documents_error = None;
        if let Some(active) = self.active.clone() {
            if self.document(&active).is_none() {
                self.active = None;
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn documents_load_failed(&mut self, message: &str) {
        self.loading_documents = false;
        self.documents_error = Some(message.to_string());
        self.mark_dirty();
    }

    /// Look a record up by job id, provisional rows shadowing fetched ones.
    pub fn document(&self, job_id: &str) -> Option<&DocumentRecord> {
        self.provisional
            .iter()
            .chain(self.fetched.iter())
            .find(|row| row.job_id == job_id)
    }

    fn visible_documents(&self) -> Vec<&DocumentRecord> {
        let mut seen: Vec<&str> = Vec::new();
        let mut visible = Vec::new();
        for row in self.provisional.iter().chain(self.fetched.iter()) {
            if row.job_id.is_empty() || seen.contains(&row.job_id.as_str()) {
                continue;
            }
            seen.push(&row.job_id);
            visible.push(row);
        }
        visible
    }

    fn is_provisional(&self, job_id: &str) -> bool {
        job_id.starts_with("temp-") || self.temp_to_job.values().any(|mapped| mapped == job_id)
    }

    pub(crate) fn select(&mut self, job_id: Option<String>) {
        self.active = job_id;
        self.mark_dirty();
    }

    pub fn active_job(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub(crate) fn watched_job(&self) -> Option<&str> {
        self.watched_job.as_deref()
    }

    pub(crate) fn watched_chain(&self) -> Option<&str> {
        self.watched_chain.as_deref()
    }

    pub(crate) fn set_watched_job(&mut self, job_id: Option<String>) {
        self.watched_job = job_id;
    }

    pub(crate) fn set_watched_chain(&mut self, job_id: Option<String>) {
        self.watched_chain = job_id;
    }

    /// Apply a status poll response. Responses carry the sequence number
    /// assigned at request-issue time; anything at or below the last applied
    /// sequence for the identifier is discarded.
    pub(crate) fn apply_status(&mut self, job_id: &str, seq: u64, snapshot: JobStatusSnapshot) -> bool {
        let last = self.status_seq.get(job_id).copied().unwrap_or(0);
        if seq <= last {
            return false;
        }
        self.status_seq.insert(job_id.to_string(), seq);
        self.statuses.insert(job_id.to_string(), snapshot);
        self.mark_dirty();
        true
    }

    pub(crate) fn clear_status(&mut self, job_id: &str) {
        self.statuses.remove(job_id);
        self.mark_dirty();
    }

    pub(crate) fn apply_chain(&mut self, job_id: &str, seq: u64, entries: Vec<ChainEntry>) -> bool {
        let last = self.chain_seq.get(job_id).copied().unwrap_or(0);
        if seq <= last {
            return false;
        }
        self.chain_seq.insert(job_id.to_string(), seq);
        self.chains.insert(job_id.to_string(), entries);
        self.mark_dirty();
        true
    }

    pub fn status_snapshot(&self, job_id: &str) -> Option<&JobStatusSnapshot> {
        self.statuses.get(job_id)
    }

    /// Live status string for a job: the latest poll snapshot when present,
    /// otherwise the list record.
    pub(crate) fn live_status(&self, job_id: &str) -> Option<String> {
        if let Some(snapshot) = self.statuses.get(job_id) {
            return Some(snapshot.status.clone());
        }
        self.document(job_id).map(|row| row.status.clone())
    }

    pub(crate) fn allocate_message_id(&mut self) -> MessageId {
        self.next_message += 1;
        self.next_message
    }

    pub(crate) fn push_message(&mut self, job_id: &str, message: ChatMessage) {
        self.chats
            .entry(job_id.to_string())
            .or_default()
            .push(message);
        self.mark_dirty();
    }

    /// Resolve the placeholder with the given id in place.
    pub(crate) fn resolve_message(
        &mut self,
        job_id: &str,
        message_id: MessageId,
        role: ChatRole,
        content: String,
        references: Vec<Reference>,
    ) {
        if let Some(message) = self
            .chats
            .get_mut(job_id)
            .and_then(|chat| chat.iter_mut().find(|m| m.id == message_id))
        {
            message.role = role;
            message.content = content;
            message.references = references;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_pending_query(&mut self, job_id: &str, message_id: MessageId) {
        self.pending_queries.insert(job_id.to_string(), message_id);
        self.mark_dirty();
    }

    pub(crate) fn clear_pending_query(&mut self, job_id: &str) {
        if self.pending_queries.remove(job_id).is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn pending_query(&self, job_id: &str) -> Option<MessageId> {
        self.pending_queries.get(job_id).copied()
    }

    pub(crate) fn set_sentence_chain(&mut self, chain: Option<SentenceChain>) {
        self.sentence_chain = chain;
        self.mark_dirty();
    }

    pub(crate) fn notify_info(&mut self, title: &str, body: &str) {
        self.notification = Some(Notice {
            title: title.to_string(),
            body: body.to_string(),
            severity: NoticeSeverity::Info,
        });
        self.mark_dirty();
    }

    pub(crate) fn notify_error(&mut self, title: &str, body: &str) {
        self.notification = Some(Notice {
            title: title.to_string(),
            body: body.to_string(),
            severity: NoticeSeverity::Error,
        });
        self.mark_dirty();
    }

    pub(crate) fn dismiss_notification(&mut self) {
        if self.notification.take().is_some() {
            self.mark_dirty();
        }
    }

    pub fn view(&self) -> AppViewModel {
        let documents = self
            .visible_documents()
            .into_iter()
            .map(|row| DocumentRowView {
                job_id: row.job_id.clone(),
                filename: row.filename.clone(),
                category: derive_status(Some(&row.status)),
                status_label: format_status_label(Some(&row.status)),
                provisional: self.is_provisional(&row.job_id),
                active: self.active.as_deref() == Some(row.job_id.as_str()),
            })
            .collect();

        AppViewModel {
            documents,
            active: self.active_panel(),
            sentence_chain: self.sentence_chain.clone(),
            notification: self.notification.clone(),
            loading_documents: self.loading_documents,
            documents_error: self.documents_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Reproduces the main-panel branching: uploading and pending-trigger
    /// states come from the list record, everything else from live status.
    fn active_panel(&self) -> ActivePanel {
        let Some(job_id) = self.active.as_deref() else {
            return ActivePanel::Empty;
        };
        let Some(record) = self.document(job_id) else {
            return ActivePanel::Empty;
        };
        let record_category = derive_status(Some(&record.status));
        let live_raw = self.live_status(job_id);
        let live_category = derive_status(live_raw.as_deref());
        let snapshot = self.statuses.get(job_id);

        if record_category == StatusCategory::Uploading {
            return ActivePanel::Uploading {
                filename: record.filename.clone(),
            };
        }

        if record_category == StatusCategory::Pending
            && live_category != StatusCategory::Processing
            && live_category != StatusCategory::Queued
            && live_category != StatusCategory::Completed
        {
            return ActivePanel::PendingTrigger {
                job_id: record.job_id.clone(),
                filename: record.filename.clone(),
            };
        }

        match live_category {
            StatusCategory::Processing | StatusCategory::Queued | StatusCategory::Pending => {
                ActivePanel::Processing {
                    job_id: record.job_id.clone(),
                    filename: record.filename.clone(),
                    status_label: format_status_label(live_raw.as_deref()),
                    progress: ProgressView {
                        percentage: snapshot.and_then(|s| s.progress_percentage),
                        total_sentences: snapshot.and_then(|s| s.total_sentences),
                        completed_sentences: snapshot.and_then(|s| s.completed_sentences),
                        llm_calls_made: snapshot.and_then(|s| s.llm_calls_made),
                    },
                    chain: self.chains.get(job_id).cloned().unwrap_or_default(),
                }
            }
            StatusCategory::Failed => ActivePanel::Failed {
                job_id: record.job_id.clone(),
                filename: record.filename.clone(),
                message: snapshot
                    .and_then(|s| s.failure_reason.clone())
                    .or_else(|| record.failure_reason.clone())
                    .unwrap_or_else(|| "The document could not be processed.".to_string()),
            },
            _ => ActivePanel::Chat {
                job_id: record.job_id.clone(),
                filename: record.filename.clone(),
                messages: self.chats.get(job_id).cloned().unwrap_or_default(),
                awaiting: self.pending_queries.contains_key(job_id),
                disabled_reason: if live_category == StatusCategory::Completed {
                    None
                } else {
                    Some("Chat will be enabled once processing is complete.".to_string())
                },
            },
        }
    }
}
