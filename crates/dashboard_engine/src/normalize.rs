//! Adapter boundary between backend payloads and canonical records.
//!
//! The backend is inconsistent about casing, field synonyms and sometimes
//! returns DynamoDB tagged values verbatim. Everything is normalized here, in
//! one place, so the rest of the workspace only ever sees
//! [`dashboard_core`] records.

use serde_json::{Map, Value};

use dashboard_core::{
    ChainEntry, DocumentRecord, GraphEdge, GraphNode, JobStatusSnapshot, Reference, SentenceChain,
};

use crate::types::{ApiError, QueryOutcome, QueryStatus, UploadInit};

/// Unwrap a DynamoDB tagged value (`{"S":..}`, `{"N":..}`, `{"BOOL":..}`,
/// `{"M":{..}}`, `{"L":[..]}`) into its plain JSON equivalent. Untagged
/// values pass through unchanged.
pub fn unwrap_dynamo_value(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    if let Some(s) = map.get("S") {
        return s.clone();
    }
    if let Some(n) = map.get("N") {
        return match n {
            Value::String(raw) => raw
                .parse::<f64>()
                .ok()
                .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                .unwrap_or(Value::Null),
            other => other.clone(),
        };
    }
    if let Some(b) = map.get("BOOL") {
        return Value::Bool(matches!(b, Value::Bool(true)));
    }
    if let Some(Value::Object(inner)) = map.get("M") {
        return normalize_dynamo_item(inner.clone());
    }
    if let Some(Value::Array(items)) = map.get("L") {
        return Value::Array(items.iter().cloned().map(unwrap_dynamo_value).collect());
    }
    Value::Object(map)
}

/// Unwrap every value of a DynamoDB item map.
pub fn normalize_dynamo_item(item: Map<String, Value>) -> Value {
    Value::Object(
        item.into_iter()
            .map(|(key, value)| (key, unwrap_dynamo_value(value)))
            .collect(),
    )
}

/// First non-empty string found under any of the candidate keys.
fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match map.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn number_field(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match map.get(*key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                if let Ok(parsed) = s.parse::<f64>() {
                    return Some(parsed);
                }
            }
            _ => {}
        }
    }
    None
}

fn u32_field(map: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    number_field(map, keys).map(|n| n.max(0.0) as u32)
}

fn u64_field(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    number_field(map, keys).map(|n| n.max(0.0) as u64)
}

/// Progress is clamped to the displayable 0–100 range.
fn percentage_field(map: &Map<String, Value>, keys: &[&str]) -> Option<u8> {
    number_field(map, keys).map(|n| n.clamp(0.0, 100.0) as u8)
}

/// Interpret a payload as an object, unwrapping a DynamoDB item when none of
/// the probe keys is present in plain form.
fn object_normalized(value: &Value, probe_keys: &[&str]) -> Option<Map<String, Value>> {
    let Value::Object(map) = value else {
        return None;
    };
    if probe_keys.iter().any(|key| map.contains_key(*key)) {
        return Some(map.clone());
    }
    match normalize_dynamo_item(map.clone()) {
        Value::Object(normalized) => Some(normalized),
        _ => None,
    }
}

/// A collection payload is accepted as a bare array or nested under one of
/// the candidate keys.
fn collection<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Value::Array(items) = value {
        return items;
    }
    if let Value::Object(map) = value {
        for key in keys {
            if let Some(Value::Array(items)) = map.get(*key) {
                return items;
            }
        }
    }
    &[]
}

pub fn parse_document(value: &Value) -> Result<DocumentRecord, ApiError> {
    let map = object_normalized(value, &["job_id", "status"])
        .ok_or_else(|| ApiError::malformed("Invalid document payload received from API"))?;
    let job_id = string_field(&map, &["job_id", "jobId"])
        .ok_or_else(|| ApiError::malformed("Document missing job_id field"))?;
    Ok(DocumentRecord {
        job_id,
        filename: string_field(&map, &["filename", "file_name", "name"])
            .unwrap_or_else(|| "(unnamed)".to_string()),
        status: string_field(&map, &["status", "document_status"])
            .unwrap_or_else(|| "unknown".to_string()),
        created_at: string_field(&map, &["created_at", "createdAt"]),
        failure_reason: string_field(&map, &["failure_reason", "error_message"]),
    })
}

pub fn parse_document_list(value: &Value) -> Result<Vec<DocumentRecord>, ApiError> {
    collection(value, &["data", "documents", "Items"])
        .iter()
        .map(parse_document)
        .collect()
}

pub fn parse_upload_init(value: &Value) -> Result<UploadInit, ApiError> {
    let map = object_normalized(value, &["job_id", "jobId"]).unwrap_or_default();
    let job_id = string_field(&map, &["job_id", "jobId"]);
    let pre_signed_url = string_field(&map, &["pre_signed_url", "preSignedUrl", "presigned_url"]);
    match (job_id, pre_signed_url) {
        (Some(job_id), Some(pre_signed_url)) => Ok(UploadInit {
            job_id,
            pre_signed_url,
        }),
        _ => Err(ApiError::malformed(
            "Upload endpoint did not return job_id or pre_signed_url",
        )),
    }
}

/// Status payloads never fail parsing: anything unreadable degrades to an
/// `unknown` status for the requested job.
pub fn parse_job_status(value: &Value, job_id: &str) -> JobStatusSnapshot {
    let map = object_normalized(value, &["job_id", "status"]).unwrap_or_default();
    JobStatusSnapshot {
        job_id: string_field(&map, &["job_id", "jobId"]).unwrap_or_else(|| job_id.to_string()),
        status: string_field(&map, &["status", "document_status"])
            .unwrap_or_else(|| "unknown".to_string()),
        filename: string_field(&map, &["filename", "file_name"]),
        progress_percentage: percentage_field(&map, &["progress_percentage", "progressPercentage"]),
        total_sentences: u32_field(&map, &["total_sentences", "totalSentences"]),
        completed_sentences: u32_field(&map, &["completed_sentences", "completedSentences"]),
        llm_calls_made: u32_field(&map, &["llm_calls_made", "llmCallsMade"]),
        failure_reason: string_field(&map, &["failure_reason", "error_message"]),
    }
}

/// `now_iso` fills in missing timestamps so entries stay sortable.
pub fn parse_chain_entries(value: &Value, now_iso: &str) -> Vec<ChainEntry> {
    collection(value, &["entries", "data"])
        .iter()
        .map(|entry| parse_chain_entry(entry, now_iso))
        .collect()
}

fn parse_chain_entry(value: &Value, now_iso: &str) -> ChainEntry {
    let Some(map) = object_normalized(value, &["stage", "Stage"]) else {
        return ChainEntry {
            stage: "Unknown".to_string(),
            timestamp: now_iso.to_string(),
            status: None,
            sentence_number: None,
            duration_ms: None,
            message: None,
        };
    };
    ChainEntry {
        stage: string_field(&map, &["stage", "Stage"]).unwrap_or_else(|| "Unknown".to_string()),
        timestamp: string_field(&map, &["timestamp", "Timestamp"])
            .unwrap_or_else(|| now_iso.to_string()),
        status: string_field(&map, &["status", "Status"]),
        sentence_number: u32_field(&map, &["sentence_number", "sentenceNumber"]),
        duration_ms: u64_field(&map, &["duration_ms", "durationMs"]),
        message: string_field(&map, &["message"]),
    }
}

pub fn parse_references(value: &Value) -> Vec<Reference> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items.iter().filter_map(parse_reference).collect()
}

fn parse_reference(value: &Value) -> Option<Reference> {
    let map = object_normalized(value, &["sentence_text", "sentence_hash"])?;
    let snippet = map
        .get("kg_snippet")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Some(Reference {
        sentence_text: string_field(&map, &["sentence_text", "sentenceText"]).unwrap_or_default(),
        sentence_hash: string_field(&map, &["sentence_hash", "sentenceHash"]).unwrap_or_default(),
        nodes: snippet
            .get("nodes")
            .map(|nodes| collection(nodes, &[]).iter().filter_map(parse_node).collect())
            .unwrap_or_default(),
        edges: snippet
            .get("edges")
            .map(|edges| collection(edges, &[]).iter().filter_map(parse_edge).collect())
            .unwrap_or_default(),
    })
}

fn parse_node(value: &Value) -> Option<GraphNode> {
    let map = object_normalized(value, &["id", "label"])?;
    Some(GraphNode {
        id: string_field(&map, &["id"])?,
        label: string_field(&map, &["label"]).unwrap_or_default(),
        node_type: string_field(&map, &["node_type", "nodeType"]),
    })
}

fn parse_edge(value: &Value) -> Option<GraphEdge> {
    let map = object_normalized(value, &["source", "target"])?;
    Some(GraphEdge {
        source: string_field(&map, &["source"])?,
        target: string_field(&map, &["target"])?,
        label: string_field(&map, &["label"]).unwrap_or_default(),
    })
}

pub fn parse_query_outcome(value: &Value) -> Result<QueryOutcome, ApiError> {
    let map = object_normalized(value, &["answer", "references"])
        .ok_or_else(|| ApiError::malformed("Invalid query payload received from API"))?;
    Ok(QueryOutcome {
        answer: string_field(&map, &["answer"]).unwrap_or_default(),
        references: map
            .get("references")
            .map(parse_references)
            .unwrap_or_default(),
    })
}

pub fn parse_query_id(value: &Value) -> Result<String, ApiError> {
    let map = object_normalized(value, &["query_id", "queryId"]).unwrap_or_default();
    string_field(&map, &["query_id", "queryId"])
        .ok_or_else(|| ApiError::malformed("Async query submission did not return query_id"))
}

pub fn parse_query_status(value: &Value) -> QueryStatus {
    let map = object_normalized(value, &["status", "answer"]).unwrap_or_default();
    QueryStatus {
        status: string_field(&map, &["status"]).unwrap_or_else(|| "unknown".to_string()),
        answer: string_field(&map, &["answer"]),
        references: map
            .get("references")
            .map(parse_references)
            .unwrap_or_default(),
        error: string_field(&map, &["error"]),
        message: string_field(&map, &["message"]),
    }
}

pub fn parse_sentence_chain(value: &Value, sentence_hash: &str, now_iso: &str) -> SentenceChain {
    let map = object_normalized(value, &["sentence_hash", "processing_stages"]).unwrap_or_default();
    let stages_value = map
        .get("processing_stages")
        .or_else(|| map.get("data"))
        .cloned()
        .unwrap_or(Value::Array(Vec::new()));
    SentenceChain {
        sentence_hash: string_field(&map, &["sentence_hash", "sentenceHash"])
            .unwrap_or_else(|| sentence_hash.to_string()),
        stages: parse_chain_entries(&stages_value, now_iso),
    }
}
