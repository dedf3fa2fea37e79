use std::fmt;

/// Coarse status category derived from the backend's free-text status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCategory {
    Pending,
    Uploading,
    Queued,
    Processing,
    Completed,
    Failed,
    #[default]
    Unknown,
}

impl StatusCategory {
    /// Terminal categories end status polling for the identifier.
    pub fn is_terminal(self) -> bool {
        matches!(self, StatusCategory::Completed | StatusCategory::Failed)
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusCategory::Pending => "pending",
            StatusCategory::Uploading => "uploading",
            StatusCategory::Queued => "queued",
            StatusCategory::Processing => "processing",
            StatusCategory::Completed => "completed",
            StatusCategory::Failed => "failed",
            StatusCategory::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

const COMPLETED_KEYWORDS: &[&str] = &["completed", "succeeded", "done", "finished"];
const FAILED_KEYWORDS: &[&str] = &["failed", "error", "stopped"];
const PROCESSING_KEYWORDS: &[&str] = &["processing", "running", "in_progress", "processing_kg"];

/// Derive a coarse category from a raw server status string.
///
/// Matching is case-insensitive substring search, checked in a fixed priority
/// order: completed before failed before processing. The backend vocabulary
/// never matches two groups at once, but the ordering keeps ambiguous future
/// strings deterministic.
pub fn derive_status(raw: Option<&str>) -> StatusCategory {
    let Some(raw) = raw else {
        return StatusCategory::Unknown;
    };
    let status = raw.to_ascii_lowercase();
    if COMPLETED_KEYWORDS.iter().any(|kw| status.contains(kw)) {
        return StatusCategory::Completed;
    }
    if FAILED_KEYWORDS.iter().any(|kw| status.contains(kw)) {
        return StatusCategory::Failed;
    }
    if status.contains("queued") {
        return StatusCategory::Queued;
    }
    if PROCESSING_KEYWORDS.iter().any(|kw| status.contains(kw)) {
        return StatusCategory::Processing;
    }
    if status.contains("upload") {
        return StatusCategory::Uploading;
    }
    if status.contains("pending") {
        return StatusCategory::Pending;
    }
    StatusCategory::Unknown
}

/// Human-readable label for a raw status string: underscores become spaces
/// and each word is title-cased. An absent status renders as "Unknown".
pub fn format_status_label(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return "Unknown".to_string();
    };
    raw.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
