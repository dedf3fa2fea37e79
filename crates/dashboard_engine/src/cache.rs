use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashboard_core::DocumentRecord;

/// Short-lived cache for the document list, shared between refresh requests.
///
/// A refresh without `force` is served from here while the entry is younger
/// than the TTL; uploads invalidate it so the next refresh hits the network.
#[derive(Debug)]
pub struct DocsCache {
    ttl: Duration,
    inner: Mutex<Option<CacheEntry>>,
}

#[derive(Debug)]
struct CacheEntry {
    stored_at: Instant,
    documents: Vec<DocumentRecord>,
}

impl DocsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(None),
        }
    }

    /// The cached list, if it has not yet expired.
    pub fn fresh(&self) -> Option<Vec<DocumentRecord>> {
        let guard = self.inner.lock().ok()?;
        let entry = guard.as_ref()?;
        (entry.stored_at.elapsed() < self.ttl).then(|| entry.documents.clone())
    }

    pub fn store(&self, documents: Vec<DocumentRecord>) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(CacheEntry {
                stored_at: Instant::now(),
                documents,
            });
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
    }
}

impl Default for DocsCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
