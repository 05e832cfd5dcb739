use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing question-answering activity.
#[derive(Default)]
pub struct QaMetrics {
    questions_answered: AtomicU64,
    questions_failed: AtomicU64,
    // 0 means "no document processed yet"; extracted documents with content
    // always have at least one character.
    last_document_chars: AtomicU64,
}

impl QaMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully answered question and the extracted text size.
    pub fn record_answer(&self, document_chars: u64) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
        self.last_document_chars
            .store(document_chars, Ordering::Relaxed);
    }

    /// Record a request that failed during extraction or completion.
    pub fn record_failure(&self) {
        self.questions_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let last_document_chars = self.last_document_chars.load(Ordering::Relaxed);
        MetricsSnapshot {
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            questions_failed: self.questions_failed.load(Ordering::Relaxed),
            last_document_chars: (last_document_chars > 0).then_some(last_document_chars),
        }
    }
}

/// Immutable view of request counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of questions answered successfully since startup.
    pub questions_answered: u64,
    /// Number of requests that failed during extraction or completion.
    pub questions_failed: u64,
    /// Character count of the most recently extracted document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_document_chars: Option<u64>,
}
