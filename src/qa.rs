//! Question-answering pipeline: extract text, ask the model, report counters.
//!
//! The service owns the completion client and the metrics registry so the
//! HTTP surface only sees one seam. Construct it once near process start and
//! share it through an `Arc`. Nothing here persists across requests beyond
//! the counters; identical requests always re-run the full pipeline.

use crate::completion::{
    CompletionClient, CompletionClientError, CompletionRequest, OpenAiCompletionClient,
};
use crate::extract::{self, ExtractError};
use crate::metrics::{MetricsSnapshot, QaMetrics};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// An uploaded file held for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Client-supplied filename; its extension selects the decoder.
    pub filename: String,
    /// Raw uploaded bytes, discarded after extraction.
    pub content: Vec<u8>,
}

/// Errors emitted by the question-answering pipeline.
#[derive(Debug, Error)]
pub enum QaError {
    /// Document bytes could not be turned into text.
    #[error("Failed to extract document text: {0}")]
    Extract(#[from] ExtractError),
    /// The completion service call failed.
    #[error("Failed to query completion service: {0}")]
    Completion(#[from] CompletionClientError),
}

/// Interface the HTTP surface programs against.
#[async_trait]
pub trait QaApi: Send + Sync {
    /// Run the full pipeline for one document/question pair.
    async fn answer_question(
        &self,
        document: UploadedDocument,
        question: &str,
    ) -> Result<String, QaError>;

    /// Return a snapshot of request counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Coordinates extraction and the completion call for each request.
pub struct QaService {
    completion_client: Box<dyn CompletionClient + Send + Sync>,
    metrics: Arc<QaMetrics>,
}

impl QaService {
    /// Build a service backed by the configured OpenAI-compatible provider.
    pub fn new() -> Result<Self, CompletionClientError> {
        Ok(Self::with_client(Box::new(
            OpenAiCompletionClient::from_config()?,
        )))
    }

    /// Build a service around an explicit completion client.
    pub fn with_client(completion_client: Box<dyn CompletionClient + Send + Sync>) -> Self {
        Self {
            completion_client,
            metrics: Arc::new(QaMetrics::new()),
        }
    }

    async fn run(
        &self,
        document: UploadedDocument,
        question: &str,
    ) -> Result<(String, usize), QaError> {
        let document_text = extract::extract(&document.content, &document.filename)?;
        let document_chars = document_text.chars().count();
        tracing::debug!(
            file = %document.filename,
            chars = document_chars,
            "Extracted document text"
        );

        let answer = self
            .completion_client
            .complete(CompletionRequest {
                document_text,
                question: question.to_string(),
            })
            .await?;
        Ok((answer, document_chars))
    }
}

#[async_trait]
impl QaApi for QaService {
    async fn answer_question(
        &self,
        document: UploadedDocument,
        question: &str,
    ) -> Result<String, QaError> {
        match self.run(document, question).await {
            Ok((answer, document_chars)) => {
                self.metrics.record_answer(document_chars as u64);
                Ok(answer)
            }
            Err(error) => {
                self.metrics.record_failure();
                Err(error)
            }
        }
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
