//! Chat-completion client used to answer questions about extracted text.
//!
//! The provider is any OpenAI-compatible `/chat/completions` endpoint. The
//! client is constructed once at process start and injected into the QA
//! pipeline; the credential lives on the client, not in process globals.
//! Every call issues exactly one outbound request, with no retry, fallback
//! model, or caching.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while querying the completion service.
#[derive(Debug, Error)]
pub enum CompletionClientError {
    /// No API key was configured for the provider.
    #[error("Completion service credential missing: {0}")]
    MissingCredential(String),
    /// HTTP layer failed before receiving a response.
    #[error("Completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider responded with an unexpected status code.
    #[error("Completion service returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Provider response decoded but carried no usable answer.
    #[error("Malformed completion response: {0}")]
    InvalidResponse(String),
}

/// Inputs for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full extracted document text, passed to the model verbatim.
    pub document_text: String,
    /// Caller-supplied question, opaque to the pipeline.
    pub question: String,
}

/// Interface implemented by completion providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Ask the model one question about one document, returning its answer
    /// text unmodified.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<String, CompletionClientError>;
}

/// Reqwest-backed client for OpenAI-compatible chat-completion APIs.
pub struct OpenAiCompletionClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompletionClient {
    /// Construct a client with explicit settings.
    ///
    /// A missing API key is tolerated here; calls fail with
    /// [`CompletionClientError::MissingCredential`] instead, so the server
    /// can start without the credential present.
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
    ) -> Result<Self, CompletionClientError> {
        let http = Client::builder().user_agent("askdoc/0.1").build()?;
        tracing::debug!(
            base_url = %base_url,
            model = %model,
            max_tokens,
            has_api_key = api_key.is_some(),
            "Initialized completion client"
        );
        Ok(Self {
            http,
            base_url,
            api_key,
            model,
            max_tokens,
        })
    }

    /// Construct a client from the process configuration.
    pub fn from_config() -> Result<Self, CompletionClientError> {
        let config = get_config();
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.completion_model.clone(),
            config.completion_max_tokens,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<String, CompletionClientError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CompletionClientError::MissingCredential("OPENAI_API_KEY is not set".into())
        })?;

        // Message order matters: document preamble, document, then question.
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": "This is a document:" },
                { "role": "system", "content": request.document_text },
                { "role": "user", "content": request.question },
            ],
            "max_tokens": self.max_tokens,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = CompletionClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Completion request rejected");
            return Err(error);
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            CompletionClientError::InvalidResponse(format!(
                "failed to decode completion response: {error}"
            ))
        })?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionClientError::InvalidResponse("no choices returned".into()))?;
        choice.message.content.ok_or_else(|| {
            CompletionClientError::InvalidResponse("first choice carried no content".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> OpenAiCompletionClient {
        OpenAiCompletionClient::new(
            server.base_url(),
            api_key.map(str::to_string),
            "gpt-3.5-turbo".into(),
            800,
        )
        .expect("client")
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            document_text: "The sky is blue.".into(),
            question: "What color is the sky?".into(),
        }
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .body_contains("This is a document:")
                    .body_contains("The sky is blue.")
                    .body_contains("What color is the sky?");
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "Blue." } }
                    ]
                }));
            })
            .await;

        let answer = client_for(&server, Some("test-key"))
            .complete(request())
            .await
            .expect("answer");

        mock.assert_async().await;
        assert_eq!(answer, "Blue.");
    }

    #[tokio::test]
    async fn identical_requests_each_issue_an_external_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "Blue." } }
                    ]
                }));
            })
            .await;

        let client = client_for(&server, Some("test-key"));
        client.complete(request()).await.expect("first call");
        client.complete(request()).await.expect("second call");

        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_without_calling_provider() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200);
            })
            .await;

        let error = client_for(&server, None)
            .complete(request())
            .await
            .expect_err("missing key");

        assert!(matches!(error, CompletionClientError::MissingCredential(_)));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn provider_error_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("quota exceeded");
            })
            .await;

        let error = client_for(&server, Some("test-key"))
            .complete(request())
            .await
            .expect_err("quota error");

        match error {
            CompletionClientError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_choice_list_is_a_malformed_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .json_body(serde_json::json!({ "choices": [] }));
            })
            .await;

        let error = client_for(&server, Some("test-key"))
            .complete(request())
            .await
            .expect_err("no choices");

        assert!(matches!(error, CompletionClientError::InvalidResponse(_)));
    }
}
