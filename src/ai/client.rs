/// HTTP client for the remote AI function.
///
/// This module provides `AiClient` for POSTing JSON requests to the AI
/// function, along with its error type, builder and the trait the assistant
/// depends on.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::debug;

use super::types::{AiRequest, AiResponse};
use crate::config::{Config, DEFAULT_AI_TIMEOUT};

/// Errors that can occur when calling the AI function.
#[derive(Debug, Error)]
pub enum AiError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status, with the best available explanation
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No endpoint configured
    #[error("AI endpoint is not configured (set SECONDBRAIN_AI_URL or SUPABASE_URL)")]
    NotConfigured,
}

/// Trait for AI function calls.
///
/// Enables mocking in tests and swapping the transport.
#[async_trait]
pub trait AiClientTrait: Send + Sync {
    /// Sends one request and returns the body of a 2xx response.
    ///
    /// Non-success statuses are reported as [`AiError::Http`]; no retries
    /// are attempted.
    async fn send(&self, request: &AiRequest) -> Result<AiResponse, AiError>;
}

/// Stand-in client used when no endpoint is configured.
///
/// Every call fails with [`AiError::NotConfigured`], which routes tagging to
/// the local extractor.
pub struct DisabledClient;

#[async_trait]
impl AiClientTrait for DisabledClient {
    async fn send(&self, _request: &AiRequest) -> Result<AiResponse, AiError> {
        Err(AiError::NotConfigured)
    }
}

/// Builder for constructing `AiClient` instances.
///
/// # Examples
///
/// ```
/// use secondbrain::ai::AiClientBuilder;
///
/// let client = AiClientBuilder::new()
///     .endpoint("https://project.supabase.co/functions/v1/ai-process")
///     .api_key("anon-key")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.endpoint(), "https://project.supabase.co/functions/v1/ai-process");
/// ```
#[derive(Debug, Default)]
pub struct AiClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl AiClientBuilder {
    /// Creates a new `AiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the builder from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.ai_endpoint.clone(),
            api_key: Some(config.ai_api_key.clone()),
            timeout: Some(config.ai_timeout),
        }
    }

    /// Sets the full URL of the AI function.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the bearer token sent with each request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the overall per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `AiClient`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::NotConfigured`] if no endpoint was set,
    /// [`AiError::InvalidUrl`] if it does not parse, or [`AiError::Network`]
    /// if the HTTP client cannot be created.
    pub fn build(self) -> Result<AiClient, AiError> {
        let endpoint = self.endpoint.ok_or(AiError::NotConfigured)?;

        reqwest::Url::parse(&endpoint)
            .map_err(|e| AiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_AI_TIMEOUT))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(AiError::Network)?;

        Ok(AiClient {
            client,
            endpoint,
            api_key: self.api_key.unwrap_or_default(),
        })
    }
}

/// Async HTTP client for the AI function.
///
/// Construct with `AiClientBuilder`.
pub struct AiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AiClient {
    /// Returns the endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AiClientTrait for AiClient {
    async fn send(&self, request: &AiRequest) -> Result<AiResponse, AiError> {
        let body = serde_json::to_vec(request).map_err(AiError::Serialization)?;

        debug!(action = %request.action, endpoint = %self.endpoint, "Calling AI function");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .body(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(AiError::Http {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &text),
            });
        }

        debug!(action = %request.action, status = status.as_u16(), bytes = text.len(), "AI function responded");
        Ok(AiResponse::new(text))
    }
}

fn classify_transport_error(error: reqwest::Error) -> AiError {
    if error.is_timeout() {
        AiError::Timeout(error)
    } else {
        AiError::Network(error)
    }
}

/// Picks a readable message for a failed response.
///
/// Prefers the JSON `error` field; error bodies are not guaranteed to be JSON.
fn error_message(status: u16, body: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error")?.as_str().map(str::to_string))
        .filter(|message| !message.is_empty());

    match from_body {
        Some(message) => message,
        None if status == 404 => "AI feature not deployed (deploy the ai-process function)".to_string(),
        None => format!("Request failed ({})", status),
    }
}
