use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::session::Message;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 800,
        }
    }
}

/// The remote inference provider. One call per chat turn, no retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        sampling: &SamplingParams,
    ) -> Result<String, ProviderError>;
}

#[derive(Clone, PartialEq)]
pub enum Credential {
    ApiKey(String),
    BearerToken(String),
    None,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("ApiKey([hidden])"),
            Credential::BearerToken(_) => f.write_str("BearerToken([hidden])"),
            Credential::None => f.write_str("None"),
        }
    }
}

// Client for an Azure OpenAI / OpenAI-compatible chat completions endpoint
pub struct AzureOpenAiClient {
    endpoint: String,
    api_version: Option<String>,
    credential: Credential,
    client: Client,
}

impl AzureOpenAiClient {
    pub fn new(endpoint: &str, credential: Credential, api_version: Option<String>) -> Self {
        info!("Initializing chat completions client for {}", endpoint);

        if credential == Credential::None {
            warn!("No credential configured; requests to {} are sent unauthenticated", endpoint);
        }

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version,
            credential,
            client: Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    fn apply_credential(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Credential::ApiKey(key) => builder.header("api-key", key),
            Credential::BearerToken(token) => builder.bearer_auth(token),
            Credential::None => builder,
        }
    }
}

#[async_trait]
impl CompletionClient for AzureOpenAiClient {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        sampling: &SamplingParams,
    ) -> Result<String, ProviderError> {
        info!(
            "Requesting completion from model {} with {} messages (max_tokens: {})",
            model,
            messages.len(),
            sampling.max_tokens
        );

        let payload = json!({
            "model": model,
            "messages": messages,
            "temperature": sampling.temperature,
            "max_tokens": sampling.max_tokens
        });
        debug!("Payload: {}", payload);

        let mut request = self.client.post(self.completions_url()).json(&payload);
        if let Some(version) = &self.api_version {
            request = request.query(&[("api-version", version)]);
        }

        let response = self.apply_credential(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api { status, body });
        }

        let response_json: Value = response.json().await?;
        debug!("Response JSON: {}", response_json);

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidResponse(
                    "Failed to extract content from response".to_string(),
                )
            })?;

        info!("Response length: {} characters", content.len());
        Ok(content.to_string())
    }
}
