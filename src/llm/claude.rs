//! Anthropic Messages API client.

use serde::Deserialize;

use super::client::{
    LlmClient, LlmError, Provider, ensure_success, http_client, transport_error, validate_base_url,
};

pub const DEFAULT_CLAUDE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 256;

/// Builder for constructing `ClaudeClient` instances.
///
/// # Examples
///
/// ```
/// use notion_tagger::llm::ClaudeClientBuilder;
///
/// let client = ClaudeClientBuilder::new("test-key")
///     .base_url("http://localhost:8080")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "http://localhost:8080");
/// ```
#[derive(Debug)]
pub struct ClaudeClientBuilder {
    api_key: String,
    base_url: Option<String>,
    model: Option<String>,
}

impl ClaudeClientBuilder {
    /// Creates a builder authenticated with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `ClaudeClient`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidUrl` for an unparseable base URL, or
    /// `LlmError::Network` if the HTTP client cannot be created.
    pub fn build(self) -> Result<ClaudeClient, LlmError> {
        let base_url =
            validate_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_CLAUDE_URL))?;

        Ok(ClaudeClient {
            client: http_client()?,
            api_key: self.api_key,
            base_url,
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string()),
        })
    }
}

/// Synchronous client for the Anthropic Messages API.
pub struct ClaudeClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ClaudeClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl LlmClient for ClaudeClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .map_err(transport_error)?;

        let body = ensure_success(response)?.text().map_err(transport_error)?;
        completion_text(&body)
    }

    fn provider(&self) -> Provider {
        Provider::Claude
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// Concatenates all text blocks of a Messages API response.
fn completion_text(body: &str) -> Result<String, LlmError> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(LlmError::Serialization)?;

    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::Api {
            provider: Provider::Claude,
            message: "response contained no text content".to_string(),
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_uses_defaults() {
        let client = ClaudeClientBuilder::new("key").build().unwrap();

        assert_eq!(client.base_url(), DEFAULT_CLAUDE_URL);
        assert_eq!(client.model(), DEFAULT_CLAUDE_MODEL);
        assert_eq!(client.provider(), Provider::Claude);
    }

    #[test]
    fn model_method_sets_custom_model() {
        let client = ClaudeClientBuilder::new("key")
            .model("claude-test")
            .build()
            .unwrap();

        assert_eq!(client.model(), "claude-test");
    }

    #[test]
    fn build_returns_error_if_invalid_url_provided() {
        let result = ClaudeClientBuilder::new("key").base_url("::::").build();
        assert!(matches!(result, Err(LlmError::InvalidUrl(_))));
    }

    #[test]
    fn completion_text_reads_text_blocks() {
        let body = serde_json::json!({
            "id": "msg_1",
            "content": [
                { "type": "text", "text": "{\"tags\": [\"Rust\"]}" },
                { "type": "tool_use", "id": "x" }
            ]
        })
        .to_string();

        assert_eq!(completion_text(&body).unwrap(), "{\"tags\": [\"Rust\"]}");
    }

    #[test]
    fn completion_text_without_text_is_api_error() {
        let body = r#"{"content": []}"#;

        assert!(matches!(
            completion_text(body),
            Err(LlmError::Api {
                provider: Provider::Claude,
                ..
            })
        ));
    }
}
