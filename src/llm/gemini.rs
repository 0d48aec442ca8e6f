//! Google Gemini `generateContent` client.

use serde::Deserialize;

use super::client::{
    LlmClient, LlmError, Provider, ensure_success, http_client, transport_error, validate_base_url,
};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use notion_tagger::llm::GeminiClientBuilder;
///
/// let client = GeminiClientBuilder::new("test-key")
///     .model("gemini-2.0-flash")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.model(), "gemini-2.0-flash");
/// ```
#[derive(Debug)]
pub struct GeminiClientBuilder {
    api_key: String,
    base_url: Option<String>,
    model: Option<String>,
}

impl GeminiClientBuilder {
    /// Creates a builder authenticated with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: None,
        }
    }

    /// Overrides the API base URL (mainly for tests and proxies).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `GeminiClient`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidUrl` for an unparseable base URL, or
    /// `LlmError::Network` if the HTTP client cannot be created.
    pub fn build(self) -> Result<GeminiClient, LlmError> {
        let base_url =
            validate_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_GEMINI_URL))?;

        Ok(GeminiClient {
            client: http_client()?,
            api_key: self.api_key,
            base_url,
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        })
    }
}

/// Synchronous client for the Gemini API.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl LlmClient for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .map_err(transport_error)?;

        let body = ensure_success(response)?.text().map_err(transport_error)?;
        completion_text(&body)
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenates the text parts of the first candidate.
fn completion_text(body: &str) -> Result<String, LlmError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(LlmError::Serialization)?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::Api {
            provider: Provider::Gemini,
            message: "response contained no text candidates".to_string(),
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_uses_defaults() {
        let client = GeminiClientBuilder::new("key").build().unwrap();

        assert_eq!(client.base_url(), DEFAULT_GEMINI_URL);
        assert_eq!(client.model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(client.provider(), Provider::Gemini);
    }

    #[test]
    fn build_returns_error_if_invalid_url_provided() {
        let result = GeminiClientBuilder::new("key")
            .base_url("not-a-valid-url")
            .build();

        assert!(matches!(result, Err(LlmError::InvalidUrl(_))));
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClientBuilder::new("key")
            .base_url("http://localhost:8080/")
            .model("gemini-test")
            .build()
            .unwrap();

        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn transport_error_does_not_expose_api_key() {
        let client = GeminiClientBuilder::new("SECRET-KEY-123")
            .base_url("http://127.0.0.1:1")
            .build()
            .unwrap();

        let err = client.complete("hi").unwrap_err();

        assert!(matches!(err, LlmError::Network(_) | LlmError::Timeout(_)));
        let mut rendered = format!("{err} {err:?}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        assert!(!rendered.contains("SECRET-KEY-123"), "{rendered}");
    }

    #[test]
    fn completion_text_joins_parts_of_first_candidate() {
        let body = serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "```json\n" }, { "text": "{\"tags\": []}\n```" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        })
        .to_string();

        assert_eq!(
            completion_text(&body).unwrap(),
            "```json\n{\"tags\": []}\n```"
        );
    }

    #[test]
    fn completion_text_without_candidates_is_api_error() {
        let body = r#"{"candidates": [], "promptFeedback": {"blockReason": "SAFETY"}}"#;

        assert!(matches!(
            completion_text(body),
            Err(LlmError::Api {
                provider: Provider::Gemini,
                ..
            })
        ));
    }

    #[test]
    fn completion_text_rejects_invalid_json() {
        assert!(matches!(
            completion_text("<html>"),
            Err(LlmError::Serialization(_))
        ));
    }
}
