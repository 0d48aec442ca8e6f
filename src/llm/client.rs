//! Shared LLM client contract, error type and HTTP plumbing.
//!
//! Each provider lives in its own module and implements [`LlmClient`]; the
//! tagger only ever sees the trait.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Maximum number of response-body characters kept in error messages.
const ERROR_BODY_LIMIT: usize = 300;

/// Errors that can occur when calling an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The provider is throttling requests (HTTP 429)
    #[error("Rate limited by provider (HTTP {status})")]
    RateLimited { status: u16 },

    /// Other non-success HTTP responses
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Well-formed response that carries no usable completion
    #[error("{provider} API error: {message}")]
    Api {
        provider: Provider,
        message: String,
    },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl LlmError {
    /// Returns `true` if the provider signalled throttling.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }
}

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    /// Google Gemini (default; free tier)
    #[default]
    Gemini,
    /// Anthropic Claude
    Claude,
}

impl Provider {
    /// Environment variable holding this provider's API key.
    pub fn credential_var(self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Claude => "CLAUDE_API_KEY",
        }
    }

    /// Fixed delay between records that keeps the run under the provider's
    /// per-minute request budget.
    pub fn pacing(self) -> Duration {
        match self {
            Provider::Gemini => Duration::from_secs(4),
            Provider::Claude => Duration::from_secs(1),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Claude => write!(f, "claude"),
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "claude" => Ok(Provider::Claude),
            _ => Err(ConfigError::InvalidValue {
                var: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Trait for LLM completion calls.
///
/// This trait enables mocking in unit tests and hides provider wire formats
/// from the tagger.
pub trait LlmClient: Send + Sync {
    /// Turns a prompt into the model's raw text completion.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::RateLimited` when the provider throttles the request,
    /// and other `LlmError` variants for transport, HTTP or payload failures.
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// The provider this client talks to.
    fn provider(&self) -> Provider;
}

/// Builds the blocking HTTP client shared by all providers.
pub(crate) fn http_client() -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(LlmError::Network)
}

/// Validates a configured base URL and strips any trailing slash.
pub(crate) fn validate_base_url(base_url: &str) -> Result<String, LlmError> {
    reqwest::Url::parse(base_url)
        .map_err(|e| LlmError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Classifies a transport-level failure.
pub(crate) fn transport_error(error: reqwest::Error) -> LlmError {
    // Request URLs can carry credentials
    let error = error.without_url();
    if error.is_timeout() {
        LlmError::Timeout(error)
    } else {
        LlmError::Network(error)
    }
}

/// Maps non-success responses to `LlmError`, passing successful ones through.
pub(crate) fn ensure_success(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited {
            status: status.as_u16(),
        });
    }

    let body = response.text().unwrap_or_default();
    Err(LlmError::Http {
        status: status.as_u16(),
        message: body.chars().take(ERROR_BODY_LIMIT).collect(),
    })
}
