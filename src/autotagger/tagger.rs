//! Provider-agnostic tag inference.
//!
//! This module provides the [`Tagger`] contract and [`AutoTagger`], which
//! composes prompt building, the provider call, response parsing and
//! normalization on top of any [`LlmClient`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::llm::{LlmClient, LlmError};
use crate::models::Content;

use super::normalizer::{TagNormalizer, Vocabulary};
use super::parser::parse_tags;
use super::prompt::build_prompt;

/// Errors returned by [`Tagger::infer_tags`].
#[derive(Debug, Error)]
pub enum TaggerError {
    /// The provider is throttling; the run should stop rather than retry
    #[error("Rate limited: {0}")]
    RateLimited(#[source] LlmError),

    /// Network, authentication or other provider failure
    #[error("Provider error: {0}")]
    Provider(#[source] LlmError),

    /// The completion did not contain the expected JSON object
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The completion parsed, but no valid tag survived normalization
    #[error("Model returned no usable tags")]
    NoTags,
}

impl TaggerError {
    /// Returns `true` if the provider signalled throttling.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, TaggerError::RateLimited(_))
    }
}

impl From<LlmError> for TaggerError {
    fn from(error: LlmError) -> Self {
        if error.is_rate_limit() {
            TaggerError::RateLimited(error)
        } else {
            TaggerError::Provider(error)
        }
    }
}

/// Infers tags for extracted record content.
pub trait Tagger {
    /// Returns between 1 and `max_tags` unique, canonical tags.
    ///
    /// # Errors
    ///
    /// Returns `TaggerError::RateLimited` when the provider throttles, and the
    /// other variants for failures that are worth one retry.
    fn infer_tags(&self, content: &Content, max_tags: usize) -> Result<Vec<String>, TaggerError>;

    /// Delay to insert between records to respect the provider's rate budget.
    fn pacing(&self) -> Duration;
}

/// Tags content using an LLM client and the run's existing vocabulary.
///
/// # Examples
///
/// ```no_run
/// use notion_tagger::autotagger::{AutoTagger, Tagger, Vocabulary};
/// use notion_tagger::llm::GeminiClientBuilder;
/// use notion_tagger::models::Content;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClientBuilder::new("api-key").build()?;
/// let tagger = AutoTagger::new(Arc::new(client), Vocabulary::from_tags(["Rust"]));
///
/// let content: Content = [("Name", "Writing a CLI with clap")].into_iter().collect();
/// let tags = tagger.infer_tags(&content, 5)?;
/// println!("{}", tags.join(", "));
/// # Ok(())
/// # }
/// ```
pub struct AutoTagger {
    client: Arc<dyn LlmClient>,
    vocabulary: Vocabulary,
}

impl AutoTagger {
    /// Creates a tagger that prefers spellings from `vocabulary`.
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>, vocabulary: Vocabulary) -> Self {
        Self { client, vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl Tagger for AutoTagger {
    fn infer_tags(&self, content: &Content, max_tags: usize) -> Result<Vec<String>, TaggerError> {
        let prompt = build_prompt(content, max_tags, &self.vocabulary);
        let response = self.client.complete(&prompt)?;

        let raw = parse_tags(&response)?;
        let mut tags = TagNormalizer::normalize_tags(raw, &self.vocabulary);
        tags.truncate(max_tags);

        if tags.is_empty() {
            return Err(TaggerError::NoTags);
        }
        Ok(tags)
    }

    fn pacing(&self) -> Duration {
        self.client.provider().pacing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;
    use std::sync::Mutex;

    struct MockLlmClient {
        response: Result<String, u16>,
        captured_prompt: Mutex<Option<String>>,
    }

    impl MockLlmClient {
        fn replying(response: &str) -> Self {
            Self {
                response: Ok(response.to_string()),
                captured_prompt: Mutex::new(None),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                response: Err(status),
                captured_prompt: Mutex::new(None),
            }
        }
    }

    impl LlmClient for MockLlmClient {
        fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            *self.captured_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(429) => Err(LlmError::RateLimited { status: 429 }),
                Err(status) => Err(LlmError::Http {
                    status: *status,
                    message: String::new(),
                }),
            }
        }

        fn provider(&self) -> Provider {
            Provider::Claude
        }
    }

    fn content() -> Content {
        [("Name", "Deploying Rust services with GitHub Actions")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_full_workflow_with_mock_client() {
        let mock = MockLlmClient::replying(
            "Here are the tags:\n\n```json\n{\"tags\": [\"rust\", \"github-actions\", \"RUST\"]}\n```",
        );
        let tagger = AutoTagger::new(Arc::new(mock), Vocabulary::default());

        let tags = tagger.infer_tags(&content(), 5).unwrap();
        assert_eq!(tags, vec!["Rust", "GithubActions"]);
    }

    #[test]
    fn test_vocabulary_spelling_applied() {
        let mock = MockLlmClient::replying(r#"{"tags": ["github actions", "ci"]}"#);
        let tagger = AutoTagger::new(
            Arc::new(mock),
            Vocabulary::from_tags(["GitHubActions", "CI"]),
        );

        let tags = tagger.infer_tags(&content(), 5).unwrap();
        assert_eq!(tags, vec!["GitHubActions", "CI"]);
    }

    #[test]
    fn test_prompt_includes_content_and_vocabulary() {
        let mock = Arc::new(MockLlmClient::replying(r#"{"tags": ["Rust"]}"#));
        let tagger = AutoTagger::new(mock.clone(), Vocabulary::from_tags(["Kubernetes"]));

        tagger.infer_tags(&content(), 2).unwrap();

        let captured = mock.captured_prompt.lock().unwrap();
        let prompt = captured.as_deref().unwrap();
        assert!(prompt.contains("Deploying Rust services"));
        assert!(prompt.contains("Kubernetes"));
        assert!(prompt.contains("between 1 and 2 tags"));
    }

    #[test]
    fn test_output_truncated_to_max_tags() {
        let mock = MockLlmClient::replying(r#"{"tags": ["A1", "B2", "C3", "D4"]}"#);
        let tagger = AutoTagger::new(Arc::new(mock), Vocabulary::default());

        assert_eq!(tagger.infer_tags(&content(), 2).unwrap(), vec!["A1", "B2"]);
    }

    #[test]
    fn test_empty_tag_list_is_error() {
        let mock = MockLlmClient::replying(r#"{"tags": ["", "!!!"]}"#);
        let tagger = AutoTagger::new(Arc::new(mock), Vocabulary::default());

        assert!(matches!(
            tagger.infer_tags(&content(), 5),
            Err(TaggerError::NoTags)
        ));
    }

    #[test]
    fn test_missing_tags_key_is_error() {
        let mock = MockLlmClient::replying(r#"{"labels": ["Rust"]}"#);
        let tagger = AutoTagger::new(Arc::new(mock), Vocabulary::default());

        assert!(matches!(
            tagger.infer_tags(&content(), 5),
            Err(TaggerError::NoTags)
        ));
    }

    #[test]
    fn test_malformed_response_propagates() {
        let mock = MockLlmClient::replying("I cannot help with that.");
        let tagger = AutoTagger::new(Arc::new(mock), Vocabulary::default());

        assert!(matches!(
            tagger.infer_tags(&content(), 5),
            Err(TaggerError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_rate_limit_is_distinguished() {
        let tagger = AutoTagger::new(Arc::new(MockLlmClient::failing(429)), Vocabulary::default());

        let err = tagger.infer_tags(&content(), 5).unwrap_err();
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_http_error_is_provider_error() {
        let tagger = AutoTagger::new(Arc::new(MockLlmClient::failing(500)), Vocabulary::default());

        let err = tagger.infer_tags(&content(), 5).unwrap_err();
        assert!(matches!(err, TaggerError::Provider(LlmError::Http { status: 500, .. })));
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn test_pacing_follows_provider() {
        let tagger = AutoTagger::new(
            Arc::new(MockLlmClient::replying("{}")),
            Vocabulary::default(),
        );
        assert_eq!(tagger.pacing(), Provider::Claude.pacing());
    }
}
