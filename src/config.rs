//! Runtime configuration loaded from environment variables.
//!
//! `main` loads a `.env` file first (via `dotenvy`), so every variable can also
//! be set there.

use std::time::Duration;

use thiserror::Error;

use crate::llm::Provider;

pub const DEFAULT_TAG_PROPERTY: &str = "Tags";
pub const DEFAULT_TAGGED_AT_PROPERTY: &str = "Tagged At";
pub const DEFAULT_CONTENT_PROPERTIES: &str = "Name";
pub const DEFAULT_BODY_MAX_CHARS: usize = 4000;
pub const DEFAULT_MAX_TAGS: usize = 5;
pub const DEFAULT_TAGGED_AT_BUFFER_SECS: u64 = 120;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable or credential is absent or empty
    #[error("{0} is not set")]
    MissingVar(String),

    /// A variable is present but cannot be interpreted
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub provider: Provider,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub claude_model: Option<String>,
    /// Multi-select property receiving inferred tags.
    pub tag_property: String,
    /// Date property recording when a record was last tagged.
    pub tagged_at_property: String,
    /// Properties read for text, in the order given.
    pub content_properties: Vec<String>,
    pub fetch_page_body: bool,
    pub body_max_chars: usize,
    pub max_tags: usize,
    /// Clock-skew tolerance of the idempotence guard.
    pub tagged_at_buffer: Duration,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` if `NOTION_API_KEY` or
    /// `NOTION_DATABASE_ID` is unset, and `ConfigError::InvalidValue` for
    /// unparseable provider names, numbers or a `MAX_TAGS` of zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let provider = match get("LLM_PROVIDER") {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };

        let content_properties = get("CONTENT_PROPERTIES")
            .unwrap_or_else(|| DEFAULT_CONTENT_PROPERTIES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let fetch_page_body = !matches!(
            get("FETCH_PAGE_BODY").map(|v| v.to_lowercase()).as_deref(),
            Some("false" | "0" | "no")
        );

        let max_tags = parse_number(&get, "MAX_TAGS", DEFAULT_MAX_TAGS)?;
        if max_tags == 0 {
            return Err(ConfigError::InvalidValue {
                var: "MAX_TAGS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            notion_api_key: require("NOTION_API_KEY")?,
            notion_database_id: require("NOTION_DATABASE_ID")?,
            provider,
            gemini_api_key: get("GEMINI_API_KEY"),
            claude_api_key: get("CLAUDE_API_KEY"),
            gemini_model: get("GEMINI_MODEL"),
            claude_model: get("CLAUDE_MODEL"),
            tag_property: get("TAG_PROPERTY_NAME")
                .unwrap_or_else(|| DEFAULT_TAG_PROPERTY.to_string()),
            tagged_at_property: get("TAGGED_AT_PROPERTY_NAME")
                .unwrap_or_else(|| DEFAULT_TAGGED_AT_PROPERTY.to_string()),
            content_properties,
            fetch_page_body,
            body_max_chars: parse_number(&get, "BODY_MAX_CHARS", DEFAULT_BODY_MAX_CHARS)?,
            max_tags,
            tagged_at_buffer: Duration::from_secs(parse_number(
                &get,
                "TAGGED_AT_BUFFER_SECS",
                DEFAULT_TAGGED_AT_BUFFER_SECS,
            )?),
        })
    }

    /// Returns the API key configured for `provider`, if any.
    pub fn api_key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => self.gemini_api_key.as_deref(),
            Provider::Claude => self.claude_api_key.as_deref(),
        }
    }

    /// Returns the model override configured for `provider`, if any.
    pub fn model_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => self.gemini_model.as_deref(),
            Provider::Claude => self.claude_model.as_deref(),
        }
    }
}

fn parse_number<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
