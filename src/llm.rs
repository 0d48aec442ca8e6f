/// LLM provider clients.
///
/// One client per provider, all behind the [`LlmClient`] trait. The mapping
/// from configured provider to concrete client lives in [`create_client`].
mod claude;
mod client;
mod gemini;

use std::sync::Arc;

pub use claude::{ClaudeClient, ClaudeClientBuilder};
pub use client::{LlmClient, LlmError, Provider};
pub use gemini::{GeminiClient, GeminiClientBuilder};

use crate::config::{Config, ConfigError};

/// Errors from [`create_client`].
#[derive(Debug, thiserror::Error)]
pub enum ClientSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] LlmError),
}

/// Constructs the client for `provider` from the configuration.
///
/// # Errors
///
/// Returns `ClientSetupError::Config` with `ConfigError::MissingVar` when the
/// provider's API key is absent, or `ClientSetupError::Client` if the HTTP
/// client cannot be built.
pub fn create_client(
    provider: Provider,
    config: &Config,
) -> Result<Arc<dyn LlmClient>, ClientSetupError> {
    let api_key = config
        .api_key_for(provider)
        .ok_or_else(|| ConfigError::MissingVar(provider.credential_var().to_string()))?;
    let model = config.model_for(provider);

    let client: Arc<dyn LlmClient> = match provider {
        Provider::Gemini => {
            let mut builder = GeminiClientBuilder::new(api_key);
            if let Some(model) = model {
                builder = builder.model(model);
            }
            Arc::new(builder.build()?)
        }
        Provider::Claude => {
            let mut builder = ClaudeClientBuilder::new(api_key);
            if let Some(model) = model {
                builder = builder.model(model);
            }
            Arc::new(builder.build()?)
        }
    };

    Ok(client)
}
