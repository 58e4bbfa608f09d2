//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Generation parameters forwarded to the model behind the knowledge base.
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 300,
        }
    }
}

/// Retry policy for transient overload from the retrieval service.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Attempt `i` sleeps `i × backoff_unit` before the next attempt.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(2),
        }
    }
}

/// Assistant configuration, loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct ScholiConfig {
    /// Bedrock knowledge base holding the scholarship corpus.
    pub knowledge_base_id: String,
    /// Foundation model the knowledge base generates with.
    pub model_id: String,
    /// AWS region the knowledge base lives in.
    pub region: String,
    /// Bedrock API key (bearer token).
    pub api_key: SecretString,
    pub generation: GenerationConfig,
    pub retry: RetryPolicy,
}

impl ScholiConfig {
    /// Load configuration from the environment.
    ///
    /// `KNOWLEDGE_BASE_ID` and `AWS_BEARER_TOKEN_BEDROCK` are required;
    /// model and region fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let knowledge_base_id = require_env("KNOWLEDGE_BASE_ID")?;
        let api_key = SecretString::from(require_env("AWS_BEARER_TOKEN_BEDROCK")?);
        let model_id = std::env::var("BEDROCK_MODEL_ID")
            .unwrap_or_else(|_| "anthropic.claude-3-haiku-20240307-v1:0".to_string());
        let region =
            std::env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "us-west-2".to_string());

        Ok(Self {
            knowledge_base_id,
            model_id,
            region,
            api_key,
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
        })
    }

    /// Fully-qualified ARN for the configured foundation model.
    pub fn model_arn(&self) -> String {
        format!(
            "arn:aws:bedrock:{}::foundation-model/{}",
            self.region, self.model_id
        )
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}
