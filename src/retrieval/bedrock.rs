//! Amazon Bedrock knowledge-base client.
//!
//! Calls the `retrieveAndGenerate` operation of the Bedrock agent runtime
//! over HTTPS, authenticated with a Bedrock API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::ScholiConfig;
use crate::error::RetrievalError;

use super::{GeneratedReply, GenerationRequest, RetrievalProvider};

/// HTTP client for the Bedrock agent runtime.
pub struct BedrockAgentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl BedrockAgentClient {
    pub fn new(region: &str, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "https://bedrock-agent-runtime.{region}.amazonaws.com/retrieveAndGenerate"
            ),
            api_key,
        }
    }

    pub fn from_config(config: &ScholiConfig) -> Self {
        Self::new(&config.region, config.api_key.clone())
    }
}

#[async_trait]
impl RetrievalProvider for BedrockAgentClient {
    async fn retrieve_and_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedReply, RetrievalError> {
        let body = RetrieveAndGenerateBody {
            input: InputText {
                text: &request.prompt,
            },
            retrieve_and_generate_configuration: RagConfiguration {
                kind: "KNOWLEDGE_BASE",
                knowledge_base_configuration: KnowledgeBaseConfiguration {
                    knowledge_base_id: &request.knowledge_base_id,
                    model_arn: &request.model_arn,
                    generation_configuration: GenerationConfiguration {
                        inference_config: InferenceConfig {
                            text_inference_config: TextInferenceConfig {
                                temperature: request.generation.temperature,
                                max_tokens: request.generation.max_tokens,
                            },
                        },
                    },
                },
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(&response);
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, retry_after, &error_body));
        }

        let parsed: RetrieveAndGenerateOutput =
            response
                .json()
                .await
                .map_err(|e| RetrievalError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        tracing::debug!(chars = parsed.output.text.len(), "Generated reply received");
        Ok(GeneratedReply {
            text: parsed.output.text,
        })
    }
}

fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map an HTTP failure onto the retrieval error taxonomy. Throttling is the
/// only transient case; everything else is fatal.
fn classify_http_failure(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> RetrievalError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("ThrottlingException") {
        RetrievalError::RateLimited { retry_after }
    } else {
        RetrievalError::RequestFailed {
            reason: format!("{status}: {body}"),
        }
    }
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveAndGenerateBody<'a> {
    input: InputText<'a>,
    retrieve_and_generate_configuration: RagConfiguration<'a>,
}

#[derive(Debug, Serialize)]
struct InputText<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RagConfiguration<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    knowledge_base_configuration: KnowledgeBaseConfiguration<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseConfiguration<'a> {
    knowledge_base_id: &'a str,
    model_arn: &'a str,
    generation_configuration: GenerationConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfiguration {
    inference_config: InferenceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    text_inference_config: TextInferenceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInferenceConfig {
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct RetrieveAndGenerateOutput {
    output: OutputText,
}

#[derive(Debug, Deserialize)]
struct OutputText {
    text: String,
}
