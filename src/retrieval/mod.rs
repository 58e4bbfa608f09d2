//! Retrieve-and-generate integration.
//!
//! The scholarship corpus lives in an Amazon Bedrock knowledge base; each
//! conversation turn sends one instruction through `retrieveAndGenerate`
//! and gets back generated text. The `RetrievalProvider` trait keeps the
//! conversation core independent of the transport: `BedrockAgentClient` is
//! the real HTTP implementation, and tests script their own.

mod bedrock;
pub mod orchestrator;

pub use bedrock::BedrockAgentClient;
pub use orchestrator::ResponseOrchestrator;

use async_trait::async_trait;

use crate::config::GenerationConfig;
use crate::error::RetrievalError;

/// One retrieve-and-generate request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The full instruction text for this turn.
    pub prompt: String,
    /// Knowledge base to retrieve from.
    pub knowledge_base_id: String,
    /// Foundation model ARN to generate with.
    pub model_arn: String,
    pub generation: GenerationConfig,
}

/// Generated text returned by the capability.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub text: String,
}

/// The external completion capability: given an instruction and a knowledge
/// base, produce generated text. May fail transiently under rate limiting.
#[async_trait]
pub trait RetrievalProvider: Send + Sync {
    async fn retrieve_and_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedReply, RetrievalError>;
}
