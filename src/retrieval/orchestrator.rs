//! Response orchestration — dispatch with bounded retry, reply
//! classification, and session state transitions.

use std::sync::Arc;

use tokio::time::sleep;

use crate::config::{GenerationConfig, RetryPolicy, ScholiConfig};
use crate::error::{Error, RetrievalError};
use crate::intake::prompts::{self, ReplyVerdict};
use crate::intake::{QuestionCatalog, Session};

use super::{GeneratedReply, GenerationRequest, RetrievalProvider};

/// Drives one conversation turn end to end: builds the stage-appropriate
/// instruction, calls the retrieval capability with bounded retry, and
/// applies the resulting state transitions to the session.
pub struct ResponseOrchestrator {
    provider: Arc<dyn RetrievalProvider>,
    catalog: QuestionCatalog,
    knowledge_base_id: String,
    model_arn: String,
    generation: GenerationConfig,
    retry: RetryPolicy,
}

impl ResponseOrchestrator {
    pub fn new(
        provider: Arc<dyn RetrievalProvider>,
        catalog: QuestionCatalog,
        config: &ScholiConfig,
    ) -> Self {
        Self {
            provider,
            catalog,
            knowledge_base_id: config.knowledge_base_id.clone(),
            model_arn: config.model_arn(),
            generation: config.generation,
            retry: config.retry,
        }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    /// Submit a prompt to the knowledge base, retrying on transient
    /// overload.
    ///
    /// Attempt `i` sleeps `i × backoff_unit` before the next try. After the
    /// last attempt the transient error is returned as-is; any other
    /// failure propagates immediately without retry.
    pub async fn dispatch(&self, prompt: &str) -> Result<GeneratedReply, RetrievalError> {
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            knowledge_base_id: self.knowledge_base_id.clone(),
            model_arn: self.model_arn.clone(),
            generation: self.generation,
        };

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.provider.retrieve_and_generate(&request).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.backoff_unit * attempt;
                    tracing::warn!(attempt, ?delay, "Knowledge base throttled, backing off");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::warn!(
                            attempts = max_attempts,
                            "Knowledge base still throttled, giving up"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Process one user turn against the session.
    ///
    /// On a transient overload the session is left exactly as it was, so
    /// the student can resubmit the same text. On a fatal failure the user
    /// turn stays recorded but no assistant turn is appended.
    pub async fn process_turn(&self, session: &mut Session, input: &str) -> Result<String, Error> {
        let input = input.trim();
        let n = self.catalog.count();
        let stage = session.sequencer().current();

        // "Go back" is handled locally; the prior question is re-asked
        // without touching the knowledge base.
        if stage <= n && prompts::wants_previous_question(input) {
            let moved = session.sequencer_mut().retreat();
            let question = self.catalog.get(session.sequencer().current())?;
            let reply = prompts::reask(question, moved);
            session.push_user(input);
            session.push_assistant(&reply);
            tracing::info!(
                session = %session.id,
                stage = session.sequencer().current(),
                moved,
                "Stepped back to previous question"
            );
            return Ok(reply);
        }

        let first_turn = session.history().is_empty();
        let prompt = if first_turn {
            prompts::opening(self.catalog.get(1)?)
        } else if stage <= n {
            prompts::intake_instruction(&self.catalog, stage, input, session.profile())?
        } else {
            prompts::analysis_instruction(&self.catalog, session.profile())
        };

        session.push_user(input);
        let reply = match self.dispatch(&prompt).await {
            Ok(reply) => reply,
            Err(e) if e.is_transient() => {
                // Unwind the turn so resubmitting doesn't duplicate it.
                session.pop_user_turn();
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let verdict = if first_turn {
            ReplyVerdict::default()
        } else {
            prompts::classify_reply(stage, n, &reply.text)
        };

        if verdict.advance && stage <= n {
            let question = self.catalog.get(stage)?;
            session.profile_mut().record(question.key, input);
        }
        if verdict.short_circuit_to_analysis {
            session.sequencer_mut().force_analysis();
        } else if verdict.advance {
            session.sequencer_mut().advance();
        }
        if verdict.advance {
            tracing::info!(
                session = %session.id,
                from = stage,
                to = session.sequencer().current(),
                "Stage advanced"
            );
        }

        let cleaned = prompts::strip_markers(&reply.text);
        session.push_assistant(&cleaned);
        Ok(cleaned)
    }
}
