//! Conversation session — the per-conversation aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::ProfileAccumulator;
use super::stage::StageSequencer;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single conversation: history, stage position, and accumulated profile.
///
/// One `Session` exists per independent conversation; sessions share no
/// state. A fresh session sits at the first question with empty history and
/// profile, and `reset` returns it there, discarding everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    history: Vec<Turn>,
    sequencer: StageSequencer,
    profile: ProfileAccumulator,
}

impl Session {
    pub fn new(question_count: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            history: Vec::new(),
            sequencer: StageSequencer::new(question_count),
            profile: ProfileAccumulator::new(),
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn sequencer(&self) -> &StageSequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut StageSequencer {
        &mut self.sequencer
    }

    pub fn profile(&self) -> &ProfileAccumulator {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut ProfileAccumulator {
        &mut self.profile
    }

    pub fn push_user(&mut self, content: &str) {
        self.history.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.history.push(Turn::assistant(content));
    }

    /// Rewrite the most recent assistant turn in place. Used while a reply
    /// is still being revealed to the student. Returns false if the last
    /// turn is not an assistant turn.
    pub fn amend_last_assistant(&mut self, content: &str) -> bool {
        match self.history.last_mut() {
            Some(turn) if turn.role == Role::Assistant => {
                turn.content = content.to_string();
                true
            }
            _ => false,
        }
    }

    /// Drop the most recent turn if it is a user turn. Used to unwind a
    /// submission whose external call never produced a reply, so the
    /// student can resubmit without duplicating the turn.
    pub(crate) fn pop_user_turn(&mut self) -> bool {
        match self.history.last() {
            Some(turn) if turn.role == Role::User => {
                self.history.pop();
                true
            }
            _ => false,
        }
    }

    /// Discard history, profile, and stage, returning to the first question.
    pub fn reset(&mut self) {
        *self = Session::new(self.sequencer.question_count());
    }
}
