//! Intake conversation — questionnaire, stage machine, profile, session.
//!
//! The intake is a structured conversation: a fixed sequence of eligibility
//! questions is put to the student one at a time, answers accumulate into a
//! profile, and once every question is answered the conversation moves to
//! the terminal analysis stage, where the profile is matched against the
//! scholarship knowledge base.

pub mod catalog;
pub mod profile;
pub mod prompts;
pub mod session;
pub mod stage;

pub use catalog::{Question, QuestionCatalog};
pub use profile::ProfileAccumulator;
pub use prompts::{ReplyVerdict, ACK_MARKER, ANALYSIS_MARKER};
pub use session::{Role, Session, Turn};
pub use stage::StageSequencer;
