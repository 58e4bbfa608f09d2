//! Scholi — scholarship-intake conversation core.
//!
//! A fixed eligibility questionnaire is put to the student one question at
//! a time; answers accumulate into a profile, and once intake completes the
//! profile is matched against a scholarship knowledge base through an
//! external retrieve-and-generate capability.

pub mod config;
pub mod error;
pub mod intake;
pub mod retrieval;
