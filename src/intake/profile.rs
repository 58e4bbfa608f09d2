//! Student profile accumulation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::QuestionCatalog;

/// The student's answers, keyed by question key.
///
/// Answers are free text and accepted as given; judging whether an answer
/// is usable happens upstream, against the generated reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileAccumulator {
    answers: BTreeMap<String, String>,
}

impl ProfileAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the answer for a question key.
    pub fn record(&mut self, key: &str, answer: &str) {
        self.answers
            .insert(key.to_string(), answer.trim().to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Render the collected answers in ordinal order, one line per answered
    /// question, skipping anything unanswered.
    pub fn summary(&self, catalog: &QuestionCatalog) -> Vec<String> {
        catalog
            .iter()
            .filter_map(|q| {
                self.answers
                    .get(q.key)
                    .map(|answer| format!("{}: {}: {}", q.key, q.prompt, answer))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_get() {
        let mut profile = ProfileAccumulator::new();
        assert!(profile.is_empty());

        profile.record("major", "  Nursing ");
        assert_eq!(profile.get("major"), Some("Nursing"));
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn record_overwrites_existing_answer() {
        let mut profile = ProfileAccumulator::new();
        profile.record("major", "Nursing");
        profile.record("major", "Business");
        assert_eq!(profile.get("major"), Some("Business"));
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn summary_follows_ordinal_order_and_skips_unanswered() {
        let catalog = QuestionCatalog::standard();
        let mut profile = ProfileAccumulator::new();
        // Answer out of order, leave two unanswered.
        profile.record("veteran_status", "No");
        profile.record("major", "Engineering");
        profile.record("fafsa_eligible", "Yes");

        let summary = profile.summary(&catalog);
        assert_eq!(summary.len(), 3);
        assert!(summary[0].starts_with("major:"));
        assert!(summary[1].starts_with("veteran_status:"));
        assert!(summary[2].starts_with("fafsa_eligible:"));
        assert!(summary[0].contains("Engineering"));
    }

    #[test]
    fn summary_empty_profile() {
        let catalog = QuestionCatalog::standard();
        let profile = ProfileAccumulator::new();
        assert!(profile.summary(&catalog).is_empty());
    }
}
