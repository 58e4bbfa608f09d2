//! Instruction construction and reply classification.
//!
//! The generation service is steered with plain-text instructions and a
//! marker protocol: it includes `[ANSWER_RECORDED]` when it judged the
//! student's answer usable, and `[BEGINNING_ANALYSIS]` when it is about to
//! produce the final match analysis. Markers are control signals between
//! the service and the orchestrator; the student never sees them.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CatalogError;

use super::catalog::{Question, QuestionCatalog};
use super::profile::ProfileAccumulator;

/// Marker the service must include when the student's answer was usable.
pub const ACK_MARKER: &str = "[ANSWER_RECORDED]";

/// Marker the service must include when it is about to run the match
/// analysis after the last question.
pub const ANALYSIS_MARKER: &str = "[BEGINNING_ANALYSIS]";

const PERSONA: &str = "\
You are Scholi, a scholarship matching assistant for community college students. \
You help students find scholarships they qualify for by walking them through a short \
eligibility questionnaire, similar to filling out a scholarship application form. \
Always be encouraging and professional. Keep responses brief and focused.";

static GO_BACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bgo(?:ing)?\s+back\b|\bprevious\s+question\b|\bback\s+up\b")
        .expect("go-back pattern is valid")
});

/// Whether the student is asking to return to the previous question.
pub fn wants_previous_question(input: &str) -> bool {
    GO_BACK.is_match(input)
}

/// Greeting seeded into a fresh conversation by the presentation layer.
pub fn greeting(first: &Question, total: u32) -> String {
    format!(
        "👋 Welcome to Scholi 🎓!\n\n\
         I'm your AI scholarship assistant for community college students. \
         I'll ask you {total} quick questions to match you with scholarships \
         you qualify for from our database. Let's get started.\n\n\
         Question 1 of {total}:\n\n{}",
        first.prompt
    )
}

/// Instruction for the very first turn of a conversation: greet and ask
/// only the first question.
pub fn opening(first: &Question) -> String {
    format!(
        "{PERSONA}\n\n\
         This is the first message of a new conversation. Greet the student warmly, \
         explain that a few quick questions will match them with scholarships, and ask \
         only this first question:\n\n{}\n\n\
         Do not ask anything else yet, and do not recommend scholarships yet.",
        first.prompt
    )
}

/// Local re-ask after a "go back" request. `moved` is whether the
/// sequencer actually stepped back.
pub fn reask(question: &Question, moved: bool) -> String {
    if moved {
        format!(
            "No problem, let's go back.\n\nQuestion {}:\n\n{}",
            question.ordinal, question.prompt
        )
    } else {
        format!(
            "We're already at the first question.\n\nQuestion {}:\n\n{}",
            question.ordinal, question.prompt
        )
    }
}

/// Instruction for intake stage `stage` in `[1, N]`: judge the student's
/// latest message against the current question and either acknowledge and
/// move on, or re-ask.
pub fn intake_instruction(
    catalog: &QuestionCatalog,
    stage: u32,
    input: &str,
    profile: &ProfileAccumulator,
) -> Result<String, CatalogError> {
    let question = catalog.get(stage)?;
    let next = catalog.get(stage + 1).ok();
    let total = catalog.count();

    let collected = profile.summary(catalog);
    let collected = if collected.is_empty() {
        "(nothing yet)".to_string()
    } else {
        collected.join("\n")
    };

    let on_valid = match next {
        Some(next) => format!(
            "thank them briefly, include the marker {ACK_MARKER}, and ask question {} of \
             {total}: \"{}\"",
            next.ordinal, next.prompt
        ),
        None => format!(
            "thank them briefly, include the marker {ACK_MARKER}, tell them that's everything \
             you need and that you're about to search for their scholarship matches, and \
             include the marker {ANALYSIS_MARKER}"
        ),
    };

    Ok(format!(
        "{PERSONA}\n\n\
         The student is currently on question {} of {total}: \"{}\"\n\n\
         Collected so far:\n{collected}\n\n\
         The student's latest message: \"{input}\"\n\n\
         Decide whether that message is a usable answer to the question, a request for \
         help or clarification, or unintelligible.\n\
         - If it is a usable answer: {on_valid}.\n\
         - If it is a request for help or unintelligible: briefly explain what the \
         question means and ask question {} again. Do not include any marker.\n\
         The markers are machine-read and removed before the student sees your reply.",
        question.ordinal, question.prompt, question.ordinal
    ))
}

/// Instruction for the analysis stage: rank every scholarship the profile
/// satisfies.
pub fn analysis_instruction(catalog: &QuestionCatalog, profile: &ProfileAccumulator) -> String {
    let summary = profile.summary(catalog);
    let summary = if summary.is_empty() {
        "(no answers recorded)".to_string()
    } else {
        summary.join("\n")
    };

    format!(
        "{PERSONA}\n\n\
         The student has completed the eligibility questionnaire. Their profile:\n\
         {summary}\n\n\
         Search the scholarship database for ALL scholarships this profile satisfies, \
         and compute a match percentage for each. Sort the results by match percentage, \
         highest first. For every match include:\n\
         - the scholarship name\n\
         - the match percentage\n\
         - the application deadline (always state it plainly)\n\
         - the award amount, if known\n\
         - why the student qualifies\n\
         - next steps to apply\n\
         Cite only specific scholarships found in the database."
    )
}

/// Outcome of classifying a generated reply for stage advancement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyVerdict {
    /// Move forward one stage.
    pub advance: bool,
    /// Jump straight to the analysis stage.
    pub short_circuit_to_analysis: bool,
}

/// Decide stage movement from the reply to an intake instruction.
///
/// This is the only place the state machine couples to the model's free
/// text: a reply carrying the acknowledgement marker advances, the last
/// question advances on any reply (there is nothing left to re-ask), and an
/// analysis announcement on the last question jumps straight to analysis.
pub fn classify_reply(stage: u32, question_count: u32, reply: &str) -> ReplyVerdict {
    if stage > question_count {
        return ReplyVerdict::default();
    }
    let last = stage == question_count;
    ReplyVerdict {
        advance: last || reply.contains(ACK_MARKER),
        short_circuit_to_analysis: last && reply.contains(ANALYSIS_MARKER),
    }
}

/// Strip control markers so the text is safe to show the student.
pub fn strip_markers(reply: &str) -> String {
    reply
        .replace(ACK_MARKER, "")
        .replace(ANALYSIS_MARKER, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::standard()
    }

    #[test]
    fn go_back_detection() {
        assert!(wants_previous_question("go back"));
        assert!(wants_previous_question("Can we GO BACK to the last one?"));
        assert!(wants_previous_question("going back a question"));
        assert!(wants_previous_question("previous question please"));
        assert!(wants_previous_question("let's back up"));

        assert!(!wants_previous_question("Nursing"));
        assert!(!wants_previous_question("my background is in finance"));
        assert!(!wants_previous_question("quarterback"));
    }

    #[test]
    fn opening_asks_only_the_first_question() {
        let catalog = catalog();
        let prompt = opening(catalog.get(1).unwrap());
        assert!(prompt.contains("first question"));
        assert!(prompt.contains("field of study"));
        assert!(!prompt.contains(ACK_MARKER));
    }

    #[test]
    fn intake_instruction_names_current_and_next_question() {
        let catalog = catalog();
        let prompt =
            intake_instruction(&catalog, 1, "Nursing", &ProfileAccumulator::new()).unwrap();
        assert!(prompt.contains("question 1 of 5"));
        assert!(prompt.contains("field of study"));
        assert!(prompt.contains("question 2 of 5"));
        assert!(prompt.contains("gender"));
        assert!(prompt.contains("Nursing"));
        assert!(prompt.contains(ACK_MARKER));
        assert!(prompt.contains("(nothing yet)"));
    }

    #[test]
    fn intake_instruction_includes_collected_answers() {
        let catalog = catalog();
        let mut profile = ProfileAccumulator::new();
        profile.record("major", "Nursing");
        let prompt = intake_instruction(&catalog, 2, "female", &profile).unwrap();
        assert!(prompt.contains("major:"));
        assert!(prompt.contains("Nursing"));
    }

    #[test]
    fn last_question_instruction_announces_analysis() {
        let catalog = catalog();
        let prompt = intake_instruction(&catalog, 5, "yes", &ProfileAccumulator::new()).unwrap();
        assert!(prompt.contains(ACK_MARKER));
        assert!(prompt.contains(ANALYSIS_MARKER));
        assert!(!prompt.contains("question 6"));
    }

    #[test]
    fn intake_instruction_rejects_out_of_range_stage() {
        let catalog = catalog();
        assert!(intake_instruction(&catalog, 6, "hi", &ProfileAccumulator::new()).is_err());
    }

    #[test]
    fn analysis_instruction_carries_full_profile() {
        let catalog = catalog();
        let mut profile = ProfileAccumulator::new();
        profile.record("major", "Nursing");
        profile.record("gender", "female");
        let prompt = analysis_instruction(&catalog, &profile);
        assert!(prompt.contains("Nursing"));
        assert!(prompt.contains("match percentage"));
        assert!(prompt.contains("deadline"));
        assert!(prompt.contains("highest first"));
    }

    #[test]
    fn classify_acknowledged_reply_advances() {
        let verdict = classify_reply(2, 5, "Thanks! [ANSWER_RECORDED] Next question...");
        assert!(verdict.advance);
        assert!(!verdict.short_circuit_to_analysis);
    }

    #[test]
    fn classify_reask_does_not_advance() {
        let verdict = classify_reply(2, 5, "Could you tell me a bit more about that?");
        assert_eq!(verdict, ReplyVerdict::default());
    }

    #[test]
    fn last_question_always_advances() {
        let verdict = classify_reply(5, 5, "Got it, thanks!");
        assert!(verdict.advance);
        assert!(!verdict.short_circuit_to_analysis);
    }

    #[test]
    fn analysis_signal_on_last_question_short_circuits() {
        let reply = "Perfect! [ANSWER_RECORDED] Searching now... [BEGINNING_ANALYSIS]";
        let verdict = classify_reply(5, 5, reply);
        assert!(verdict.advance);
        assert!(verdict.short_circuit_to_analysis);
    }

    #[test]
    fn analysis_stage_never_moves() {
        let verdict = classify_reply(6, 5, "[ANSWER_RECORDED] [BEGINNING_ANALYSIS]");
        assert_eq!(verdict, ReplyVerdict::default());
    }

    #[test]
    fn strip_markers_cleans_reply_for_display() {
        let reply = "Thanks! [ANSWER_RECORDED] On to the next one. [BEGINNING_ANALYSIS]";
        assert_eq!(strip_markers(reply), "Thanks!  On to the next one.");

        assert_eq!(strip_markers("[ANSWER_RECORDED]"), "");
        assert_eq!(strip_markers("plain reply"), "plain reply");
    }

    #[test]
    fn greeting_shows_first_question() {
        let catalog = catalog();
        let text = greeting(catalog.get(1).unwrap(), catalog.count());
        assert!(text.contains("Question 1 of 5"));
        assert!(text.contains("field of study"));
    }
}
