//! Chat over notes: retrieve relevant notes, assemble a grounded prompt,
//! and produce an answer.
//!
//! Degrades in layers. With AI disabled the responder lists matching notes
//! deterministically. With AI enabled but the completion failing, the user
//! gets a fixed apology string rather than an error. Retrieval itself never
//! errors, so the worst case is an answer grounded in zero notes.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{info, warn};
use uuid::Uuid;

use quill_core::{
    format_relative_time, Degradation, IntelligenceProvider, Note, ParsedQuery,
};

use crate::orchestrator::{retrieve_unique, RetrievalOrchestrator};

/// User-facing message when the completion call fails.
pub const CHAT_ERROR_FALLBACK: &str =
    "Sorry, there was an error processing your request. Please try again later.";

/// User-facing message when retrieval finds nothing.
pub const NO_MATCHING_NOTES: &str = "No matching notes found.";

/// A chat answer plus the notes it was grounded in.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub message: String,
    /// The deduplicated notes the answer drew on, highest relevance first.
    pub notes: Vec<Note>,
}

/// Answers questions about one owner's notes.
pub struct ChatResponder {
    orchestrator: Arc<RetrievalOrchestrator>,
    provider: Arc<dyn IntelligenceProvider>,
}

impl ChatResponder {
    pub fn new(
        orchestrator: Arc<RetrievalOrchestrator>,
        provider: Arc<dyn IntelligenceProvider>,
    ) -> Self {
        Self {
            orchestrator,
            provider,
        }
    }

    /// Answer `question` for one owner.
    ///
    /// Infallible by construction: every failure mode maps to a user-facing
    /// string. Callers are responsible for serializing concurrent questions
    /// from the same conversation; the responder itself is stateless.
    pub async fn respond(&self, question: &str, owner_id: Uuid) -> ChatReply {
        let outcome = retrieve_unique(&self.orchestrator, question, owner_id, None).await;
        let now = Local::now();

        if !self.provider.is_enabled() {
            return ChatReply {
                message: note_listing(&outcome.notes, now),
                notes: outcome.notes,
            };
        }

        if outcome.notes.is_empty() {
            return ChatReply {
                message: NO_MATCHING_NOTES.to_string(),
                notes: Vec::new(),
            };
        }

        let prompt = build_prompt(question, &outcome.notes, outcome.analysis.as_ref(), now);
        let message = match self.provider.complete(&prompt).await {
            Ok(answer) => {
                info!(
                    subsystem = "chat",
                    component = "responder",
                    owner_id = %owner_id,
                    result_count = outcome.notes.len(),
                    prompt_len = prompt.len(),
                    "Generated chat answer"
                );
                answer
            }
            Err(Degradation::ConfigAbsent) => note_listing(&outcome.notes, now),
            Err(degradation) => {
                warn!(
                    subsystem = "chat",
                    component = "responder",
                    owner_id = %owner_id,
                    error_msg = %degradation,
                    "Completion failed, returning fallback message"
                );
                CHAT_ERROR_FALLBACK.to_string()
            }
        };

        ChatReply {
            message,
            notes: outcome.notes,
        }
    }
}

/// Deterministic answer for the AI-disabled path: a plain listing of the
/// matching notes with human-readable recency.
pub fn note_listing(notes: &[Note], now: DateTime<Local>) -> String {
    if notes.is_empty() {
        return NO_MATCHING_NOTES.to_string();
    }
    let mut out = String::from("Here are the notes I found:\n");
    for note in notes {
        out.push_str(&format!(
            "- {} ({})\n",
            note.title,
            format_relative_time(note.updated_at, now)
        ));
    }
    out
}

/// Assemble the grounding prompt for the completion model.
///
/// Each note renders as a markdown section with its recency so the model
/// can reason about "my latest note on X". The structured analysis, when
/// present, is attached as JSON.
pub fn build_prompt(
    question: &str,
    notes: &[Note],
    analysis: Option<&ParsedQuery>,
    now: DateTime<Local>,
) -> String {
    let mut prompt = String::from(
        "You are a helpful assistant answering questions about the user's personal notes.\n\n\
         Relevant notes:\n\n",
    );
    for note in notes {
        prompt.push_str(&format!(
            "## {} (updated {})\n{}\n\n",
            note.title,
            format_relative_time(note.updated_at, now),
            note.content
        ));
    }
    if let Some(parsed) = analysis {
        if let Ok(json) = serde_json::to_string(parsed) {
            prompt.push_str(&format!("Query analysis: {}\n\n", json));
        }
    }
    prompt.push_str(&format!(
        "Question: {}\n\n\
         Answer the question using only the notes above. If the notes do not \
         contain the answer, say so.",
        question
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 15, 30, 0).unwrap()
    }

    fn note(title: &str, content: &str, updated_at: chrono::DateTime<Utc>) -> Note {
        Note {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            title: title.to_string(),
            content: content.to_string(),
            embedding: None,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn test_listing_of_empty_results() {
        assert_eq!(note_listing(&[], fixed_now()), NO_MATCHING_NOTES);
    }

    #[test]
    fn test_listing_includes_titles_and_recency() {
        let now = fixed_now();
        let updated = now.with_timezone(&Utc) - Duration::days(1);
        let listing = note_listing(&[note("Budget review", "numbers", updated)], now);

        assert!(listing.starts_with("Here are the notes I found:"));
        assert!(listing.contains("- Budget review (yesterday)"));
    }

    #[test]
    fn test_prompt_contains_notes_question_and_instruction() {
        let now = fixed_now();
        let updated = now.with_timezone(&Utc);
        let prompt = build_prompt(
            "what about the budget?",
            &[note("Budget review", "Q2 numbers look fine.", updated)],
            None,
            now,
        );

        assert!(prompt.contains("## Budget review (updated today)"));
        assert!(prompt.contains("Q2 numbers look fine."));
        assert!(prompt.contains("Question: what about the budget?"));
        assert!(prompt.contains("using only the notes above"));
        assert!(!prompt.contains("Query analysis:"));
    }

    #[test]
    fn test_prompt_attaches_analysis_as_json() {
        let analysis = ParsedQuery {
            topics: vec!["budget".to_string()],
            time_range: None,
            action: None,
            content_type: None,
        };
        let prompt = build_prompt("q", &[], Some(&analysis), fixed_now());
        assert!(prompt.contains(r#"Query analysis: {"topics":["budget"]}"#));
    }
}
