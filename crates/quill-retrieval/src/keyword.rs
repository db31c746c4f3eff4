//! Deterministic keyword search: the fallback when embeddings are
//! unavailable or AI features are disabled.

use std::cmp::Ordering;

use tracing::trace;

use quill_core::{strip_time_phrases, Note, RankedNote};

/// Tokens this short ("a", "of", "to") match everything and are dropped.
const MIN_TOKEN_LEN: usize = 3;

/// Score candidates by keyword match count and rank them.
///
/// Time phrases are stripped first so temporal words do not pollute
/// scoring ("notes from yesterday about budget" searches for "budget",
/// the time filter having already been applied upstream). Scoring is one
/// point per token found as a case-insensitive substring of the title OR
/// the content; a token present in both fields still counts once. Only
/// notes with score > 0 qualify; ties keep the candidate set's original
/// order.
pub fn search(query: &str, candidates: &[Note], limit: usize) -> Vec<RankedNote> {
    let cleaned = strip_time_phrases(&query.to_lowercase());
    let terms: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|term| term.len() >= MIN_TOKEN_LEN)
        .collect();

    let mut scored: Vec<RankedNote> = candidates
        .iter()
        .filter_map(|note| {
            let title = note.title.to_lowercase();
            let content = note.content.to_lowercase();
            let matches = terms
                .iter()
                .filter(|term| title.contains(*term) || content.contains(*term))
                .count();
            trace!(
                subsystem = "retrieval",
                component = "keyword",
                note_id = %note.id,
                matches,
                "Scored candidate"
            );
            (matches > 0).then(|| RankedNote::new(note.clone(), matches as f32))
        })
        .collect();

    // sort_by is stable: equal scores preserve candidate order.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}
