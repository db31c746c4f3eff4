//! Result-set deduplication.

use std::collections::HashSet;

use quill_core::Note;
use uuid::Uuid;

/// Remove duplicate notes by id, keeping the first (highest-ranked)
/// occurrence.
///
/// Retrieval can surface the same note more than once when fallback paths
/// overlap; downstream consumers (the chat responder in particular) render
/// each note exactly once.
pub fn dedup_by_id(notes: Vec<Note>) -> Vec<Note> {
    let mut seen: HashSet<Uuid> = HashSet::with_capacity(notes.len());
    notes
        .into_iter()
        .filter(|note| seen.insert(note.id))
        .collect()
}
