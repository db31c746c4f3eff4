//! In-process similarity ranking over precomputed note embeddings.

use std::cmp::Ordering;

use tracing::trace;

use quill_core::{Note, RankedNote, Vector};

/// Similarity between two embedding vectors.
///
/// Computed as `1 - (Σ(a_i - b_i)² / 2)`. For unit vectors this equals
/// cosine similarity; the squared-Euclidean form is the addressable
/// behavioral contract (the server-side `match_notes` procedure evaluates
/// the identical expression) and must not be swapped for a direct cosine.
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let squared_distance: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    1.0 - squared_distance / 2.0
}

/// Rank candidates by similarity to `query_embedding`.
///
/// Candidates without a stored embedding are skipped regardless of any
/// other relevance signal. Results are filtered to `similarity > threshold`,
/// ordered descending, and truncated to `limit`.
pub fn rank(
    query_embedding: &Vector,
    candidates: &[Note],
    threshold: f32,
    limit: usize,
) -> Vec<RankedNote> {
    let query = query_embedding.as_slice();

    let mut ranked: Vec<RankedNote> = candidates
        .iter()
        .filter_map(|note| {
            let embedding = note.embedding.as_ref()?;
            let score = similarity(embedding.as_slice(), query);
            trace!(
                subsystem = "retrieval",
                component = "similarity",
                note_id = %note.id,
                score,
                "Scored candidate"
            );
            (score > threshold).then(|| RankedNote::new(note.clone(), score))
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    ranked
}
