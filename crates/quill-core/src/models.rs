//! Data model types for quillnotes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Embedding vector type, shared with pgvector.
pub use pgvector::Vector;

/// A note: the retrievable unit.
///
/// A note is always scoped to exactly one owner; retrieval never crosses
/// owner boundaries. The embedding is present only if it has been computed
/// for the current title/content; every mutating write invalidates it and
/// triggers regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    /// Precomputed embedding of `"{title}\n\n{content}"`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// The text that gets embedded for this note.
    ///
    /// Title and content are combined so the title's wording contributes to
    /// semantic matching.
    pub fn embedding_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }
}

/// Request to create a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
}

/// A note paired with a transient retrieval score.
///
/// The score is a keyword match count in keyword mode, or a similarity in
/// (0.5, 1] in embedding mode. It exists only to order one result set and is
/// never persisted; the orchestrator strips it before returning.
#[derive(Debug, Clone)]
pub struct RankedNote {
    pub note: Note,
    pub score: f32,
}

impl RankedNote {
    pub fn new(note: Note, score: f32) -> Self {
        Self { note, score }
    }
}

/// How a time range was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRangeKind {
    /// Derived from a relative phrase such as "yesterday".
    RelativePhrase,
    /// Explicit start/end instants (e.g. from the query parser).
    Absolute,
}

/// An inclusive time range attached to a query.
///
/// Invariant: `start <= end`. The constructor normalizes reversed bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTimeRange {
    pub kind: TimeRangeKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The phrase that matched, for display and debugging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_phrase: Option<String>,
}

impl ParsedTimeRange {
    /// Create a range, swapping the bounds if they arrive reversed.
    pub fn new(kind: TimeRangeKind, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        Self {
            kind,
            start,
            end,
            matched_phrase: None,
        }
    }

    /// Attach the phrase this range was derived from.
    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.matched_phrase = Some(phrase.into());
        self
    }

    /// Whether an instant falls inside the range. Both bounds are inclusive.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Structured intent extracted from one user question.
///
/// Ephemeral: derived per retrieval call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Topic strings to search for. Non-empty when parsing succeeds.
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<ParsedTimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}
