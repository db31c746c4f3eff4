//! Core traits for quillnotes abstractions.
//!
//! These traits define the seams between the retrieval pipeline and its
//! external collaborators (the note store and the AI provider), enabling
//! pluggable backends and in-memory test doubles.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Gated, Result};
use crate::models::{CreateNoteRequest, Note, ParsedQuery, ParsedTimeRange, RankedNote, Vector};

// =============================================================================
// NOTE STORE
// =============================================================================

/// Persistence collaborator for notes, keyed by owner.
///
/// The retrieval subsystem never owns notes; it borrows candidate sets from
/// this store and returns ranked views. Every query is scoped to a single
/// owner — cross-owner retrieval is forbidden at this boundary.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a new note. The embedding starts absent; the caller enqueues
    /// regeneration separately.
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by id.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// Replace title and content, bumping `updated_at`. Clears the stored
    /// embedding, which no longer reflects the content.
    async fn update_content(&self, id: Uuid, title: &str, content: &str) -> Result<Note>;

    /// Write back a freshly computed embedding.
    async fn set_embedding(&self, id: Uuid, embedding: &Vector) -> Result<()>;

    /// Delete a note. Deleted notes are excluded from all future retrieval.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// List an owner's notes, optionally bounded to an inclusive
    /// `updated_at` range, ordered by `updated_at` descending.
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        range: Option<&ParsedTimeRange>,
    ) -> Result<Vec<Note>>;

    /// Case-insensitive substring search over title and content, scoped to
    /// one owner.
    async fn search_text(&self, owner_id: Uuid, term: &str, limit: i64) -> Result<Vec<Note>>;

    /// Server-side nearest-neighbor search: returns notes ordered by
    /// descending similarity, already filtered to `similarity > threshold`
    /// and scoped to `owner_id` (and to `range` when present).
    async fn match_notes(
        &self,
        query_embedding: &Vector,
        threshold: f32,
        limit: i64,
        owner_id: Uuid,
        range: Option<&ParsedTimeRange>,
    ) -> Result<Vec<RankedNote>>;
}

// =============================================================================
// INTELLIGENCE PROVIDER
// =============================================================================

/// Capability-gated access to the embedding/completion provider.
///
/// Every operation returns [`Gated`]: a missing credential is the permanent
/// `ConfigAbsent` state, transient failures become `Provider`/`Parse`. No
/// method panics or surfaces a transport error directly — a provider hiccup
/// must only ever weaken retrieval to its deterministic fallback.
#[async_trait]
pub trait IntelligenceProvider: Send + Sync {
    /// Whether a credential was configured at startup. Fixed for the
    /// lifetime of the provider; never re-read at runtime.
    fn is_enabled(&self) -> bool;

    /// Compute a fixed-length embedding vector for `text`.
    async fn generate_embedding(&self, text: &str) -> Gated<Vector>;

    /// Extract structured intent (topics, time range, action, content type)
    /// from a free-text query.
    async fn parse_query(&self, query: &str) -> Gated<ParsedQuery>;

    /// Generate a chat completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Gated<String>;
}
