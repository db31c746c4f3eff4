//! Note lifecycle service: writes plus best-effort embedding maintenance.
//!
//! Embedding generation rides along with every create and update but never
//! gates the write: a note with a stale or missing embedding is still a
//! saved note, and keyword search covers it until the next successful
//! refresh.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use quill_core::{
    CreateNoteRequest, Degradation, IntelligenceProvider, Note, NoteStore, Result,
};

/// Create/update/delete notes, keeping embeddings fresh when the provider
/// allows it.
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    provider: Arc<dyn IntelligenceProvider>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>, provider: Arc<dyn IntelligenceProvider>) -> Self {
        Self { store, provider }
    }

    /// Persist a new note, then try to embed it.
    pub async fn create_note(&self, req: CreateNoteRequest) -> Result<Note> {
        let note = self.store.insert(req).await?;
        Ok(self.refresh_embedding(note).await)
    }

    /// Rewrite a note's title and content.
    ///
    /// The store invalidates the stored embedding as part of the write, so
    /// a failed refresh leaves the note unembedded rather than mismatched.
    pub async fn update_note(&self, id: Uuid, title: &str, content: &str) -> Result<Note> {
        let note = self.store.update_content(id, title, content).await?;
        Ok(self.refresh_embedding(note).await)
    }

    pub async fn get_note(&self, id: Uuid) -> Result<Note> {
        self.store.fetch(id).await
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await
    }

    /// Embed the note's current text and persist the vector.
    ///
    /// Never fails the caller: a disabled provider is the expected steady
    /// state, and transient provider or store failures just leave the note
    /// without an embedding until its next write.
    async fn refresh_embedding(&self, mut note: Note) -> Note {
        let embedding = match self.provider.generate_embedding(&note.embedding_text()).await {
            Ok(embedding) => embedding,
            Err(Degradation::ConfigAbsent) => {
                debug!(
                    subsystem = "notes",
                    component = "note_service",
                    note_id = %note.id,
                    "AI disabled, skipping embedding"
                );
                return note;
            }
            Err(degradation) => {
                warn!(
                    subsystem = "notes",
                    component = "note_service",
                    note_id = %note.id,
                    error_msg = %degradation,
                    "Embedding generation failed, note saved without embedding"
                );
                return note;
            }
        };

        if let Err(e) = self.store.set_embedding(note.id, &embedding).await {
            warn!(
                subsystem = "notes",
                component = "note_service",
                note_id = %note.id,
                error_msg = %e,
                "Failed to persist embedding"
            );
            return note;
        }

        note.embedding = Some(embedding);
        note
    }
}
