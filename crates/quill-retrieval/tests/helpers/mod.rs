//! Shared test fixtures: an in-memory note store and note builders.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use quill_core::{
    CreateNoteRequest, Error, Note, NoteStore, ParsedTimeRange, RankedNote, Result, Vector,
};
use quill_retrieval::similarity;

/// In-memory [`NoteStore`] with the same observable behavior as the
/// Postgres-backed store: owner scoping, inclusive time filtering,
/// recency ordering, and server-side style similarity matching.
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
    fail: AtomicBool,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every store call fail, for exercising the retrieval error
    /// boundary.
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, note: Note) {
        self.notes.lock().unwrap().push(note);
    }

    pub fn len(&self) -> usize {
        self.notes.lock().unwrap().len()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Internal("simulated store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        self.check()?;
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id: req.owner_id,
            title: req.title,
            content: req.content,
            embedding: None,
            created_at: now,
            updated_at: now,
        };
        self.notes.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        self.check()?;
        self.notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    async fn update_content(&self, id: Uuid, title: &str, content: &str) -> Result<Note> {
        self.check()?;
        let mut notes = self.notes.lock().unwrap();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        note.title = title.to_string();
        note.content = content.to_string();
        note.embedding = None;
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn set_embedding(&self, id: Uuid, embedding: &Vector) -> Result<()> {
        self.check()?;
        let mut notes = self.notes.lock().unwrap();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        note.embedding = Some(embedding.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.check()?;
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        range: Option<&ParsedTimeRange>,
    ) -> Result<Vec<Note>> {
        self.check()?;
        let mut notes: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .filter(|n| range.map_or(true, |r| r.contains(n.updated_at)))
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    async fn search_text(&self, owner_id: Uuid, term: &str, limit: i64) -> Result<Vec<Note>> {
        self.check()?;
        let term = term.to_lowercase();
        let mut notes: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .filter(|n| {
                n.title.to_lowercase().contains(&term)
                    || n.content.to_lowercase().contains(&term)
            })
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        notes.truncate(limit as usize);
        Ok(notes)
    }

    async fn match_notes(
        &self,
        query_embedding: &Vector,
        threshold: f32,
        limit: i64,
        owner_id: Uuid,
        range: Option<&ParsedTimeRange>,
    ) -> Result<Vec<RankedNote>> {
        self.check()?;
        let candidates = self.list_for_owner(owner_id, range).await?;
        Ok(similarity::rank(
            query_embedding,
            &candidates,
            threshold,
            limit as usize,
        ))
    }
}

/// A note updated `days_ago` days before now, with an optional embedding.
pub fn note_at(
    owner_id: Uuid,
    title: &str,
    content: &str,
    days_ago: i64,
    embedding: Option<Vec<f32>>,
) -> Note {
    let updated_at: DateTime<Utc> = Utc::now() - Duration::days(days_ago);
    Note {
        id: Uuid::new_v4(),
        owner_id,
        title: title.to_string(),
        content: content.to_string(),
        embedding: embedding.map(Vector::from),
        created_at: updated_at,
        updated_at,
    }
}

/// A 2-dimensional unit vector whose similarity to `[1, 0]` is exactly
/// `cos`, for constructing candidates at known similarity levels.
pub fn unit_at(cos: f32) -> Vec<f32> {
    vec![cos, (1.0 - cos * cos).sqrt()]
}
