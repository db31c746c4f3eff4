//! PostgreSQL note store implementation.

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use quill_core::{
    CreateNoteRequest, Error, Note, NoteStore, ParsedTimeRange, RankedNote, Result,
};

const NOTE_COLUMNS: &str = "id, owner_id, title, content, embedding, created_at, updated_at";

/// PostgreSQL + pgvector implementation of [`NoteStore`].
///
/// Similarity in `match_notes` is computed server-side with the same
/// expression the in-process ranker uses (`1 - squared_l2 / 2`), so both
/// execution strategies are numerically interchangeable.
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    /// Create a new store backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn note_from_row(row: &PgRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        embedding: row.try_get("embedding")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Escape LIKE wildcards in a user-supplied term. Queries use `ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl NoteStore for PgNoteStore {
    #[instrument(skip(self, req), fields(subsystem = "db", component = "notes", op = "insert"))]
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO notes (id, owner_id, title, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(req.owner_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        note_from_row(&row)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        let row = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::NoteNotFound(id))?;

        note_from_row(&row)
    }

    #[instrument(skip(self, title, content), fields(subsystem = "db", component = "notes", op = "update_content"))]
    async fn update_content(&self, id: Uuid, title: &str, content: &str) -> Result<Note> {
        // The stored embedding reflects the old content; clear it until the
        // lifecycle service writes a fresh one back.
        let row = sqlx::query(&format!(
            "UPDATE notes SET title = $1, content = $2, embedding = NULL, updated_at = $3 \
             WHERE id = $4 RETURNING {NOTE_COLUMNS}"
        ))
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::NoteNotFound(id))?;

        note_from_row(&row)
    }

    async fn set_embedding(&self, id: Uuid, embedding: &Vector) -> Result<()> {
        let result = sqlx::query("UPDATE notes SET embedding = $1 WHERE id = $2")
            .bind(embedding)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self, range), fields(subsystem = "db", component = "notes", op = "list_for_owner"))]
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        range: Option<&ParsedTimeRange>,
    ) -> Result<Vec<Note>> {
        let rows = match range {
            Some(range) => {
                sqlx::query(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes \
                     WHERE owner_id = $1 AND updated_at >= $2 AND updated_at <= $3 \
                     ORDER BY updated_at DESC"
                ))
                .bind(owner_id)
                .bind(range.start)
                .bind(range.end)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = $1 \
                     ORDER BY updated_at DESC"
                ))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list_for_owner",
            result_count = rows.len(),
            "Listed notes for owner"
        );
        rows.iter().map(note_from_row).collect()
    }

    async fn search_text(&self, owner_id: Uuid, term: &str, limit: i64) -> Result<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(term));
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE owner_id = $1 \
               AND (title ILIKE $2 ESCAPE '\\' OR content ILIKE $2 ESCAPE '\\') \
             ORDER BY updated_at DESC LIMIT $3"
        ))
        .bind(owner_id)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(note_from_row).collect()
    }

    #[instrument(skip(self, query_embedding, range), fields(subsystem = "db", component = "notes", op = "match_notes"))]
    async fn match_notes(
        &self,
        query_embedding: &Vector,
        threshold: f32,
        limit: i64,
        owner_id: Uuid,
        range: Option<&ParsedTimeRange>,
    ) -> Result<Vec<RankedNote>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, title, content, created_at, updated_at, similarity \
             FROM match_notes($1, $2, $3, $4, $5, $6)",
        )
        .bind(query_embedding)
        .bind(threshold as f64)
        // The procedure takes integer, not bigint.
        .bind(i32::try_from(limit).unwrap_or(i32::MAX))
        .bind(owner_id)
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(&self.pool)
        .await?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "match_notes",
            threshold,
            result_count = rows.len(),
            "Server-side vector search complete"
        );

        rows.iter()
            .map(|row| {
                let similarity: f64 = row.try_get("similarity")?;
                Ok(RankedNote::new(
                    Note {
                        id: row.try_get("id")?,
                        owner_id: row.try_get("owner_id")?,
                        title: row.try_get("title")?,
                        content: row.try_get("content")?,
                        // The procedure does not ship vectors back.
                        embedding: None,
                        created_at: row.try_get("created_at")?,
                        updated_at: row.try_get("updated_at")?,
                    },
                    similarity as f32,
                ))
            })
            .collect()
    }
}
