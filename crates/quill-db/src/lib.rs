//! # quill-db
//!
//! PostgreSQL + pgvector persistence layer for quillnotes.
//!
//! This crate provides:
//! - Connection pool management with structured logging
//! - [`PgNoteStore`], the [`quill_core::NoteStore`] implementation: owner-scoped
//!   CRUD, time-bounded listing, ILIKE text search, embedding write-back,
//!   and the `match_notes` server-side vector search procedure
//!
//! Schema lives under `migrations/`. Integration tests require a live
//! database and are `#[ignore]`d by default; set `DATABASE_URL` and run
//! `cargo test -- --ignored` against a pgvector-enabled instance.

pub mod notes;
pub mod pool;

pub use notes::PgNoteStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

// Re-export core types
pub use quill_core::*;
