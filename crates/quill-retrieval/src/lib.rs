//! # quill-retrieval
//!
//! The semantic retrieval pipeline for quillnotes: given a natural language
//! question and an owner, find the notes most relevant to it.
//!
//! This crate provides:
//! - [`RetrievalOrchestrator`]: the single entry point routing between
//!   embedding similarity and deterministic keyword search
//! - [`keyword`]: token-overlap scoring, the no-AI and fallback search mode
//! - [`similarity`]: in-process embedding similarity ranking
//! - [`NoteService`]: note writes with best-effort embedding maintenance
//! - [`ChatResponder`]: question answering grounded in retrieved notes
//!
//! Degradation is layered, never propagated: AI unavailable steps down to
//! keyword search, store failure steps down to an empty result, completion
//! failure steps down to a fixed fallback message.

pub mod chat;
pub mod dedup;
pub mod keyword;
pub mod notes;
pub mod orchestrator;
pub mod similarity;

// Re-export core types
pub use quill_core::*;

pub use chat::{ChatReply, ChatResponder, CHAT_ERROR_FALLBACK, NO_MATCHING_NOTES};
pub use dedup::dedup_by_id;
pub use notes::NoteService;
pub use orchestrator::{retrieve_unique, RetrievalOrchestrator, RetrievalOutcome};
