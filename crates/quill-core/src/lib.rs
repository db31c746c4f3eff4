//! # quill-core
//!
//! Core types, traits, and abstractions for quillnotes.
//!
//! This crate provides:
//! - The data model (notes, parsed queries, time ranges, ranked results)
//! - The error taxonomy and the [`Degradation`] taxonomy for capability-gated
//!   paths
//! - Retrieval and AI configuration types
//! - Relative time-phrase parsing (the deterministic fallback for temporal
//!   queries)
//! - The [`NoteStore`] and [`IntelligenceProvider`] traits every backend
//!   implements
//! - The structured logging field schema

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod temporal;
pub mod traits;

pub use config::{
    AiConfig, ExecutionStrategy, RetrievalConfig, DEFAULT_RETRIEVAL_LIMIT,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use error::{Degradation, Error, Gated, Result};
pub use models::{
    CreateNoteRequest, Note, ParsedQuery, ParsedTimeRange, RankedNote, TimeRangeKind, Vector,
};
pub use temporal::{
    format_relative_time, parse_relative_time, parse_relative_time_at, strip_time_phrases,
};
pub use traits::{IntelligenceProvider, NoteStore};
