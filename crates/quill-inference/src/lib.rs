//! # quill-inference
//!
//! Embedding/completion provider integration for quillnotes.
//!
//! This crate provides:
//! - [`OpenAiBackend`]: the raw OpenAI-compatible HTTP transport
//!   (embeddings, chat completions, schema-constrained structured output)
//! - [`AiProvider`]: the capability-gated [`quill_core::IntelligenceProvider`]
//!   implementation, with lazy one-shot client initialization and the
//!   never-propagate degradation policy
//! - A deterministic mock provider for tests (feature `mock`)
//!
//! The absence of a credential is a first-class steady state: a provider
//! built without one reports `Degradation::ConfigAbsent` on every gated
//! call and the retrieval pipeline runs in deterministic fallback mode.

pub mod openai;
pub mod provider;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use quill_core::*;

pub use openai::OpenAiBackend;
pub use provider::AiProvider;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbeddingGenerator, MockIntelligence};
