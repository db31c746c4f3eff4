//! Structured logging schema and field name constants for quillnotes.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (candidates, tokens) |

use tracing_subscriber::{fmt, EnvFilter};

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "retrieval", "db", "inference", "chat"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "orchestrator", "keyword", "similarity", "provider", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "find_similar_notes", "generate_embedding", "parse_query"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Owner UUID scoping a retrieval call.
pub const OWNER_ID: &str = "owner_id";

/// Retrieval query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of candidate notes considered.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Byte length of a prompt or response.
pub const PROMPT_LEN: &str = "prompt_len";

// ─── Retrieval fields ──────────────────────────────────────────────────────

/// Whether the AI path was enabled for a call.
pub const AI_ENABLED: &str = "ai_enabled";

/// Similarity threshold applied in embedding mode.
pub const THRESHOLD: &str = "threshold";

/// Retrieval mode chosen for a call ("keyword", "embedding").
pub const MODE: &str = "mode";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Initialize a tracing subscriber for binaries and integration tests.
///
/// Respects `RUST_LOG`; defaults to `info` when unset. Safe to call more
/// than once — subsequent calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
