//! Capability-gated AI provider.
//!
//! [`AiProvider`] wraps the raw [`OpenAiBackend`] behind the degradation
//! policy: a missing credential is the permanent `ConfigAbsent` state, and
//! every transport or parse failure is caught and converted to a
//! [`Degradation`] — nothing in this module ever surfaces an [`Error`]
//! (or a panic) to the retrieval pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use quill_core::{
    AiConfig, Degradation, Gated, IntelligenceProvider, ParsedQuery, ParsedTimeRange,
    TimeRangeKind, Vector,
};

use crate::openai::OpenAiBackend;

const PARSE_SYSTEM_PROMPT: &str = "You extract search intent from questions about a user's \
personal notes. Respond with the topics to search for, and, when the question names one, a \
time range (RFC 3339 instants), an action, and a content type.";

/// Capability-gated access to the embedding/completion provider.
///
/// The HTTP client is built lazily, at most once per process, behind a
/// [`OnceCell`]: racing first callers produce exactly one client, and a
/// failed initialization is remembered rather than retried per call.
pub struct AiProvider {
    config: AiConfig,
    backend: OnceCell<Option<Arc<OpenAiBackend>>>,
}

impl AiProvider {
    /// Create a provider from explicit configuration. The capability flag
    /// is fixed here and never re-read.
    pub fn new(config: AiConfig) -> Self {
        if !config.is_enabled() {
            warn!(
                subsystem = "inference",
                component = "provider",
                "No API credential configured; AI features are disabled"
            );
        }
        Self {
            config,
            backend: OnceCell::new(),
        }
    }

    /// Create a provider from environment variables.
    pub fn from_env() -> Self {
        Self::new(AiConfig::from_env())
    }

    async fn backend(&self) -> Gated<Arc<OpenAiBackend>> {
        if !self.config.is_enabled() {
            return Err(Degradation::ConfigAbsent);
        }

        let slot = self
            .backend
            .get_or_init(|| async {
                match OpenAiBackend::new(&self.config) {
                    Ok(backend) => Some(Arc::new(backend)),
                    Err(e) => {
                        warn!(
                            subsystem = "inference",
                            component = "provider",
                            error = %e,
                            "Failed to initialize inference client; provider unavailable"
                        );
                        None
                    }
                }
            })
            .await;

        slot.clone()
            .ok_or_else(|| Degradation::Provider("client initialization failed".to_string()))
    }

    fn query_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topics": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 1
                },
                "time_range": {
                    "type": ["object", "null"],
                    "properties": {
                        "start": {"type": "string"},
                        "end": {"type": "string"}
                    },
                    "required": ["start", "end"],
                    "additionalProperties": false
                },
                "action": {"type": ["string", "null"]},
                "content_type": {"type": ["string", "null"]}
            },
            "required": ["topics"],
            "additionalProperties": false
        })
    }
}

#[async_trait]
impl IntelligenceProvider for AiProvider {
    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    async fn generate_embedding(&self, text: &str) -> Gated<Vector> {
        let backend = self.backend().await?;
        backend.embed_text(text).await.map_err(|e| {
            warn!(
                subsystem = "inference",
                component = "provider",
                op = "generate_embedding",
                error = %e,
                "Embedding generation failed"
            );
            Degradation::Provider(e.to_string())
        })
    }

    async fn parse_query(&self, query: &str) -> Gated<ParsedQuery> {
        let backend = self.backend().await?;
        let value = backend
            .complete_structured(PARSE_SYSTEM_PROMPT, query, "parsed_query", Self::query_schema())
            .await
            .map_err(|e| {
                warn!(
                    subsystem = "inference",
                    component = "provider",
                    op = "parse_query",
                    error = %e,
                    "Query parsing call failed"
                );
                Degradation::Provider(e.to_string())
            })?;

        let parsed = parsed_query_from_json(value)?;
        debug!(
            subsystem = "inference",
            component = "provider",
            op = "parse_query",
            topics = parsed.topics.len(),
            "Parsed query intent"
        );
        Ok(parsed)
    }

    async fn complete(&self, prompt: &str) -> Gated<String> {
        let backend = self.backend().await?;
        backend.complete(prompt).await.map_err(|e| {
            warn!(
                subsystem = "inference",
                component = "provider",
                op = "complete",
                error = %e,
                "Completion failed"
            );
            Degradation::Provider(e.to_string())
        })
    }
}

#[derive(Deserialize)]
struct RawParsedQuery {
    topics: Vec<String>,
    #[serde(default)]
    time_range: Option<RawTimeRange>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: String,
    end: String,
}

/// Interpret the model's structured output. Requires a non-empty topics
/// list; a malformed time range degrades the whole parse rather than
/// silently dropping fields, so the caller falls back deterministically.
fn parsed_query_from_json(value: serde_json::Value) -> Gated<ParsedQuery> {
    let raw: RawParsedQuery = serde_json::from_value(value)
        .map_err(|e| Degradation::Parse(format!("unexpected payload shape: {}", e)))?;

    if raw.topics.iter().all(|t| t.trim().is_empty()) {
        return Err(Degradation::Parse("topics list is empty".to_string()));
    }

    let time_range = match raw.time_range {
        Some(range) => Some(parse_instant_pair(&range.start, &range.end)?),
        None => None,
    };

    Ok(ParsedQuery {
        topics: raw
            .topics
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect(),
        time_range,
        action: raw.action.filter(|a| !a.trim().is_empty()),
        content_type: raw.content_type.filter(|c| !c.trim().is_empty()),
    })
}

fn parse_instant_pair(start: &str, end: &str) -> Gated<ParsedTimeRange> {
    let start: DateTime<Utc> = start
        .parse()
        .map_err(|e| Degradation::Parse(format!("bad start instant: {}", e)))?;
    let end: DateTime<Utc> = end
        .parse()
        .map_err(|e| Degradation::Parse(format!("bad end instant: {}", e)))?;
    Ok(ParsedTimeRange::new(TimeRangeKind::Absolute, start, end))
}
