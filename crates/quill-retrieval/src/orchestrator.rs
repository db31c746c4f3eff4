//! Retrieval orchestration: the single entry point that routes a natural
//! language question through query analysis, time filtering, and either
//! embedding similarity or keyword matching.
//!
//! The orchestrator is the error boundary for retrieval. Provider
//! degradations step down to the deterministic keyword path; store errors
//! surface as an empty outcome. Callers never see an error from
//! [`RetrievalOrchestrator::retrieve`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use quill_core::{
    parse_relative_time, ExecutionStrategy, IntelligenceProvider, Note, NoteStore, ParsedQuery,
    ParsedTimeRange, RetrievalConfig, Result,
};
use uuid::Uuid;

use crate::{dedup, keyword, similarity};

/// The result of one retrieval call.
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    /// Matching notes, highest relevance first, at most `limit` of them.
    pub notes: Vec<Note>,
    /// The structured query analysis, when AI parsing succeeded.
    pub analysis: Option<ParsedQuery>,
}

impl RetrievalOutcome {
    fn empty() -> Self {
        Self::default()
    }
}

/// Routes retrieval requests through the configured search mode.
pub struct RetrievalOrchestrator {
    store: Arc<dyn NoteStore>,
    provider: Arc<dyn IntelligenceProvider>,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    pub fn new(
        store: Arc<dyn NoteStore>,
        provider: Arc<dyn IntelligenceProvider>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve notes relevant to `query` for one owner.
    ///
    /// Never fails: any store error is logged and collapsed into an empty
    /// outcome, so a degraded retrieval subsystem reads as "no matching
    /// notes" rather than an error page.
    pub async fn retrieve(
        &self,
        query: &str,
        owner_id: Uuid,
        limit: Option<usize>,
    ) -> RetrievalOutcome {
        let started = Instant::now();
        let limit = limit.unwrap_or(self.config.default_limit);

        match self.retrieve_inner(query, owner_id, limit).await {
            Ok(outcome) => {
                info!(
                    subsystem = "retrieval",
                    component = "orchestrator",
                    operation = "retrieve",
                    owner_id = %owner_id,
                    ai_enabled = self.config.ai_enabled,
                    result_count = outcome.notes.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Retrieval complete"
                );
                outcome
            }
            Err(e) => {
                warn!(
                    subsystem = "retrieval",
                    component = "orchestrator",
                    operation = "retrieve",
                    owner_id = %owner_id,
                    error_msg = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Retrieval failed, returning empty outcome"
                );
                RetrievalOutcome::empty()
            }
        }
    }

    /// Like [`retrieve`](Self::retrieve), but returns bare notes without the
    /// query analysis.
    pub async fn find_similar_notes(
        &self,
        query: &str,
        owner_id: Uuid,
        limit: Option<usize>,
    ) -> Vec<Note> {
        self.retrieve(query, owner_id, limit).await.notes
    }

    async fn retrieve_inner(
        &self,
        query: &str,
        owner_id: Uuid,
        limit: usize,
    ) -> Result<RetrievalOutcome> {
        let analysis = self.analyze(query).await;
        let time_range = self.resolve_time_range(query, analysis.as_ref());

        if !self.config.ai_enabled {
            let notes = self
                .keyword_search(query, owner_id, time_range.as_ref(), limit)
                .await?;
            return Ok(RetrievalOutcome {
                notes,
                analysis: None,
            });
        }

        let embed_input = embedding_input(analysis.as_ref(), query);
        let notes = match self.provider.generate_embedding(&embed_input).await {
            Ok(embedding) => match self.config.strategy {
                ExecutionStrategy::Local => {
                    let candidates = self
                        .store
                        .list_for_owner(owner_id, time_range.as_ref())
                        .await?;
                    debug!(
                        subsystem = "retrieval",
                        component = "orchestrator",
                        mode = "embedding_local",
                        candidate_count = candidates.len(),
                        threshold = self.config.similarity_threshold,
                        "Ranking candidates in-process"
                    );
                    similarity::rank(
                        &embedding,
                        &candidates,
                        self.config.similarity_threshold,
                        limit,
                    )
                    .into_iter()
                    .map(|r| r.note)
                    .collect()
                }
                ExecutionStrategy::ServerSide => {
                    debug!(
                        subsystem = "retrieval",
                        component = "orchestrator",
                        mode = "embedding_server_side",
                        threshold = self.config.similarity_threshold,
                        "Delegating ranking to the store"
                    );
                    self.store
                        .match_notes(
                            &embedding,
                            self.config.similarity_threshold,
                            limit as i64,
                            owner_id,
                            time_range.as_ref(),
                        )
                        .await?
                        .into_iter()
                        .map(|r| r.note)
                        .collect()
                }
            },
            Err(degradation) => {
                warn!(
                    subsystem = "retrieval",
                    component = "orchestrator",
                    mode = "keyword_fallback",
                    error_msg = %degradation,
                    "Embedding unavailable, falling back to keyword search"
                );
                self.keyword_search(query, owner_id, time_range.as_ref(), limit)
                    .await?
            }
        };

        Ok(RetrievalOutcome { notes, analysis })
    }

    /// Run query analysis when AI is enabled. Degradations downgrade to
    /// `None`; the provider is never consulted when the capability is off.
    async fn analyze(&self, query: &str) -> Option<ParsedQuery> {
        if !self.config.ai_enabled {
            return None;
        }
        match self.provider.parse_query(query).await {
            Ok(parsed) => Some(parsed),
            Err(degradation) => {
                warn!(
                    subsystem = "retrieval",
                    component = "orchestrator",
                    error_msg = %degradation,
                    "Query analysis unavailable, continuing with raw query"
                );
                None
            }
        }
    }

    /// The analysis's time range when present; the deterministic phrase
    /// parser only runs when AI is disabled.
    fn resolve_time_range(
        &self,
        query: &str,
        analysis: Option<&ParsedQuery>,
    ) -> Option<ParsedTimeRange> {
        if let Some(range) = analysis.and_then(|a| a.time_range.clone()) {
            return Some(range);
        }
        if self.config.ai_enabled {
            return None;
        }
        parse_relative_time(query)
    }

    async fn keyword_search(
        &self,
        query: &str,
        owner_id: Uuid,
        time_range: Option<&ParsedTimeRange>,
        limit: usize,
    ) -> Result<Vec<Note>> {
        let candidates = self.store.list_for_owner(owner_id, time_range).await?;
        debug!(
            subsystem = "retrieval",
            component = "orchestrator",
            mode = "keyword",
            candidate_count = candidates.len(),
            "Scoring candidates by keyword match"
        );
        Ok(keyword::search(query, &candidates, limit)
            .into_iter()
            .map(|r| r.note)
            .collect())
    }
}

/// What gets embedded: the extracted topics when analysis produced them,
/// otherwise the raw query text.
fn embedding_input<'a>(analysis: Option<&'a ParsedQuery>, query: &'a str) -> std::borrow::Cow<'a, str> {
    match analysis {
        Some(parsed) if !parsed.topics.is_empty() => {
            std::borrow::Cow::Owned(parsed.topics.join(" "))
        }
        _ => std::borrow::Cow::Borrowed(query),
    }
}

/// Deduplicated convenience wrapper used by chat: same retrieval, but each
/// note id appears at most once.
pub async fn retrieve_unique(
    orchestrator: &RetrievalOrchestrator,
    query: &str,
    owner_id: Uuid,
    limit: Option<usize>,
) -> RetrievalOutcome {
    let outcome = orchestrator.retrieve(query, owner_id, limit).await;
    RetrievalOutcome {
        notes: dedup::dedup_by_id(outcome.notes),
        analysis: outcome.analysis,
    }
}
