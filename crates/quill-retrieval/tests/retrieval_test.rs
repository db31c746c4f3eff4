//! End-to-end retrieval pipeline tests over an in-memory store and a
//! deterministic mock provider.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use helpers::{note_at, unit_at, MemoryNoteStore};
use quill_core::{
    CreateNoteRequest, ExecutionStrategy, ParsedQuery, ParsedTimeRange, RetrievalConfig,
    TimeRangeKind,
};
use quill_inference::MockIntelligence;
use quill_retrieval::{NoteService, RetrievalOrchestrator};

fn orchestrator(
    store: Arc<MemoryNoteStore>,
    provider: MockIntelligence,
    config: RetrievalConfig,
) -> RetrievalOrchestrator {
    RetrievalOrchestrator::new(store, Arc::new(provider), config)
}

#[tokio::test]
async fn test_embedding_mode_applies_time_filter_and_threshold() {
    let owner = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());

    // Candidates at controlled similarity levels against query vector [1, 0].
    store.seed(note_at(owner, "strong match", "body", 2, Some(unit_at(0.9))));
    store.seed(note_at(owner, "weak match", "body", 2, Some(unit_at(0.3))));
    store.seed(note_at(owner, "old strong match", "body", 30, Some(unit_at(0.99))));
    store.seed(note_at(owner, "unembedded", "body", 2, None));

    let last_week = ParsedTimeRange::new(
        TimeRangeKind::Absolute,
        Utc::now() - Duration::days(7),
        Utc::now(),
    );
    let provider = MockIntelligence::enabled()
        .with_parsed_query(ParsedQuery {
            topics: vec!["budget".to_string()],
            time_range: Some(last_week),
            action: None,
            content_type: None,
        })
        .with_embedding("budget", vec![1.0, 0.0]);

    let orch = orchestrator(store, provider, RetrievalConfig::ai_enabled());
    let outcome = orch
        .retrieve("notes from last week about the budget", owner, None)
        .await;

    assert_eq!(outcome.notes.len(), 1);
    assert_eq!(outcome.notes[0].title, "strong match");
    assert!(outcome.analysis.is_some());
}

#[tokio::test]
async fn test_disabled_ai_never_touches_the_provider() {
    let owner = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());
    store.seed(note_at(owner, "budget thoughts", "quarterly numbers", 1, None));
    store.seed(note_at(owner, "grocery list", "milk", 1, None));
    store.seed(note_at(owner, "budget archive", "old numbers", 10, None));

    let provider = MockIntelligence::disabled();
    let counter = provider.clone();

    let orch = orchestrator(store, provider, RetrievalConfig::ai_disabled());
    let outcome = orch.retrieve("budget notes from yesterday", owner, None).await;

    // Keyword match on "budget", time-filtered to yesterday.
    assert_eq!(outcome.notes.len(), 1);
    assert_eq!(outcome.notes[0].title, "budget thoughts");
    assert!(outcome.analysis.is_none());
    assert_eq!(counter.total_call_count(), 0);
}

#[tokio::test]
async fn test_embedding_failure_falls_back_to_keyword_results() {
    let owner = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());
    store.seed(note_at(owner, "budget review", "numbers", 1, Some(unit_at(0.9))));
    store.seed(note_at(owner, "unrelated", "nothing", 1, Some(unit_at(0.9))));

    let provider = MockIntelligence::enabled()
        .with_failing_embeddings()
        .with_parsed_query(ParsedQuery {
            topics: vec!["budget".to_string()],
            time_range: None,
            action: None,
            content_type: None,
        });

    let orch = orchestrator(store, provider, RetrievalConfig::ai_enabled());
    let outcome = orch.retrieve("budget", owner, None).await;

    // Same result keyword-only retrieval would produce.
    assert_eq!(outcome.notes.len(), 1);
    assert_eq!(outcome.notes[0].title, "budget review");
}

#[tokio::test]
async fn test_parse_failure_embeds_the_raw_query() {
    let owner = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());
    store.seed(note_at(owner, "match", "body", 1, Some(unit_at(0.9))));

    let provider = MockIntelligence::enabled()
        .with_failing_parse()
        .with_embedding("budget report", vec![1.0, 0.0]);

    let orch = orchestrator(store, provider, RetrievalConfig::ai_enabled());
    let outcome = orch.retrieve("budget report", owner, None).await;

    assert_eq!(outcome.notes.len(), 1);
    assert!(outcome.analysis.is_none());
}

#[tokio::test]
async fn test_server_side_strategy_matches_local_results() {
    let owner = Uuid::new_v4();

    let seed = |store: &MemoryNoteStore| {
        store.seed(note_at(owner, "a", "body", 1, Some(unit_at(0.95))));
        store.seed(note_at(owner, "b", "body", 2, Some(unit_at(0.7))));
        store.seed(note_at(owner, "c", "body", 3, Some(unit_at(0.2))));
    };

    let provider = MockIntelligence::enabled().with_embedding("q", vec![1.0, 0.0]);

    let local_store = Arc::new(MemoryNoteStore::new());
    seed(&local_store);
    let local = orchestrator(
        local_store,
        provider.clone(),
        RetrievalConfig::ai_enabled().with_strategy(ExecutionStrategy::Local),
    );

    let remote_store = Arc::new(MemoryNoteStore::new());
    seed(&remote_store);
    let remote = orchestrator(
        remote_store,
        provider,
        RetrievalConfig::ai_enabled().with_strategy(ExecutionStrategy::ServerSide),
    );

    let local_titles: Vec<String> = local
        .find_similar_notes("q", owner, None)
        .await
        .into_iter()
        .map(|n| n.title)
        .collect();
    let remote_titles: Vec<String> = remote
        .find_similar_notes("q", owner, None)
        .await
        .into_iter()
        .map(|n| n.title)
        .collect();

    assert_eq!(local_titles, vec!["a", "b"]);
    assert_eq!(local_titles, remote_titles);
}

#[tokio::test]
async fn test_store_failure_collapses_to_empty_outcome() {
    let owner = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());
    store.seed(note_at(owner, "budget", "body", 1, None));
    store.fail_all();

    let orch = orchestrator(
        store,
        MockIntelligence::disabled(),
        RetrievalConfig::ai_disabled(),
    );
    let outcome = orch.retrieve("budget", owner, None).await;

    assert!(outcome.notes.is_empty());
    assert!(outcome.analysis.is_none());
}

#[tokio::test]
async fn test_retrieval_respects_the_default_limit() {
    let owner = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());
    for i in 0..7 {
        store.seed(note_at(owner, &format!("budget {}", i), "body", 1, None));
    }

    let orch = orchestrator(
        store,
        MockIntelligence::disabled(),
        RetrievalConfig::ai_disabled().with_default_limit(5),
    );
    let outcome = orch.retrieve("budget", owner, None).await;
    assert_eq!(outcome.notes.len(), 5);

    let explicit = orch.retrieve("budget", owner, Some(2)).await;
    assert_eq!(explicit.notes.len(), 2);
}

#[tokio::test]
async fn test_retrieval_is_owner_scoped() {
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());
    store.seed(note_at(owner, "budget mine", "body", 1, None));
    store.seed(note_at(other, "budget theirs", "body", 1, None));

    let orch = orchestrator(
        store,
        MockIntelligence::disabled(),
        RetrievalConfig::ai_disabled(),
    );
    let outcome = orch.retrieve("budget", owner, None).await;

    assert_eq!(outcome.notes.len(), 1);
    assert_eq!(outcome.notes[0].title, "budget mine");
}

#[tokio::test]
async fn test_note_service_embeds_on_create_and_update() {
    let owner = Uuid::new_v4();
    let store = Arc::new(MemoryNoteStore::new());
    let provider = MockIntelligence::enabled()
        .with_embedding("Budget\n\nfirst draft", vec![1.0, 0.0])
        .with_embedding("Budget\n\nfinal numbers", vec![0.0, 1.0]);

    let service = NoteService::new(store.clone(), Arc::new(provider));

    let note = service
        .create_note(CreateNoteRequest {
            owner_id: owner,
            title: "Budget".to_string(),
            content: "first draft".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(note.embedding.as_ref().unwrap().as_slice(), &[1.0, 0.0]);

    let updated = service
        .update_note(note.id, "Budget", "final numbers")
        .await
        .unwrap();
    assert_eq!(updated.embedding.as_ref().unwrap().as_slice(), &[0.0, 1.0]);

    // The refreshed embedding is persisted, not just returned.
    let stored = service.get_note(note.id).await.unwrap();
    assert_eq!(stored.embedding.as_ref().unwrap().as_slice(), &[0.0, 1.0]);
    assert_eq!(stored.content, "final numbers");
}

#[tokio::test]
async fn test_note_service_saves_without_embedding_when_ai_disabled() {
    let store = Arc::new(MemoryNoteStore::new());
    let service = NoteService::new(store.clone(), Arc::new(MockIntelligence::disabled()));

    let note = service
        .create_note(CreateNoteRequest {
            owner_id: Uuid::new_v4(),
            title: "Plain".to_string(),
            content: "no AI here".to_string(),
        })
        .await
        .unwrap();

    assert!(note.embedding.is_none());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_note_service_survives_embedding_failure() {
    let store = Arc::new(MemoryNoteStore::new());
    let service = NoteService::new(
        store.clone(),
        Arc::new(MockIntelligence::enabled().with_failing_embeddings()),
    );

    let note = service
        .create_note(CreateNoteRequest {
            owner_id: Uuid::new_v4(),
            title: "Flaky".to_string(),
            content: "provider is down".to_string(),
        })
        .await
        .unwrap();

    assert!(note.embedding.is_none());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_note_service_delete_removes_the_note() {
    let store = Arc::new(MemoryNoteStore::new());
    let service = NoteService::new(store.clone(), Arc::new(MockIntelligence::disabled()));

    let note = service
        .create_note(CreateNoteRequest {
            owner_id: Uuid::new_v4(),
            title: "Ephemeral".to_string(),
            content: "gone soon".to_string(),
        })
        .await
        .unwrap();

    service.delete_note(note.id).await.unwrap();
    assert!(service.get_note(note.id).await.is_err());
    assert_eq!(store.len(), 0);
}
