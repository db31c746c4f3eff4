//! Deterministic mock provider for testing.
//!
//! Implements [`IntelligenceProvider`] without any I/O: embeddings are a
//! pure function of the input text, completions are scripted, and every
//! call is logged so tests can assert call counts (e.g. "AI disabled never
//! touches the provider").

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quill_core::{Degradation, Gated, IntelligenceProvider, ParsedQuery, Vector};

/// Deterministic embedding generator: same text, same vector.
///
/// Vectors are unit-length, and different texts land on visibly different
/// directions, so similarity math behaves sensibly in tests.
pub struct MockEmbeddingGenerator;

impl MockEmbeddingGenerator {
    pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
        let mut seed: u64 = 1469598103934665603; // FNV offset basis
        for byte in text.bytes() {
            seed ^= byte as u64;
            seed = seed.wrapping_mul(1099511628211);
        }

        let mut values = Vec::with_capacity(dimension);
        let mut state = seed;
        for _ in 0..dimension {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            // Map the top 32 bits to [-1, 1).
            values.push(((state >> 32) as f32 / (1u64 << 31) as f32) - 1.0);
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }
        values
    }
}

#[derive(Debug, Clone)]
struct MockState {
    embed_calls: usize,
    parse_calls: usize,
    complete_calls: usize,
}

/// Configurable mock [`IntelligenceProvider`].
#[derive(Clone)]
pub struct MockIntelligence {
    enabled: bool,
    dimension: usize,
    fixed_embeddings: HashMap<String, Vec<f32>>,
    fail_embedding: bool,
    parsed_query: Option<ParsedQuery>,
    fail_parse: bool,
    completion: String,
    fail_complete: bool,
    state: Arc<Mutex<MockState>>,
}

impl MockIntelligence {
    /// An enabled provider with deterministic embeddings.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            dimension: 8,
            fixed_embeddings: HashMap::new(),
            fail_embedding: false,
            parsed_query: None,
            fail_parse: false,
            completion: "Mock response".to_string(),
            fail_complete: false,
            state: Arc::new(Mutex::new(MockState {
                embed_calls: 0,
                parse_calls: 0,
                complete_calls: 0,
            })),
        }
    }

    /// A disabled provider: every gated call reports `ConfigAbsent`.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::enabled()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Pin the embedding returned for a specific input text.
    pub fn with_embedding(mut self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.fixed_embeddings.insert(text.into(), embedding);
        self
    }

    /// Make every embedding call fail with a provider degradation.
    pub fn with_failing_embeddings(mut self) -> Self {
        self.fail_embedding = true;
        self
    }

    /// Script the parsed query returned by `parse_query`.
    pub fn with_parsed_query(mut self, parsed: ParsedQuery) -> Self {
        self.parsed_query = Some(parsed);
        self
    }

    /// Make every parse call fail with a parse degradation.
    pub fn with_failing_parse(mut self) -> Self {
        self.fail_parse = true;
        self
    }

    /// Script the completion text.
    pub fn with_completion(mut self, text: impl Into<String>) -> Self {
        self.completion = text.into();
        self
    }

    /// Make every completion call fail with a provider degradation.
    pub fn with_failing_completion(mut self) -> Self {
        self.fail_complete = true;
        self
    }

    pub fn embed_call_count(&self) -> usize {
        self.state.lock().unwrap().embed_calls
    }

    pub fn parse_call_count(&self) -> usize {
        self.state.lock().unwrap().parse_calls
    }

    pub fn complete_call_count(&self) -> usize {
        self.state.lock().unwrap().complete_calls
    }

    /// Total provider interactions of any kind.
    pub fn total_call_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.embed_calls + state.parse_calls + state.complete_calls
    }
}

#[async_trait]
impl IntelligenceProvider for MockIntelligence {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn generate_embedding(&self, text: &str) -> Gated<Vector> {
        self.state.lock().unwrap().embed_calls += 1;
        if !self.enabled {
            return Err(Degradation::ConfigAbsent);
        }
        if self.fail_embedding {
            return Err(Degradation::Provider("simulated embedding failure".to_string()));
        }
        let values = self
            .fixed_embeddings
            .get(text)
            .cloned()
            .unwrap_or_else(|| MockEmbeddingGenerator::generate(text, self.dimension));
        Ok(Vector::from(values))
    }

    async fn parse_query(&self, _query: &str) -> Gated<ParsedQuery> {
        self.state.lock().unwrap().parse_calls += 1;
        if !self.enabled {
            return Err(Degradation::ConfigAbsent);
        }
        if self.fail_parse {
            return Err(Degradation::Parse("simulated parse failure".to_string()));
        }
        self.parsed_query
            .clone()
            .ok_or_else(|| Degradation::Parse("no scripted parse".to_string()))
    }

    async fn complete(&self, _prompt: &str) -> Gated<String> {
        self.state.lock().unwrap().complete_calls += 1;
        if !self.enabled {
            return Err(Degradation::ConfigAbsent);
        }
        if self.fail_complete {
            return Err(Degradation::Provider("simulated completion failure".to_string()));
        }
        Ok(self.completion.clone())
    }
}
