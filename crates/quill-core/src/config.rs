//! Configuration for the retrieval pipeline and the AI provider.
//!
//! The AI capability flag is resolved once, when [`AiConfig`] is read from
//! the environment, and then injected into everything that needs it. No
//! component consults a process-global; tests construct both enabled and
//! disabled configurations side by side.

use serde::{Deserialize, Serialize};

/// Default number of notes returned from one retrieval call.
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Default minimum similarity for a candidate to count as a match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-ada-002";

/// Default chat completion model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Timeout for embedding requests (seconds).
pub const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for chat completion requests (seconds).
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;

/// Where similarity ranking executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Rank fetched candidates in-process.
    #[default]
    Local,
    /// Delegate to the store's server-side vector search procedure.
    ServerSide,
}

/// Configuration injected into the retrieval orchestrator at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Whether AI-backed retrieval (query parsing + embeddings) is enabled.
    pub ai_enabled: bool,
    /// Minimum similarity for embedding-mode matches.
    pub similarity_threshold: f32,
    /// Result limit used when the caller does not pass one.
    pub default_limit: usize,
    /// Local or server-side similarity ranking.
    pub strategy: ExecutionStrategy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            ai_enabled: false,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            default_limit: DEFAULT_RETRIEVAL_LIMIT,
            strategy: ExecutionStrategy::default(),
        }
    }
}

impl RetrievalConfig {
    /// Config for the AI-enabled path.
    pub fn ai_enabled() -> Self {
        Self {
            ai_enabled: true,
            ..Default::default()
        }
    }

    /// Config for the deterministic keyword-only path.
    pub fn ai_disabled() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// AI provider configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API credential. `None` means AI features are disabled for the whole
    /// process lifetime — a steady state, not an error.
    pub api_key: Option<String>,
    /// OpenAI-compatible API base URL.
    pub base_url: String,
    /// Embedding model name.
    pub embed_model: String,
    /// Chat completion model name.
    pub chat_model: String,
    /// Per-request timeout for embedding calls.
    pub embed_timeout_secs: u64,
    /// Per-request timeout for completion calls.
    pub chat_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embed_timeout_secs: DEFAULT_EMBED_TIMEOUT_SECS,
            chat_timeout_secs: DEFAULT_CHAT_TIMEOUT_SECS,
        }
    }
}

impl AiConfig {
    /// Read configuration from environment variables.
    ///
    /// `OPENAI_API_KEY` decides the capability flag; the rest have defaults.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let base_url = std::env::var("QUILL_OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        let embed_model = std::env::var("QUILL_EMBED_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        let chat_model =
            std::env::var("QUILL_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());
        let embed_timeout_secs = std::env::var("QUILL_EMBED_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EMBED_TIMEOUT_SECS);
        let chat_timeout_secs = std::env::var("QUILL_CHAT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS);

        Self {
            api_key,
            base_url,
            embed_model,
            chat_model,
            embed_timeout_secs,
            chat_timeout_secs,
        }
    }

    /// Config with a credential, for tests and embedded use.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Default::default()
        }
    }

    /// Whether AI features are enabled.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
