use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub query: QueryConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            llm: LlmConfig::from_env(),
            ollama: OllamaConfig::from_env(),
            query: QueryConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  llm:    provider={}", self.llm.provider);
        tracing::info!("  ollama: url={}, model={}", self.ollama.url, self.ollama.model);
        tracing::info!(
            "  query:  chunk_bytes={}, concurrency={}, retries={}",
            self.query.max_chunk_bytes,
            self.query.max_concurrency,
            self.query.max_retries
        );
    }

    /// Return a redacted view safe for display (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "llm": {
                "provider": self.llm.provider,
                "configured": self.llm.is_configured(),
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "query": {
                "max_chunk_bytes": self.query.max_chunk_bytes,
                "max_concurrency": self.query.max_concurrency,
                "max_retries": self.query.max_retries,
            },
        })
    }
}

// ── LLM (OpenAI / Anthropic) ─────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            provider: env_or("LLM_PROVIDER", "openai"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_model: env_or("ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            temperature: env_or("LLM_TEMPERATURE", "0.1").parse().unwrap_or(0.1),
            max_tokens: env_u32("LLM_MAX_TOKENS", 4096),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env() -> Self {
        Self {
            url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model: env_or("OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Query pipeline ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Per-call chunk bound in UTF-8 bytes. The LLM accepts limited context
    /// per call, so this is deliberately smaller than a document-level chunk.
    pub max_chunk_bytes: usize,
    /// Concurrent in-flight chunk queries.
    pub max_concurrency: usize,
    /// Rate-limited attempts per chunk before giving up.
    pub max_retries: u32,
    /// First backoff delay in seconds; doubles per rate-limited attempt.
    pub initial_backoff_secs: u64,
    /// Ceiling on a single backoff delay.
    pub max_backoff_secs: u64,
}

impl QueryConfig {
    fn from_env() -> Self {
        Self {
            max_chunk_bytes: env_usize("PARCHMENT_CHUNK_BYTES", 500),
            max_concurrency: env_usize("PARCHMENT_CONCURRENCY", 5),
            max_retries: env_u32("PARCHMENT_MAX_RETRIES", 5),
            initial_backoff_secs: env_u64("PARCHMENT_BACKOFF_SECS", 1),
            max_backoff_secs: env_u64("PARCHMENT_BACKOFF_CAP_SECS", 60),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 500,
            max_concurrency: 5,
            max_retries: 5,
            initial_backoff_secs: 1,
            max_backoff_secs: 60,
        }
    }
}
