//! UI-facing session: register an API key once, then ask questions.
//!
//! The session holds the currently configured provider behind a lock, but
//! every query captures its own `Arc` at call start — replacing the provider
//! mid-flight never disturbs queries already running.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use parchment_core::config::{Config, LlmConfig, QueryConfig};
use parchment_llm::providers::openai::OpenAiProvider;
use parchment_llm::LlmProvider;

use crate::orchestrator::{AnswerPipeline, QueryError};
use crate::progress::ProgressSink;

pub struct Session {
    provider: RwLock<Option<Arc<dyn LlmProvider>>>,
    llm: LlmConfig,
    query: QueryConfig,
}

impl Session {
    /// Empty session: no provider until `configure` is called.
    pub fn new(config: &Config) -> Self {
        Self {
            provider: RwLock::new(None),
            llm: config.llm.clone(),
            query: config.query.clone(),
        }
    }

    /// Install or replace the LLM provider. Later calls supersede earlier
    /// ones; queries already in flight keep the provider they started with.
    pub fn configure(&self, provider: Arc<dyn LlmProvider>) {
        *self.provider.write().unwrap() = Some(provider);
        info!("LLM provider configured");
    }

    /// Convenience: install an OpenAI provider from an API key, using the
    /// configured model and base URL.
    pub fn configure_openai(&self, api_key: &str) {
        let base_url = self
            .llm
            .openai_base_url
            .as_deref()
            .unwrap_or("https://api.openai.com");
        self.configure(Arc::new(OpenAiProvider::new(
            api_key.to_string(),
            self.llm.openai_model.clone(),
            base_url.to_string(),
        )));
    }

    pub fn is_configured(&self) -> bool {
        self.provider.read().unwrap().is_some()
    }

    /// Answer a question about a document.
    ///
    /// Without a configured provider this is a warned no-op returning an
    /// empty answer: no LLM calls, no progress reports. The caller is
    /// expected to prompt for an API key.
    pub async fn answer_question(
        &self,
        document_text: &str,
        question: &str,
        progress: &dyn ProgressSink,
    ) -> Result<String, QueryError> {
        let provider = self.provider.read().unwrap().clone();
        let Some(provider) = provider else {
            warn!("no LLM provider configured; register an API key first");
            return Ok(String::new());
        };

        AnswerPipeline::new(provider, self.query.clone())
            .with_sampling(self.llm.temperature, self.llm.max_tokens)
            .answer(document_text, question, progress)
            .await
    }
}
