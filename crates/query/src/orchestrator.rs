//! Fan-out/fan-in chunk query orchestration.
//!
//! One question against one document becomes N chunk queries dispatched onto
//! a bounded worker pool. Results land in an indexed slot vector so the final
//! answer is assembled in chunk order no matter which worker finishes first,
//! and the progress sink hears `completed / total` after every completion.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info};

use parchment_core::config::QueryConfig;
use parchment_extract::chunker;
use parchment_llm::{call_with_backoff, LlmError, LlmProvider, RetryConfig};

use crate::progress::ProgressSink;

#[derive(Debug, Error)]
pub enum QueryError {
    /// A chunk query failed terminally; the whole batch is aborted and no
    /// partial answer is produced.
    #[error("chunk {index} failed: {source}")]
    ChunkFailed {
        index: usize,
        #[source]
        source: LlmError,
    },
    /// A worker vanished without delivering a result (task panic).
    #[error("lost {lost} of {total} chunk results")]
    WorkerLost { lost: usize, total: usize },
}

/// Answers a question about a document by fanning the question out across
/// byte-bounded chunks of the text.
///
/// The provider is injected at construction; re-configuring a session never
/// affects a pipeline that is already running.
pub struct AnswerPipeline {
    provider: Arc<dyn LlmProvider>,
    config: QueryConfig,
    temperature: f32,
    max_tokens: u32,
}

impl AnswerPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, config: QueryConfig) -> Self {
        Self {
            provider,
            config,
            temperature: 0.1,
            max_tokens: 4096,
        }
    }

    /// Override the sampling parameters passed to the provider.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Ask `question` of every chunk of `document_text` and join the chunk
    /// answers with single spaces, in chunk order.
    ///
    /// Progress is reported once per completed chunk as a fraction in [0, 1];
    /// the final report on success is exactly 1.0. The first chunk failure
    /// aborts the remaining workers and surfaces as [`QueryError::ChunkFailed`].
    pub async fn answer(
        &self,
        document_text: &str,
        question: &str,
        progress: &dyn ProgressSink,
    ) -> Result<String, QueryError> {
        let chunks = chunker::chunk(document_text, self.config.max_chunk_bytes);
        let total = chunks.len();
        if total == 0 {
            debug!("document produced no chunks, nothing to ask");
            return Ok(String::new());
        }

        info!(
            chunks = total,
            concurrency = self.config.max_concurrency,
            "dispatching chunk queries"
        );

        let retry = RetryConfig {
            max_retries: self.config.max_retries,
            initial_delay: Duration::from_secs(self.config.initial_backoff_secs),
            max_delay: Duration::from_secs(self.config.max_backoff_secs),
        };

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let (tx, mut rx) = mpsc::channel::<(usize, Result<String, LlmError>)>(total);

        let mut handles = Vec::with_capacity(total);
        for (index, chunk) in chunks.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let provider = self.provider.clone();
            let question = question.to_string();
            let retry = retry.clone();
            let tx = tx.clone();
            let (temperature, max_tokens) = (self.temperature, self.max_tokens);

            handles.push(tokio::spawn(async move {
                // Queue behind the pool; the semaphore is never closed, so a
                // failed acquire only happens on shutdown.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let result = call_with_backoff(
                    provider.as_ref(),
                    &chunk,
                    &question,
                    temperature,
                    max_tokens,
                    &retry,
                )
                .await;
                let _ = tx.send((index, result)).await;
            }));
        }
        drop(tx);

        // Fan-in: fill slot `index` as completions arrive, in any order.
        let mut slots: Vec<Option<String>> = vec![None; total];
        let mut completed = 0usize;
        while let Some((index, result)) = rx.recv().await {
            match result {
                Ok(answer) => {
                    slots[index] = Some(answer);
                    completed += 1;
                    progress.report(completed as f32 / total as f32);
                    debug!(completed, total, "chunk answered");
                }
                Err(e) => {
                    for handle in &handles {
                        handle.abort();
                    }
                    return Err(QueryError::ChunkFailed { index, source: e });
                }
            }
        }

        if completed != total {
            return Err(QueryError::WorkerLost {
                lost: total - completed,
                total,
            });
        }

        Ok(slots.into_iter().flatten().collect::<Vec<_>>().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parchment_llm::{Message, Role};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::{sleep, Instant};

    /// Records every reported fraction.
    #[derive(Default)]
    struct RecordingSink {
        reports: Mutex<Vec<f32>>,
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, fraction: f32) {
            self.reports.lock().unwrap().push(fraction);
        }
    }

    /// Echoes the chunk (system message) wrapped in brackets. Per-call delay
    /// is derived from the chunk's trailing digit so tests can force workers
    /// to complete in reverse submission order under paused time.
    struct EchoProvider {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        reverse_delays: bool,
        delay_secs: u64,
    }

    impl EchoProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                reverse_delays: false,
                delay_secs: 0,
            }
        }

        fn with_reverse_delays() -> Self {
            Self {
                reverse_delays: true,
                ..Self::new()
            }
        }

        fn with_delay(secs: u64) -> Self {
            Self {
                delay_secs: secs,
                ..Self::new()
            }
        }
    }

    fn chunk_digit(chunk: &str) -> u64 {
        chunk
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .unwrap_or(0) as u64
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let chunk = messages
                .iter()
                .find(|m| matches!(m.role, Role::System))
                .map(|m| m.content.clone())
                .unwrap_or_default();

            if self.reverse_delays {
                // Later chunks finish first.
                sleep(Duration::from_secs(10 - chunk_digit(&chunk))).await;
            } else if self.delay_secs > 0 {
                sleep(Duration::from_secs(self.delay_secs)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("[{chunk}]"))
        }
    }

    /// Fails terminally whenever the chunk contains the word "bad".
    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            let chunk = &messages[0].content;
            if chunk.contains("bad") {
                Err(LlmError::ApiError {
                    status: 500,
                    body: "boom".into(),
                })
            } else {
                Ok("ok".to_string())
            }
        }
    }

    fn small_chunk_config() -> QueryConfig {
        // 2-byte bound: every word in "w0 w1 ..." becomes its own chunk.
        QueryConfig {
            max_chunk_bytes: 2,
            max_concurrency: 5,
            max_retries: 3,
            initial_backoff_secs: 1,
            max_backoff_secs: 60,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn answers_join_in_chunk_order_despite_reverse_completion() {
        let provider = Arc::new(EchoProvider::with_reverse_delays());
        let pipeline = AnswerPipeline::new(provider, small_chunk_config());

        let answer = pipeline
            .answer("w0 w1 w2 w3 w4", "q", &RecordingSink::default())
            .await
            .unwrap();

        assert_eq!(answer, "[w0] [w1] [w2] [w3] [w4]");
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_monotone_and_ends_at_one() {
        let provider = Arc::new(EchoProvider::with_reverse_delays());
        let pipeline = AnswerPipeline::new(provider, small_chunk_config());
        let sink = RecordingSink::default();

        pipeline.answer("w0 w1 w2 w3", "q", &sink).await.unwrap();

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 4);
        for pair in reports.windows(2) {
            assert!(pair[0] <= pair[1], "progress went backwards: {reports:?}");
        }
        assert_eq!(*reports.last().unwrap(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn pool_size_bounds_concurrency_and_excess_work_queues() {
        let provider = Arc::new(EchoProvider::with_delay(1));
        let config = QueryConfig {
            max_concurrency: 3,
            ..small_chunk_config()
        };
        let pipeline = AnswerPipeline::new(provider.clone(), config);

        let doc = "w0 w1 w2 w3 w4 w5 w6 w7 w8 w9 w0 w1";
        let start = Instant::now();
        pipeline.answer(doc, "q", &RecordingSink::default()).await.unwrap();

        assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 3);
        // 12 one-second calls through 3 workers take 4 rounds.
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_document_returns_empty_answer_without_calls() {
        let provider = Arc::new(EchoProvider::new());
        let pipeline = AnswerPipeline::new(provider.clone(), small_chunk_config());
        let sink = RecordingSink::default();

        let answer = pipeline.answer("   ", "q", &sink).await.unwrap();

        assert_eq!(answer, "");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(sink.reports.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn first_chunk_failure_aborts_the_batch() {
        let pipeline = AnswerPipeline::new(Arc::new(FailingProvider), small_chunk_config());

        let result = pipeline
            .answer("ok ok bad ok", "q", &RecordingSink::default())
            .await;

        match result {
            Err(QueryError::ChunkFailed { index: 2, source }) => {
                assert!(matches!(source, LlmError::ApiError { status: 500, .. }));
            }
            other => panic!("expected ChunkFailed for chunk 2, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_through_the_pipeline() {
        struct AlwaysLimited;

        #[async_trait]
        impl LlmProvider for AlwaysLimited {
            async fn complete(
                &self,
                _messages: Vec<Message>,
                _temperature: f32,
                _max_tokens: u32,
            ) -> Result<String, LlmError> {
                Err(LlmError::RateLimited)
            }
        }

        let pipeline = AnswerPipeline::new(Arc::new(AlwaysLimited), small_chunk_config());
        let result = pipeline.answer("w0", "q", &RecordingSink::default()).await;

        assert!(matches!(
            result,
            Err(QueryError::ChunkFailed {
                index: 0,
                source: LlmError::RetriesExhausted { attempts: 3 },
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn single_chunk_document_reports_once() {
        let provider = Arc::new(EchoProvider::new());
        let config = QueryConfig {
            max_chunk_bytes: 10_000,
            ..small_chunk_config()
        };
        let pipeline = AnswerPipeline::new(provider, config);
        let sink = RecordingSink::default();

        let answer = pipeline
            .answer("all in one chunk", "q", &sink)
            .await
            .unwrap();

        assert_eq!(answer, "[all in one chunk]");
        assert_eq!(*sink.reports.lock().unwrap(), vec![1.0]);
    }
}
