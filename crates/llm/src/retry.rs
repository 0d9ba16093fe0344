//! Exponential backoff around a rate-limited chunk query.
//!
//! One call = one chunk paired with the user's question. The chunk rides as
//! the system message, the question as the user message. Only
//! [`LlmError::RateLimited`] triggers a retry; every other failure surfaces
//! to the caller untouched.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::provider::{LlmError, LlmProvider, Message, Role};

/// Configuration for the backoff loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Rate-limited attempts before giving up.
    pub max_retries: u32,
    /// First backoff delay; doubles after every rate-limited attempt.
    pub initial_delay: Duration,
    /// Ceiling on a single delay, so the doubling can't stall for hours.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Query the provider for one chunk, backing off exponentially on rate
/// limits. Fails with [`LlmError::RetriesExhausted`] once `max_retries`
/// rate-limited attempts have all failed.
pub async fn call_with_backoff(
    provider: &dyn LlmProvider,
    chunk: &str,
    question: &str,
    temperature: f32,
    max_tokens: u32,
    config: &RetryConfig,
) -> Result<String, LlmError> {
    let messages = vec![
        Message {
            role: Role::System,
            content: chunk.to_string(),
        },
        Message {
            role: Role::User,
            content: question.to_string(),
        },
    ];

    let mut delay = config.initial_delay;
    for attempt in 0..config.max_retries {
        match provider
            .complete(messages.clone(), temperature, max_tokens)
            .await
        {
            Ok(answer) => {
                if attempt > 0 {
                    debug!(attempt, "chunk query succeeded after backoff");
                }
                return Ok(answer);
            }
            Err(LlmError::RateLimited) => {
                warn!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    remaining = config.max_retries - attempt - 1,
                    "rate limited, backing off"
                );
                sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
            Err(e) => return Err(e),
        }
    }

    Err(LlmError::RetriesExhausted {
        attempts: config.max_retries,
    })
}
