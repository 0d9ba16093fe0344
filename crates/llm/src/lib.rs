pub mod provider;
pub mod providers;
pub mod retry;

pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
pub use retry::{call_with_backoff, RetryConfig};
