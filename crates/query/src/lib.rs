pub mod orchestrator;
pub mod progress;
pub mod session;

pub use orchestrator::{AnswerPipeline, QueryError};
pub use progress::{NoopSink, ProgressSink};
pub use session::Session;
