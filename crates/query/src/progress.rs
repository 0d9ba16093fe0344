/// Fire-and-forget progress notification, owned by the caller (a progress
/// bar, a log line, a test recorder).
pub trait ProgressSink: Send + Sync {
    /// Report the completed fraction, a value in [0, 1].
    fn report(&self, fraction: f32);
}

/// Sink that discards all reports.
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn report(&self, _fraction: f32) {}
}
