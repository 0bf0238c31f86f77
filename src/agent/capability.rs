use crate::error::UpstreamError;
use futures::stream::BoxStream;

/// Ordered text fragments of one agent answer
///
/// The stream ends after the last fragment on success. A failure is yielded
/// as a single `Err` item and nothing follows it.
pub type FragmentStream = BoxStream<'static, Result<String, UpstreamError>>;

/// Something that answers a prompt with a stream of text fragments
///
/// Implementations:
/// - `Supervisor`: manager agent routing to sub-agents over an LLM gateway
/// - Scripted agents in tests
pub trait AgentCapability: Send + Sync {
    /// Start answering `prompt`
    ///
    /// `step_limit` bounds the number of model generations the answer may use.
    /// Dropping the returned stream stops the work.
    fn invoke(&self, prompt: String, step_limit: usize) -> FragmentStream;

    /// Capability name for logging
    fn name(&self) -> &str;
}
