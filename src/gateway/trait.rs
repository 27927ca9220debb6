use crate::gateway::GatewayError;

/// Sampling parameters for one completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionParams {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Trait for text-completion services the pipelines can enrich results with
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Probe the service and refresh the cached online flag
    async fn check_status(&self) -> bool;

    /// Cached result of the last status check, without any I/O
    fn is_online(&self) -> bool;

    /// Send a single prompt and return the raw text of the first choice.
    /// Fails fast with [`GatewayError::Offline`] when the cached flag is false.
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String, GatewayError>;
}
