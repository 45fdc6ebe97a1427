use anyhow::Result;
use async_trait::async_trait;

/// Single-prompt text completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
