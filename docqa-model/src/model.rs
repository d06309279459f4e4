use async_trait::async_trait;

use crate::error::Result;

/// A hosted or local chat model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, e.g. `gemini-2.5-flash`.
    fn name(&self) -> &str;

    /// Send `prompt` as a single user turn sampled at `temperature` and
    /// return the answer text.
    async fn invoke(&self, prompt: &str, temperature: f32) -> Result<String>;
}
