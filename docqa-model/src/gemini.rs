//! Gemini chat model.

use async_trait::async_trait;
use docqa_gemini::Gemini;
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::model::ChatModel;

/// A [`ChatModel`] backed by the Gemini `generateContent` API.
pub struct GeminiChatModel {
    client: Gemini,
    model_name: String,
}

impl GeminiChatModel {
    pub fn new(api_key: impl AsRef<str>, model: impl AsRef<str>) -> Result<Self> {
        let model_name = model.as_ref().trim().to_string();
        let client = Gemini::with_model(api_key, model_name.as_str())
            .map_err(|e| ModelError::Client { model: model_name.clone(), message: e.to_string() })?;
        Ok(Self::from_client(client))
    }

    /// Wrap an already configured client, e.g. one with a custom base URL.
    pub fn from_client(client: Gemini) -> Self {
        let model_name = client.model().id().to_string();
        Self { client, model_name }
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn invoke(&self, prompt: &str, temperature: f32) -> Result<String> {
        debug!(model = %self.model_name, prompt_len = prompt.len(), temperature, "generating answer");

        let response = self
            .client
            .generate_content()
            .with_user_message(prompt)
            .with_temperature(temperature)
            .execute()
            .await
            .map_err(|e| {
                error!(model = %self.model_name, error = %e, "generation request failed");
                ModelError::Request { model: self.model_name.clone(), message: e.to_string() }
            })?;

        let text = response.text();
        if text.is_empty() {
            let reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.clone())
                .or_else(|| {
                    response
                        .candidates
                        .first()
                        .and_then(|c| c.finish_reason.as_ref())
                        .map(|reason| format!("{reason:?}"))
                });
            return Err(ModelError::EmptyResponse { model: self.model_name.clone(), reason });
        }

        if let Some(usage) = &response.usage_metadata {
            debug!(
                model = %self.model_name,
                prompt_tokens = usage.prompt_token_count,
                answer_tokens = usage.candidates_token_count,
                "answer generated"
            );
        }
        Ok(text)
    }
}
