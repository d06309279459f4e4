//! Gemini embedding provider using the `docqa-gemini` crate.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use tracing::{debug, error};

use docqa_gemini::{EmbedBuilder, Gemini, Model, TaskType};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Chunks are embedded as [`TaskType::RetrievalDocument`] and questions as
/// [`TaskType::RetrievalQuery`], so both sides of a search come from the
/// matching half of the model.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::gemini::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::new(api_key, "models/text-embedding-004")?;
/// let embedding = provider.embed("Qual o faturamento da empresa?").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: Gemini,
    output_dimensionality: Option<i32>,
    dimensions: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a provider for `model` (with or without the `models/` prefix).
    pub fn new(api_key: impl AsRef<str>, model: impl AsRef<str>) -> Result<Self> {
        let model = Model::new(model);
        let dimensions = Self::known_dimensions(model.id());
        let client = Gemini::with_model(api_key, model).map_err(|e| RagError::EmbeddingError {
            provider: "Gemini".into(),
            message: format!("failed to create Gemini client: {e}"),
        })?;

        Ok(Self { client, output_dimensionality: None, dimensions })
    }

    /// Create a new provider from an existing [`Gemini`] client.
    ///
    /// Use this when you need full control over the client configuration
    /// (e.g. a custom base URL).
    pub fn from_client(client: Gemini) -> Self {
        let dimensions = Self::known_dimensions(client.model().id());
        Self { client, output_dimensionality: None, dimensions }
    }

    /// Set the output dimensionality (truncates the embedding vector).
    pub fn with_output_dimensionality(mut self, dims: i32) -> Self {
        self.output_dimensionality = Some(dims);
        self.dimensions = usize::try_from(dims).unwrap_or(0);
        self
    }

    /// Default vector size of the published embedding models; `0` for others.
    fn known_dimensions(model_id: &str) -> usize {
        match model_id {
            "text-embedding-004" | "embedding-001" => 768,
            "gemini-embedding-001" => 3072,
            _ => 0,
        }
    }

    fn embed_builder(&self, task_type: TaskType) -> EmbedBuilder {
        let builder = self.client.embed_content().with_task_type(task_type);
        match self.output_dimensionality {
            Some(dims) => builder.with_output_dimensionality(dims),
            None => builder,
        }
    }

    fn map_err(e: docqa_gemini::Error) -> RagError {
        RagError::EmbeddingError { provider: "Gemini".into(), message: e.to_string() }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding query");

        let response = self
            .embed_builder(TaskType::RetrievalQuery)
            .with_text(text)
            .execute()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "embedding request failed");
                Self::map_err(e)
            })?;

        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), "embedding documents");

        let response = self
            .embed_builder(TaskType::RetrievalDocument)
            .with_chunks(texts.iter().map(|t| t.to_string()).collect())
            .execute_batch()
            .await
            .map_err(|e| {
                error!(provider = "Gemini", error = %e, "batch embedding request failed");
                Self::map_err(e)
            })?;

        if response.embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: "Gemini".into(),
                message: format!(
                    "expected {} embeddings, received {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            });
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_the_model() {
        let provider = GeminiEmbeddingProvider::new("key", "models/text-embedding-004").unwrap();
        assert_eq!(provider.dimensions(), 768);

        let provider = GeminiEmbeddingProvider::new("key", "gemini-embedding-001").unwrap();
        assert_eq!(provider.dimensions(), 3072);

        let provider = GeminiEmbeddingProvider::new("key", "some-new-model").unwrap();
        assert_eq!(provider.dimensions(), 0);
    }

    #[test]
    fn output_dimensionality_overrides_the_default() {
        let provider = GeminiEmbeddingProvider::new("key", "gemini-embedding-001")
            .unwrap()
            .with_output_dimensionality(768);
        assert_eq!(provider.dimensions(), 768);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        let provider = GeminiEmbeddingProvider::new("key", "text-embedding-004").unwrap();
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }
}
