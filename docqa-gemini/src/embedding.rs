//! Text embedding requests (`embedContent` / `batchEmbedContents`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::{Error, GeminiClient};
use crate::generation::Content;

/// The downstream use of an embedding, which lets the model optimize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Query text used to search a document collection.
    RetrievalQuery,
    /// Text of a document that will be searched.
    RetrievalDocument,
    SemanticSimilarity,
    Classification,
    Clustering,
    QuestionAnswering,
    FactVerification,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    pub model: String,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedContentsRequest {
    pub requests: Vec<EmbedContentRequest>,
}

/// A single embedding vector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEmbeddingResponse {
    pub embedding: ContentEmbedding,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchContentEmbeddingResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

/// Builder for embedding requests, created by [`Gemini::embed_content`](crate::Gemini::embed_content).
pub struct EmbedBuilder {
    client: Arc<GeminiClient>,
    chunks: Vec<String>,
    task_type: Option<TaskType>,
    title: Option<String>,
    output_dimensionality: Option<i32>,
}

impl EmbedBuilder {
    pub(crate) fn new(client: Arc<GeminiClient>) -> Self {
        Self { client, chunks: Vec::new(), task_type: None, title: None, output_dimensionality: None }
    }

    /// Set a single text to embed, replacing any previous input.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.chunks = vec![text.into()];
        self
    }

    /// Set several texts to embed with [`execute_batch`](Self::execute_batch).
    pub fn with_chunks(mut self, chunks: Vec<String>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Document title; only honored by the API for [`TaskType::RetrievalDocument`].
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Truncate output vectors to `dims` values.
    pub fn with_output_dimensionality(mut self, dims: i32) -> Self {
        self.output_dimensionality = Some(dims);
        self
    }

    fn request_for(&self, text: String) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.client.model.to_string(),
            content: Content::user_text(text),
            task_type: self.task_type.clone(),
            title: self.title.clone(),
            output_dimensionality: self.output_dimensionality,
        }
    }

    /// Embed the first configured text.
    #[instrument(skip_all, fields(text.count = self.chunks.len()))]
    pub async fn execute(mut self) -> Result<ContentEmbeddingResponse, Error> {
        let text = if self.chunks.is_empty() { String::new() } else { self.chunks.swap_remove(0) };
        let request = self.request_for(text);
        self.client.embed_content(request).await
    }

    /// Embed every configured text in one `batchEmbedContents` call.
    ///
    /// Embeddings are returned in input order. No request is made when there
    /// is nothing to embed.
    #[instrument(skip_all, fields(batch.size = self.chunks.len()))]
    pub async fn execute_batch(mut self) -> Result<BatchContentEmbeddingResponse, Error> {
        if self.chunks.is_empty() {
            return Ok(BatchContentEmbeddingResponse { embeddings: Vec::new() });
        }
        let chunks = std::mem::take(&mut self.chunks);
        let requests = chunks.into_iter().map(|text| self.request_for(text)).collect();
        self.client.embed_content_batch(BatchEmbedContentsRequest { requests }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_type_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_value(TaskType::RetrievalQuery).unwrap(), json!("RETRIEVAL_QUERY"));
        assert_eq!(
            serde_json::to_value(TaskType::RetrievalDocument).unwrap(),
            json!("RETRIEVAL_DOCUMENT")
        );
    }

    #[test]
    fn embed_request_omits_unset_fields() {
        let request = EmbedContentRequest {
            model: "models/text-embedding-004".into(),
            content: Content::user_text("hello"),
            task_type: Some(TaskType::RetrievalDocument),
            title: None,
            output_dimensionality: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "models/text-embedding-004",
                "content": {"role": "user", "parts": [{"text": "hello"}]},
                "taskType": "RETRIEVAL_DOCUMENT"
            })
        );
    }

    #[test]
    fn batch_response_parses_embeddings_in_order() {
        let body = json!({"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]});
        let parsed: BatchContentEmbeddingResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
        assert_eq!(parsed.embeddings[1].values, vec![0.3, 0.4]);
    }
}
