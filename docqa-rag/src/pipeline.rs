//! The store facade shared by ingestion and retrieval.
//!
//! A [`RagPipeline`] binds an [`EmbeddingProvider`] and a [`VectorStore`] to
//! one collection. Ingestion writes through
//! [`add_documents`](RagPipeline::add_documents); retrieval reads through
//! [`similarity_search_with_score`](RagPipeline::similarity_search_with_score).
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{InMemoryVectorStore, MockEmbeddingProvider, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(MockEmbeddingProvider::default()))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .collection("manual")
//!     .build()?;
//!
//! pipeline.create_collection().await?;
//! pipeline.add_documents(&documents, &chunk_ids(documents.len())).await?;
//! let results = pipeline.similarity_search_with_score("search query", 10).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::RagConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Embeds and stores documents in, and searches, a single collection.
///
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Create the collection with the dimensionality reported by the
    /// embedding provider. Idempotent.
    pub async fn create_collection(&self) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(&self.collection, dimensions).await.map_err(|e| {
            error!(collection = %self.collection, error = %e, "failed to create collection");
            e
        })
    }

    /// Embed `documents` in one batch and upsert them under `ids`.
    ///
    /// `ids[i]` identifies `documents[i]`; storing an id again replaces the
    /// earlier record.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidInput`] if the slices differ in length
    /// - embedding and store errors, unchanged
    pub async fn add_documents(&self, documents: &[Document], ids: &[String]) -> Result<()> {
        if documents.len() != ids.len() {
            return Err(RagError::InvalidInput(format!(
                "{} documents but {} ids",
                documents.len(),
                ids.len()
            )));
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(collection = %self.collection, error = %e, "embedding failed during ingestion");
            e
        })?;
        if embeddings.len() != documents.len() {
            return Err(RagError::PipelineError(format!(
                "embedding provider returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let chunks: Vec<Chunk> = documents
            .iter()
            .zip(ids)
            .zip(embeddings)
            .map(|((document, id), embedding)| Chunk {
                id: id.clone(),
                text: document.text.clone(),
                metadata: document.metadata.clone(),
                embedding,
            })
            .collect();

        self.vector_store.upsert(&self.collection, &chunks).await.map_err(|e| {
            error!(collection = %self.collection, error = %e, "upsert failed during ingestion");
            e
        })?;

        debug!(collection = %self.collection, count = chunks.len(), "stored chunks");
        Ok(())
    }

    /// The `k` stored chunks most similar to `query`, best first, with scores.
    ///
    /// Results scoring below the configured `similarity_threshold`, if any,
    /// are dropped; otherwise the store's answer is returned as is.
    pub async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let results =
            self.vector_store.search(&self.collection, &query_embedding, k).await.map_err(|e| {
                error!(collection = %self.collection, error = %e, "vector store search failed");
                e
            })?;

        let results = match self.config.similarity_threshold {
            Some(threshold) => results.into_iter().filter(|r| r.score >= threshold).collect(),
            None => results,
        };

        debug!(collection = %self.collection, result_count = results.len(), "query completed");
        Ok(results)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// The embedding provider, vector store and collection are required; the
/// config defaults to [`RagConfig::default()`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    collection: Option<String>,
}

impl RagPipelineBuilder {
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or
    /// the collection name is empty.
    pub fn build(self) -> Result<RagPipeline> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let collection = self
            .collection
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| RagError::ConfigError("collection is required".to_string()))?;

        Ok(RagPipeline {
            config: self.config.unwrap_or_default(),
            embedding_provider,
            vector_store,
            collection,
        })
    }
}
