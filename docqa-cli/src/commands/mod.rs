pub mod chat;
pub mod ingest;

use std::sync::Arc;

use docqa_rag::{GeminiEmbeddingProvider, PgVectorStore, RagConfig, RagPipeline};
use tracing::debug;

use crate::settings::StoreSettings;

/// Gemini embeddings over the configured pgvector collection.
pub async fn store_pipeline(settings: &StoreSettings, config: RagConfig) -> anyhow::Result<RagPipeline> {
    let mut embeddings = GeminiEmbeddingProvider::new(&settings.google_api_key, &settings.embedding_model)?;
    if let Some(dims) = settings.embedding_dimensions {
        embeddings = embeddings.with_output_dimensionality(dims);
    }
    let store = PgVectorStore::new(&settings.database_url).await?;
    debug!(
        model = %settings.embedding_model,
        collection = %settings.collection_name,
        "connected to vector store"
    );

    Ok(RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(embeddings))
        .vector_store(Arc::new(store))
        .collection(&settings.collection_name)
        .build()?)
}
