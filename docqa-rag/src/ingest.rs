//! Rate-limited ingestion: load, split, clean, identify and store chunks.

use tracing::info;

use crate::chunking::TextSplitter;
use crate::config::IngestOptions;
use crate::document::{Document, chunk_ids, enrich};
use crate::error::{RagError, Result};
use crate::loader::DocumentLoader;
use crate::pipeline::RagPipeline;
use crate::ratelimit::RateLimiter;

/// Counts from a completed [`ingest`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Pages produced by the loader.
    pub pages: usize,
    /// Chunks stored.
    pub chunks: usize,
    /// Store calls made.
    pub batches: usize,
}

/// Number of store calls [`store_rate_limited`] makes for `count` documents.
pub fn batch_count(count: usize, batch_size: usize) -> usize {
    if count < batch_size { 1 } else { count.div_ceil(batch_size) }
}

/// Store `documents` under `ids` in consecutive slices of
/// `options.batch_size`, awaiting `limiter` before each store call.
///
/// Fewer documents than one batch are stored with a single call. The first
/// failing batch aborts the run with its error; batches stored before it
/// stay stored. Returns the number of store calls made.
///
/// # Errors
///
/// - [`RagError::InvalidInput`] if `ids` and `documents` differ in length
/// - [`RagError::ConfigError`] if the batch size is zero
/// - the first embedding or store error, unchanged
pub async fn store_rate_limited(
    pipeline: &RagPipeline,
    documents: &[Document],
    ids: &[String],
    options: &IngestOptions,
    limiter: &dyn RateLimiter,
) -> Result<usize> {
    options.validate()?;
    if documents.len() != ids.len() {
        return Err(RagError::InvalidInput(format!(
            "{} documents but {} ids",
            documents.len(),
            ids.len()
        )));
    }

    let batch_size = options.batch_size;
    if documents.len() < batch_size {
        info!("Storing all {} documents...", documents.len());
        limiter.acquire(1).await;
        pipeline.add_documents(documents, ids).await?;
        return Ok(1);
    }

    let total_parts = batch_count(documents.len(), batch_size);
    for (index, (batch, ids_batch)) in
        documents.chunks(batch_size).zip(ids.chunks(batch_size)).enumerate()
    {
        let part = index + 1;
        limiter.acquire(1).await;
        info!(part, total_parts, "Storing part {part} of {total_parts}");
        pipeline.add_documents(batch, ids_batch).await?;
        info!(part, "Done.");
        if part < total_parts {
            info!("Sleeping for {} seconds...", options.delay.as_secs());
        }
    }
    Ok(total_parts)
}

/// Run a whole ingestion: load pages, split them into chunks, clean chunk
/// metadata, assign `doc-<i>` ids, create the collection and store
/// everything through [`store_rate_limited`].
///
/// Loader errors abort before anything is stored.
pub async fn ingest(
    loader: &dyn DocumentLoader,
    splitter: &dyn TextSplitter,
    pipeline: &RagPipeline,
    options: &IngestOptions,
    limiter: &dyn RateLimiter,
) -> Result<IngestReport> {
    let pages = loader.load()?;
    info!("Loaded {} documents...", pages.len());

    info!("Splitting {} documents into chunks...", pages.len());
    let chunks = splitter.split_documents(&pages);

    info!("Enriching {} chunks...", chunks.len());
    let enriched = enrich(&chunks);

    info!("Creating {} ids...", enriched.len());
    let ids = chunk_ids(enriched.len());

    info!(collection = pipeline.collection(), "Creating store...");
    pipeline.create_collection().await?;

    info!("Storing {} documents...", enriched.len());
    let batches = store_rate_limited(pipeline, &enriched, &ids, options, limiter).await?;
    info!("Done!");

    Ok(IngestReport { pages: pages.len(), chunks: enriched.len(), batches })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_count_rounds_up() {
        assert_eq!(batch_count(0, 100), 1);
        assert_eq!(batch_count(99, 100), 1);
        assert_eq!(batch_count(100, 100), 1);
        assert_eq!(batch_count(101, 100), 2);
        assert_eq!(batch_count(250, 100), 3);
    }
}
