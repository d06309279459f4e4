//! Tunables for splitting, retrieval and rate-limited ingestion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default maximum chunk length, in characters.
pub const CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks of the same page, in characters.
pub const CHUNK_OVERLAP: usize = 100;
/// Default number of chunks retrieved per question.
pub const TOP_K: usize = 10;
/// Default number of chunks per store call during ingestion.
pub const EMBEDDINGS_BATCH_SIZE: usize = 100;
/// Default pause between two store calls during ingestion.
pub const EMBEDDINGS_DELAY: Duration = Duration::from_secs(60);

/// Splitting and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of results requested from the vector store.
    pub top_k: usize,
    /// When set, results scoring below it are dropped. Unset by default so
    /// the store's results reach the prompt untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            chunk_overlap: CHUNK_OVERLAP,
            top_k: TOP_K,
            similarity_threshold: None,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = Some(threshold);
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

/// Batching parameters for [`store_rate_limited`](crate::ingest::store_rate_limited).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Maximum number of chunks per store call.
    pub batch_size: usize,
    /// Pause between consecutive store calls.
    pub delay: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { batch_size: EMBEDDINGS_BATCH_SIZE, delay: EMBEDDINGS_DELAY }
    }
}

impl IngestOptions {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self { batch_size, delay }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(RagError::ConfigError("batch_size must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ingestion_constants() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.similarity_threshold, None);

        let options = IngestOptions::default();
        assert_eq!(options.batch_size, 100);
        assert_eq!(options.delay, Duration::from_secs(60));
    }

    #[test]
    fn builder_rejects_overlap_not_below_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(msg) if msg.contains("chunk_overlap")));
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
    }

    #[test]
    fn zero_batch_size_is_invalid() {
        assert!(IngestOptions::new(0, Duration::ZERO).validate().is_err());
        assert!(IngestOptions::new(1, Duration::ZERO).validate().is_ok());
    }
}
