//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting or retrieving documents.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A source document could not be read or parsed.
    #[error("Failed to load '{path}': {message}")]
    LoaderError {
        /// Path of the document being loaded.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Arguments that violate an operation's contract.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An error in the ingestion or retrieval orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
