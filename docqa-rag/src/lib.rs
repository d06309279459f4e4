//! # docqa-rag
//!
//! Retrieval-augmented question answering over a PDF.
//!
//! ## Overview
//!
//! Two flows share this crate:
//!
//! - **Ingestion**: [`PdfLoader`] pages → [`RecursiveCharacterSplitter`]
//!   chunks → [`enrich`]ed metadata → `doc-<i>` ids → [`store_rate_limited`]
//!   batches paced by a [`RateLimiter`].
//! - **Retrieval**: [`Retriever`] embeds a question, fetches the most similar
//!   chunks and renders them into [`RAG_PROMPT`].
//!
//! Embedding and storage sit behind the [`EmbeddingProvider`] and
//! [`VectorStore`] traits. [`InMemoryVectorStore`] and
//! [`MockEmbeddingProvider`] run everything offline.
//!
//! ## Quick Start
//!
//! ```rust
//! use docqa_rag::{RecursiveCharacterSplitter, TextSplitter};
//!
//! let splitter = RecursiveCharacterSplitter::new(10, 5);
//! assert_eq!(splitter.split_text("aaaa bbbb cccc"), vec!["aaaa bbbb", "bbbb cccc"]);
//! ```
//!
//! ## Features
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `gemini` | [`gemini::GeminiEmbeddingProvider`] |
//! | `pgvector` | [`pgvector::PgVectorStore`] |
//! | `pdf` | [`PdfLoader`] |
//! | `full` | all of the above |

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod ingest;
pub mod inmemory;
pub mod loader;
pub mod mock;
#[cfg(feature = "pgvector")]
pub mod pgvector;
pub mod pipeline;
pub mod ratelimit;
pub mod search;
pub mod vectorstore;

pub use chunking::{RecursiveCharacterSplitter, TextSplitter};
pub use config::{IngestOptions, RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, Metadata, SearchResult, chunk_ids, clean_metadata, enrich};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
#[cfg(feature = "gemini")]
pub use gemini::GeminiEmbeddingProvider;
pub use ingest::{IngestReport, ingest, store_rate_limited};
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "pdf")]
pub use loader::PdfLoader;
pub use loader::{DocumentLoader, StaticLoader, page_documents, pages_from_text};
pub use mock::MockEmbeddingProvider;
#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorStore;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use ratelimit::{FixedDelay, RateLimiter, TokenBucket, Unlimited};
pub use search::{ContextFormat, PromptTemplate, RAG_PROMPT, REFUSAL, Retriever, SearchPrompt};
pub use vectorstore::VectorStore;
