//! # docqa-gemini
//!
//! A small client for the parts of the Google Gemini REST API that a
//! retrieval-augmented question answering tool needs:
//!
//! - `models/*:embedContent` and `models/*:batchEmbedContents` for text embeddings
//! - `models/*:generateContent` for answer generation
//!
//! ```rust,no_run
//! use docqa_gemini::{Gemini, TaskType};
//!
//! # async fn run() -> Result<(), docqa_gemini::Error> {
//! let embedder = Gemini::with_model("YOUR_API_KEY", "text-embedding-004")?;
//! let embedding = embedder
//!     .embed_content()
//!     .with_task_type(TaskType::RetrievalQuery)
//!     .with_text("What is the capital of France?")
//!     .execute()
//!     .await?;
//! println!("{} dimensions", embedding.embedding.values.len());
//!
//! let chat = Gemini::with_model("YOUR_API_KEY", "gemini-2.5-flash")?;
//! let response =
//!     chat.generate_content().with_user_message("Hello").with_temperature(0.5).execute().await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod embedding;
pub mod generation;


pub use client::{Error, Gemini, GeminiBuilder, Model};
pub use embedding::{
    BatchContentEmbeddingResponse, ContentEmbedding, ContentEmbeddingResponse, EmbedBuilder,
    TaskType,
};
pub use generation::{
    Candidate, Content, ContentBuilder, FinishReason, GenerationConfig, GenerationResponse, Part,
    PromptFeedback, Role, UsageMetadata,
};
