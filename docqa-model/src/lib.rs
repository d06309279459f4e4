//! # docqa-model
//!
//! Chat model integrations for answering questions from a rendered prompt.
//!
//! ## Overview
//!
//! - [`ChatModel`] - prompt and temperature in, answer text out
//! - [`GeminiChatModel`] - Google's Gemini models over `docqa-gemini`
//! - [`MockChatModel`] - canned answers for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docqa_model::{ChatModel, GeminiChatModel};
//!
//! # async fn run() -> docqa_model::Result<()> {
//! let api_key = std::env::var("GOOGLE_API_KEY").unwrap_or_default();
//! let model = GeminiChatModel::new(&api_key, "gemini-2.5-flash")?;
//! let answer = model.invoke("Qual é a capital da França?", 0.5).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod mock;
pub mod model;

pub use error::{ModelError, Result};
#[cfg(feature = "gemini")]
pub use gemini::GeminiChatModel;
pub use mock::MockChatModel;
pub use model::ChatModel;
