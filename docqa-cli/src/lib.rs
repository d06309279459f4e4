//! Entry points of the docqa binaries.
//!
//! - `docqa-ingest` loads the PDF named by `PDF_PATH` into the pgvector
//!   collection `PG_VECTOR_COLLECTION_NAME`.
//! - `docqa-chat` answers questions about it in an interactive session.
//!
//! Both read their settings from the environment (a `.env` file is loaded
//! first when present) and fail before doing any work if a key is missing.

pub mod cli;
pub mod commands;
pub mod console;
pub mod settings;

pub use console::{
    Answerer, ChatSession, LineReader, RagAnswerer, ReadLine, RustylineReader, ScriptedReader,
};
pub use settings::{ChatSettings, ConfigurationError, IngestSettings, StoreSettings};
