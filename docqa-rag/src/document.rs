//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scalar metadata attached to a document or chunk (page number, source path, ...).
pub type Metadata = HashMap<String, Value>;

/// A unit of text with its metadata: a loaded page, or a window split from one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The text content.
    pub text: String,
    /// Key-value metadata describing where the text came from.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: Metadata::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A stored record: an identified [`Document`] together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk; the upsert key in the vector store.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Metadata inherited from the source page.
    pub metadata: Metadata,
    /// The vector embedding for this chunk's text. Empty on search results
    /// from backends that do not return vectors.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// Drop every metadata entry whose value is `""` or `null`.
///
/// All other keys and values are kept unchanged.
pub fn clean_metadata(metadata: &Metadata) -> Metadata {
    metadata
        .iter()
        .filter(|(_, value)| !is_empty_value(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Copy `documents`, cleaning each one's metadata with [`clean_metadata`].
pub fn enrich(documents: &[Document]) -> Vec<Document> {
    documents
        .iter()
        .map(|d| Document { text: d.text.clone(), metadata: clean_metadata(&d.metadata) })
        .collect()
}

/// Sequential chunk identifiers `doc-0`, `doc-1`, ... `doc-{count - 1}`.
pub fn chunk_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("doc-{i}")).collect()
}
