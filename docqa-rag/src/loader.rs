//! Loading source files into page-level [`Document`]s.

#[cfg(feature = "pdf")]
use std::path::{Path, PathBuf};

#[cfg(feature = "pdf")]
use tracing::debug;

use crate::document::Document;
#[cfg(feature = "pdf")]
use crate::error::RagError;
use crate::error::Result;

/// A source of page-level documents.
pub trait DocumentLoader: Send + Sync {
    /// Load every page, in order.
    fn load(&self) -> Result<Vec<Document>>;
}

/// A loader over documents that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    documents: Vec<Document>,
}

impl StaticLoader {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

impl DocumentLoader for StaticLoader {
    fn load(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}

/// Turn per-page texts into [`Document`]s with page metadata (`source`,
/// 0-based `page`, 1-based `page_label`, `total_pages`).
pub fn page_documents<S: Into<String>>(source: &str, pages: impl IntoIterator<Item = S>) -> Vec<Document> {
    let pages: Vec<String> = pages.into_iter().map(Into::into).collect();
    let total_pages = pages.len();

    pages
        .into_iter()
        .enumerate()
        .map(|(page, text)| {
            Document::new(text)
                .with_metadata("source", source)
                .with_metadata("page", page)
                .with_metadata("page_label", (page + 1).to_string())
                .with_metadata("total_pages", total_pages)
        })
        .collect()
}

/// Split already extracted text into pages at form-feed characters, as
/// written by `pdftotext` and similar tools, then [`page_documents`].
///
/// Text without form feeds is a single page.
pub fn pages_from_text(source: &str, text: &str) -> Vec<Document> {
    let pages: Vec<&str> = text.split('\x0C').collect();
    // A trailing form feed after the last page does not start a new one.
    let pages = match pages.split_last() {
        Some((last, rest)) if !rest.is_empty() && last.trim().is_empty() => rest.to_vec(),
        _ => pages,
    };
    page_documents(source, pages)
}

/// Loads a PDF file with [`pdf_extract`], one [`Document`] per page.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone)]
pub struct PdfLoader {
    path: PathBuf,
}

#[cfg(feature = "pdf")]
impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn map_err(&self, message: impl std::fmt::Display) -> RagError {
        RagError::LoaderError { path: self.path.display().to_string(), message: message.to_string() }
    }
}

#[cfg(feature = "pdf")]
impl DocumentLoader for PdfLoader {
    fn load(&self) -> Result<Vec<Document>> {
        let bytes = std::fs::read(&self.path).map_err(|e| self.map_err(e))?;
        let texts = pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| self.map_err(format!("PDF extraction failed: {e}")))?;

        let source = self.path.display().to_string();
        let pages = page_documents(&source, texts);
        debug!(path = %source, bytes = bytes.len(), pages = pages.len(), "extracted PDF text");
        Ok(pages)
    }
}
