//! Splitting loaded pages into overlapping, size-bounded text windows.
//!
//! [`RecursiveCharacterSplitter`] tries progressively finer separators
//! (paragraphs, lines, words, characters) until every piece fits, then greedily
//! merges adjacent pieces back into windows of at most `chunk_size` characters,
//! carrying up to `chunk_overlap` characters from the end of one window into the
//! start of the next.

use std::collections::VecDeque;

use crate::config::RagConfig;
use crate::document::Document;

/// Separators tried in order; `""` splits into single characters.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A strategy for splitting text into chunks.
pub trait TextSplitter: Send + Sync {
    /// Split a single text into windows.
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split every document, copying the source metadata onto each window.
    ///
    /// Output order is document order, then window order within a document.
    fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|document| {
                self.split_text(&document.text)
                    .into_iter()
                    .map(|text| Document { text, metadata: document.metadata.clone() })
            })
            .collect()
    }
}

/// Hierarchical character splitter with overlap.
///
/// Lengths are counted in `char`s, so windows never cut a UTF-8 sequence.
/// Separators stay attached to the start of the piece that follows them,
/// and each window is whitespace-trimmed; windows that trim to nothing are
/// dropped.
///
/// # Example
///
/// ```rust
/// use docqa_rag::{RecursiveCharacterSplitter, TextSplitter};
///
/// let splitter = RecursiveCharacterSplitter::new(10, 5);
/// let windows = splitter.split_text("aaaa bbbb cccc dddd");
/// assert_eq!(windows, vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter with the default separator hierarchy.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per window
    /// * `chunk_overlap`: maximum number of characters shared by consecutive windows
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Replace the separator hierarchy.
    pub fn with_separators<S: Into<String>>(mut self, separators: impl IntoIterator<Item = S>) -> Self {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);
        let splits = split_keeping_separator(text, separator);

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for split in splits {
            if char_len(split) < self.chunk_size {
                fitting.push(split);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge_splits(&fitting));
                fitting.clear();
            }

            if !remaining.is_empty() {
                chunks.extend(self.split_recursive(split, remaining));
            } else if char_len(split) > self.chunk_size {
                // Only reachable with a custom hierarchy that lacks "".
                chunks.extend(
                    split_by_size(split, self.chunk_size, self.chunk_overlap)
                        .into_iter()
                        .filter_map(|window| trimmed(&window)),
                );
            } else if let Some(window) = trimmed(split) {
                chunks.push(window);
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge_splits(&fitting));
        }

        chunks
    }

    /// Greedily merge pieces into windows no longer than `chunk_size`.
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size && !current.is_empty() {
                if let Some(window) = join_window(&current) {
                    windows.push(window);
                }
                // Keep at most `chunk_overlap` trailing characters, and only as
                // many as still leave room for `split`.
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(dropped) => total -= char_len(dropped),
                        None => break,
                    }
                }
            }

            current.push_back(split);
            total += len;
        }

        if let Some(window) = join_window(&current) {
            windows.push(window);
        }

        windows
    }
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first separator that occurs in `text` (or `""`), plus the finer
/// separators left for recursion.
fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator, &separators[i + 1..]);
        }
    }
    (separators.last().map(String::as_str).unwrap_or(""), &[])
}

/// Split at `separator`, keeping it at the start of the following piece.
/// An empty separator yields single characters. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn join_window(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    trimmed(&joined)
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

/// Character-window splitting with overlap.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}
