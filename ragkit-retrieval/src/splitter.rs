use std::collections::VecDeque;

use ragkit_core::{Document, Value};

use crate::SplitterConfigError;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Paragraph, line, word, character.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits `text` into chunks of at most `chunk_size` characters.
///
/// The first separator found in the text decides where to cut. Pieces that
/// are still too long are split again with the finer separators that follow
/// it, and short pieces are merged back into chunks where consecutive chunks
/// share up to `chunk_overlap` characters. Chunks are trimmed and empty ones
/// dropped.
pub fn split_text(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    Merger {
        chunk_size,
        chunk_overlap,
        strip_whitespace: true,
    }
    .split_recursive(text, separators)
}

struct Merger {
    chunk_size: usize,
    chunk_overlap: usize,
    strip_whitespace: bool,
}

impl Merger {
    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);
        let mut chunks = Vec::new();
        let mut short_pieces: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                short_pieces.push(piece);
                continue;
            }

            if !short_pieces.is_empty() {
                chunks.extend(self.merge(&short_pieces));
                short_pieces.clear();
            }

            if finer.is_empty() {
                tracing::warn!(
                    size = char_len(piece),
                    chunk_size = self.chunk_size,
                    "no separator left to split an oversized piece"
                );
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !short_pieces.is_empty() {
            chunks.extend(self.merge(&short_pieces));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if !window.is_empty() {
                    if let Some(chunk) = self.join(&window) {
                        chunks.push(chunk);
                    }
                    // Keep a tail of at most `chunk_overlap` characters that
                    // still leaves room for the incoming piece.
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match window.pop_front() {
                            Some((_, dropped)) => total -= dropped,
                            None => break,
                        }
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        if let Some(chunk) = self.join(&window) {
            chunks.push(chunk);
        }
        chunks
    }

    fn join(&self, window: &VecDeque<(&str, usize)>) -> Option<String> {
        let joined: String = window.iter().map(|(piece, _)| *piece).collect();
        let text = if self.strip_whitespace {
            joined.trim().to_string()
        } else {
            joined
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Returns the first separator present in `text` and the finer separators
/// after it. The empty separator always matches and ends the recursion.
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (idx, separator) in separators.iter().copied().enumerate() {
        if separator.is_empty() {
            return (separator, &[]);
        }
        if text.contains(separator) {
            return (separator, &separators[idx + 1..]);
        }
    }
    (separators.last().copied().unwrap_or(""), &[])
}

/// Splits before every occurrence of `separator`, so each piece after the
/// first starts with the separator. An empty separator splits into chars.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(idx, ch)| &text[idx..idx + ch.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Character offset of `needle` in `haystack`, searching from the character
/// offset `from`.
fn find_char_index(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let from_byte = haystack
        .char_indices()
        .nth(from)
        .map(|(idx, _)| idx)
        .unwrap_or(haystack.len());
    let found = haystack[from_byte..].find(needle)?;
    Some(char_len(&haystack[..from_byte + found]))
}

#[derive(Clone, Debug)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
    strip_whitespace: bool,
    add_start_index: bool,
}

impl Default for RecursiveCharacterTextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            strip_whitespace: true,
            add_start_index: false,
        }
    }
}

impl RecursiveCharacterTextSplitter {
    pub fn builder() -> RecursiveCharacterTextSplitterBuilder {
        RecursiveCharacterTextSplitterBuilder::default()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        Merger {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            strip_whitespace: self.strip_whitespace,
        }
        .split_recursive(text, &separators)
    }

    /// Splits every document, keeping its metadata on each chunk.
    ///
    /// Chunk ids are `"{parent_id}:{index}"`. With `add_start_index`, each
    /// chunk also records its character offset in the parent as
    /// `start_index`.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut out = Vec::new();

        for document in documents {
            let mut start = 0usize;
            let mut previous_len = 0usize;

            for (index, content) in self.split_text(&document.content).into_iter().enumerate() {
                let mut metadata = document.metadata.clone();
                if self.add_start_index {
                    let from = (start + previous_len).saturating_sub(self.chunk_overlap);
                    let found = find_char_index(&document.content, &content, from);
                    if let Some(offset) = found {
                        start = offset;
                    }
                    previous_len = char_len(&content);
                    metadata.insert(
                        "start_index".to_string(),
                        found.map(Value::from).unwrap_or(Value::Null),
                    );
                }

                out.push(Document {
                    id: format!("{}:{index}", document.id),
                    content,
                    metadata,
                    embedding: None,
                });
            }
        }

        out
    }
}

#[derive(Clone, Debug)]
pub struct RecursiveCharacterTextSplitterBuilder {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
    strip_whitespace: bool,
    add_start_index: bool,
}

impl Default for RecursiveCharacterTextSplitterBuilder {
    fn default() -> Self {
        let defaults = RecursiveCharacterTextSplitter::default();
        Self {
            chunk_size: defaults.chunk_size,
            chunk_overlap: defaults.chunk_overlap,
            separators: defaults.separators,
            strip_whitespace: defaults.strip_whitespace,
            add_start_index: defaults.add_start_index,
        }
    }
}

impl RecursiveCharacterTextSplitterBuilder {
    pub fn chunk_size(mut self, value: usize) -> Self {
        self.chunk_size = value;
        self
    }

    pub fn chunk_overlap(mut self, value: usize) -> Self {
        self.chunk_overlap = value;
        self
    }

    pub fn separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn strip_whitespace(mut self, value: bool) -> Self {
        self.strip_whitespace = value;
        self
    }

    pub fn add_start_index(mut self, value: bool) -> Self {
        self.add_start_index = value;
        self
    }

    pub fn build(self) -> Result<RecursiveCharacterTextSplitter, SplitterConfigError> {
        if self.chunk_size == 0 {
            return Err(SplitterConfigError::ChunkSizeMustBeGreaterThanZero);
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(SplitterConfigError::OverlapExceedsChunkSize {
                overlap: self.chunk_overlap,
                chunk_size: self.chunk_size,
            });
        }
        if self.separators.is_empty() {
            return Err(SplitterConfigError::EmptySeparators);
        }

        Ok(RecursiveCharacterTextSplitter {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            separators: self.separators,
            strip_whitespace: self.strip_whitespace,
            add_start_index: self.add_start_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_stays_attached_to_following_piece() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\na", "\n\n"), vec!["\n\na"]);
        assert_eq!(
            split_keeping_separator("a\n\n\n\nb", "\n\n"),
            vec!["a", "\n\n", "\n\nb"]
        );
    }

    #[test]
    fn empty_separator_splits_on_char_boundaries() {
        assert_eq!(split_keeping_separator("a🙂b", ""), vec!["a", "🙂", "b"]);
    }

    #[test]
    fn pick_separator_prefers_coarsest_present() {
        let separators = DEFAULT_SEPARATORS;
        let (separator, finer) = pick_separator("one two\nthree", &separators);
        assert_eq!(separator, "\n");
        assert_eq!(finer, &[" ", ""]);

        let (separator, finer) = pick_separator("abc", &separators);
        assert_eq!(separator, "");
        assert!(finer.is_empty());
    }

    #[test]
    fn pick_separator_falls_back_to_last_when_nothing_matches() {
        let separators = ["\n\n", "|"];
        let (separator, finer) = pick_separator("plain", &separators);
        assert_eq!(separator, "|");
        assert!(finer.is_empty());
    }

    #[test]
    fn find_char_index_counts_chars_not_bytes() {
        assert_eq!(find_char_index("🙂🙂ab", "ab", 0), Some(2));
        assert_eq!(find_char_index("abab", "ab", 1), Some(2));
        assert_eq!(find_char_index("abc", "zz", 0), None);
        assert_eq!(find_char_index("abc", "a", 10), None);
    }

    #[test]
    fn merge_drops_whitespace_only_chunks() {
        let merger = Merger {
            chunk_size: 4,
            chunk_overlap: 0,
            strip_whitespace: true,
        };
        assert_eq!(merger.merge(&["  ", "  "]), Vec::<String>::new());
    }
}
