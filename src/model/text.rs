//! Leaf-level text containers: chunks, words and lines.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{union_of, Derived};
use crate::geometry::Rect;

/// A positioned glyph or glyph run, as produced by the character extractor.
///
/// Chunks are leaves and immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    bounds: Rect,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
}

impl Chunk {
    /// Create a chunk with the given bounds and literal text.
    pub fn new(bounds: Rect, text: impl Into<String>) -> Self {
        Self {
            bounds,
            text: text.into(),
            font_name: None,
            font_size: None,
        }
    }

    /// Attach font information.
    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.font_name = Some(name.into());
        self.font_size = Some(size);
        self
    }

    /// Bounding box of the glyph(s).
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Literal text of the glyph(s).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Font name, if the extractor reported one.
    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref()
    }

    /// Font size, if the extractor reported one.
    pub fn font_size(&self) -> Option<f64> {
        self.font_size
    }
}

/// A word: horizontally adjacent chunks.
#[derive(Debug, Clone, Default)]
pub struct Word {
    chunks: Vec<Chunk>,
    explicit_bounds: Option<Rect>,
    derived: Derived,
}

impl Word {
    /// Create an empty word.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a word owning `chunks` in the given order.
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            ..Self::default()
        }
    }

    /// Override the derived bounds.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.explicit_bounds = Some(bounds);
        self.derived.reset();
        self
    }

    /// Append a chunk.
    pub fn add_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
        self.derived.reset();
    }

    /// Chunks in order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Explicit bounds, or the union of the chunk bounds.
    pub fn bounds(&self) -> Rect {
        match self.explicit_bounds {
            Some(b) => b,
            None => self
                .derived
                .bounds(|| union_of(self.chunks.iter().map(Chunk::bounds))),
        }
    }

    /// Chunk texts concatenated without separator.
    pub fn text(&self) -> &str {
        self.derived
            .text(|| self.chunks.iter().map(Chunk::text).collect())
    }
}

/// A line of text: words sharing a baseline.
#[derive(Debug, Clone, Default)]
pub struct Line {
    words: Vec<Word>,
    explicit_bounds: Option<Rect>,
    derived: Derived,
}

impl Line {
    /// Create an empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a line owning `words` in the given order.
    pub fn from_words(words: Vec<Word>) -> Self {
        Self {
            words,
            ..Self::default()
        }
    }

    /// Override the derived bounds.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.explicit_bounds = Some(bounds);
        self.derived.reset();
        self
    }

    /// Append a word.
    pub fn add_word(&mut self, word: Word) {
        self.words.push(word);
        self.derived.reset();
    }

    /// Replace all words.
    pub fn set_words(&mut self, words: Vec<Word>) {
        self.words = words;
        self.derived.reset();
    }

    /// Words in order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Mutable access to the words; drops the cached text and bounds.
    pub fn words_mut(&mut self) -> &mut Vec<Word> {
        self.derived.reset();
        &mut self.words
    }

    /// Explicit bounds, or the union of the word bounds.
    pub fn bounds(&self) -> Rect {
        match self.explicit_bounds {
            Some(b) => b,
            None => self
                .derived
                .bounds(|| union_of(self.words.iter().map(Word::bounds))),
        }
    }

    /// Word texts joined by single spaces.
    pub fn text(&self) -> &str {
        self.derived.text(|| {
            self.words
                .iter()
                .map(Word::text)
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// Iterate over every chunk of the line.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.words.iter().flat_map(|w| w.chunks().iter())
    }

    /// The font name used by most chunks of the line (first seen wins ties).
    pub fn most_popular_font(&self) -> Option<&str> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for name in self.chunks().filter_map(Chunk::font_name) {
            *counts.entry(name).or_insert(0) += 1;
        }
        let mut best: Option<(&str, usize)> = None;
        for (name, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((name, count));
            }
        }
        best.map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(x: f64, y: f64, text: &str) -> Chunk {
        Chunk::new(Rect::new(x, y, 5.0, 10.0), text)
    }

    fn word(x: f64, y: f64, text: &str) -> Word {
        Word::from_chunks(
            text.chars()
                .enumerate()
                .map(|(i, c)| chunk(x + i as f64 * 5.0, y, &c.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_word_text_and_bounds() {
        let w = word(10.0, 20.0, "abc");
        assert_eq!(w.text(), "abc");
        assert_eq!(w.bounds(), Rect::new(10.0, 20.0, 15.0, 10.0));
    }

    #[test]
    fn test_word_cache_invalidated_on_add() {
        let mut w = word(0.0, 0.0, "ab");
        assert_eq!(w.text(), "ab");
        w.add_chunk(chunk(10.0, 0.0, "c"));
        assert_eq!(w.text(), "abc");
        assert_eq!(w.bounds().right(), 15.0);
    }

    #[test]
    fn test_explicit_bounds_win() {
        let w = word(0.0, 0.0, "ab").with_bounds(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(w.bounds(), Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_line_text_joins_words_with_space() {
        let line = Line::from_words(vec![word(0.0, 0.0, "Hello"), word(40.0, 0.0, "world")]);
        assert_eq!(line.text(), "Hello world");
        assert_eq!(line.bounds().left(), 0.0);
        assert_eq!(line.bounds().right(), 65.0);
    }

    #[test]
    fn test_line_words_mut_resets_cache() {
        let mut line = Line::from_words(vec![word(0.0, 0.0, "a"), word(40.0, 0.0, "b")]);
        assert_eq!(line.text(), "a b");
        line.words_mut().reverse();
        assert_eq!(line.text(), "b a");
    }

    #[test]
    fn test_most_popular_font() {
        let line = Line::from_words(vec![Word::from_chunks(vec![
            chunk(0.0, 0.0, "a").with_font("Times", 10.0),
            chunk(5.0, 0.0, "b").with_font("Arial", 10.0),
            chunk(10.0, 0.0, "c").with_font("Arial", 10.0),
            chunk(15.0, 0.0, "d"),
        ])]);
        assert_eq!(line.most_popular_font(), Some("Arial"));
        assert_eq!(Line::new().most_popular_font(), None);
    }
}
