//! Grouping of a zone's chunks into lines and words.

use std::cmp::Ordering;

use crate::config::AssemblyConfig;
use crate::geometry::Rect;
use crate::model::{Chunk, Line, Word, Zone};
use crate::utils::safe_float_cmp;

/// Builds the line/word structure of a zone from its flat chunk list.
#[derive(Debug, Clone)]
pub struct ZoneAssembler {
    line_overlap_ratio: f64,
    word_gap_ratio: f64,
}

impl Default for ZoneAssembler {
    fn default() -> Self {
        Self::new(&AssemblyConfig::default())
    }
}

/// Chunks collected for one line, with their running vertical extent.
struct LineGroup {
    top: f64,
    bottom: f64,
    chunks: Vec<Chunk>,
}

impl LineGroup {
    fn accepts(&self, rect: &Rect, ratio: f64) -> bool {
        let overlap = (self.bottom.min(rect.bottom()) - self.top.max(rect.top())).max(0.0);
        let smaller = (self.bottom - self.top).min(rect.height);
        if smaller <= 0.0 {
            let center = rect.center().y;
            return center >= self.top && center <= self.bottom;
        }
        overlap >= ratio * smaller
    }

    fn push(&mut self, chunk: Chunk) {
        let rect = chunk.bounds();
        self.top = self.top.min(rect.top());
        self.bottom = self.bottom.max(rect.bottom());
        self.chunks.push(chunk);
    }
}

impl ZoneAssembler {
    /// Create an assembler from its configuration.
    pub fn new(config: &AssemblyConfig) -> Self {
        Self {
            line_overlap_ratio: config.line_overlap_ratio,
            word_gap_ratio: config.word_gap_ratio,
        }
    }

    /// Build a zone from `chunks`.
    ///
    /// Each chunk joins the first line it overlaps vertically by at least
    /// `line_overlap_ratio` of the smaller height. Lines come out top to
    /// bottom, chunks inside a line left to right, and a new word starts at
    /// every gap wider than `word_gap_ratio` times the mean chunk height of
    /// the line.
    pub fn assemble(&self, chunks: Vec<Chunk>) -> Zone {
        let mut groups: Vec<LineGroup> = Vec::new();
        for chunk in chunks {
            let rect = chunk.bounds();
            match groups
                .iter_mut()
                .find(|g| g.accepts(&rect, self.line_overlap_ratio))
            {
                Some(group) => group.push(chunk),
                None => groups.push(LineGroup {
                    top: rect.top(),
                    bottom: rect.bottom(),
                    chunks: vec![chunk],
                }),
            }
        }

        groups.sort_by(|a, b| safe_float_cmp(a.top, b.top));
        Zone::from_lines(groups.into_iter().map(|g| self.build_line(g.chunks)).collect())
    }

    fn build_line(&self, mut chunks: Vec<Chunk>) -> Line {
        chunks.sort_by(|a, b| compare_left(&a.bounds(), &b.bounds()));

        let mean_height = if chunks.is_empty() {
            0.0
        } else {
            chunks.iter().map(|c| c.bounds().height).sum::<f64>() / chunks.len() as f64
        };
        let max_gap = self.word_gap_ratio * mean_height;

        let mut words = Vec::new();
        let mut current = Word::new();
        let mut last_right: Option<f64> = None;
        for chunk in chunks {
            let rect = chunk.bounds();
            if let Some(right) = last_right {
                if rect.left() - right > max_gap {
                    words.push(std::mem::take(&mut current));
                }
            }
            last_right = Some(last_right.map_or(rect.right(), |r| r.max(rect.right())));
            current.add_chunk(chunk);
        }
        if !current.chunks().is_empty() {
            words.push(current);
        }
        Line::from_words(words)
    }
}

fn compare_left(a: &Rect, b: &Rect) -> Ordering {
    safe_float_cmp(a.left(), b.left())
}
