//! The ordered line block a reference splitter works on.

use crate::geometry::Rect;
use crate::model::{Document, Line, ZoneLabel};

/// One line of a reference block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLine {
    index: usize,
    text: String,
    bounds: Rect,
}

impl BlockLine {
    /// Position of the line in its block.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Line text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Candidate reference lines in reading order, with the block-wide extents
/// the line features are normalised by.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceBlock {
    lines: Vec<BlockLine>,
    min_x: f64,
    max_right: f64,
    max_width: f64,
    mean_height: f64,
}

impl Default for ReferenceBlock {
    fn default() -> Self {
        Self::new(Vec::<(String, Rect)>::new())
    }
}

impl ReferenceBlock {
    /// Build a block from `(text, bounds)` pairs in reading order.
    pub fn new<S: Into<String>>(lines: Vec<(S, Rect)>) -> Self {
        let lines: Vec<BlockLine> = lines
            .into_iter()
            .enumerate()
            .map(|(index, (text, bounds))| BlockLine {
                index,
                text: text.into(),
                bounds,
            })
            .collect();

        let (min_x, max_right, max_width, height_sum) = lines.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64, 0.0_f64),
            |(min_x, max_right, max_width, heights), l| {
                (
                    min_x.min(l.bounds.left()),
                    max_right.max(l.bounds.right()),
                    max_width.max(l.bounds.width),
                    heights + l.bounds.height,
                )
            },
        );

        if lines.is_empty() {
            return Self {
                lines,
                min_x: 0.0,
                max_right: 0.0,
                max_width: 0.0,
                mean_height: 0.0,
            };
        }
        let mean_height = height_sum / lines.len() as f64;
        Self {
            lines,
            min_x,
            max_right,
            max_width,
            mean_height,
        }
    }

    /// Build a block from model lines.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a Line>,
    {
        Self::new(
            lines
                .into_iter()
                .map(|l| (l.text().to_string(), l.bounds()))
                .collect(),
        )
    }

    /// Collect the lines of every zone labelled [`ZoneLabel::References`], in
    /// document order, keeping at most `max_lines`.
    pub fn from_document(document: &Document, max_lines: usize) -> Self {
        let lines: Vec<&Line> = document
            .zones()
            .filter(|z| z.label() == Some(ZoneLabel::References))
            .flat_map(|z| z.lines().iter())
            .collect();
        if lines.len() > max_lines {
            log::warn!(
                "Reference block has {} lines, keeping the first {}",
                lines.len(),
                max_lines
            );
        }
        Self::from_lines(lines.into_iter().take(max_lines))
    }

    /// Lines in order.
    pub fn lines(&self) -> &[BlockLine] {
        &self.lines
    }

    /// Line `index`, if present.
    pub fn line(&self, index: usize) -> Option<&BlockLine> {
        self.lines.get(index)
    }

    /// The line before `line`, if any.
    pub fn prev(&self, line: &BlockLine) -> Option<&BlockLine> {
        line.index.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Leftmost line start.
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Rightmost line end.
    pub fn max_right(&self) -> f64 {
        self.max_right
    }

    /// Width of the widest line.
    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    /// Mean line height.
    pub fn mean_height(&self) -> f64 {
        self.mean_height
    }

    /// Line texts in order.
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }
}
