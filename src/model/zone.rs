//! Zones and their semantic labels.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{union_of, Derived, Line};
use crate::error::Error;
use crate::geometry::Rect;

/// Semantic role of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneLabel {
    /// Article title
    Title,
    /// Author names
    Author,
    /// Author affiliations
    Affiliation,
    /// Abstract
    Abstract,
    /// Keyword list
    Keywords,
    /// Correspondence address or e-mail
    Correspondence,
    /// Received/accepted/published dates
    Dates,
    /// Journal, volume, pages, DOI
    BibInfo,
    /// Copyright or license statement
    Copyright,
    /// Body text
    Body,
    /// Section heading
    Heading,
    /// Equation
    Equation,
    /// Figure or figure caption
    Figure,
    /// Table or table caption
    Table,
    /// Acknowledgments
    Acknowledgment,
    /// Bibliography
    References,
    /// Running page header
    Header,
    /// Running page footer
    Footer,
    /// Page number
    PageNumber,
    /// Anything else
    Unknown,
}

/// Coarse grouping of [`ZoneLabel`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    /// Front-matter metadata (title, authors, abstract, ...)
    Metadata,
    /// Main content
    Body,
    /// Bibliography
    References,
    /// Page furniture and unclassified zones
    Other,
}

impl ZoneLabel {
    /// All labels, in declaration order.
    pub const ALL: [ZoneLabel; 20] = [
        ZoneLabel::Title,
        ZoneLabel::Author,
        ZoneLabel::Affiliation,
        ZoneLabel::Abstract,
        ZoneLabel::Keywords,
        ZoneLabel::Correspondence,
        ZoneLabel::Dates,
        ZoneLabel::BibInfo,
        ZoneLabel::Copyright,
        ZoneLabel::Body,
        ZoneLabel::Heading,
        ZoneLabel::Equation,
        ZoneLabel::Figure,
        ZoneLabel::Table,
        ZoneLabel::Acknowledgment,
        ZoneLabel::References,
        ZoneLabel::Header,
        ZoneLabel::Footer,
        ZoneLabel::PageNumber,
        ZoneLabel::Unknown,
    ];

    /// Stable snake_case name, as used in model files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneLabel::Title => "title",
            ZoneLabel::Author => "author",
            ZoneLabel::Affiliation => "affiliation",
            ZoneLabel::Abstract => "abstract",
            ZoneLabel::Keywords => "keywords",
            ZoneLabel::Correspondence => "correspondence",
            ZoneLabel::Dates => "dates",
            ZoneLabel::BibInfo => "bib_info",
            ZoneLabel::Copyright => "copyright",
            ZoneLabel::Body => "body",
            ZoneLabel::Heading => "heading",
            ZoneLabel::Equation => "equation",
            ZoneLabel::Figure => "figure",
            ZoneLabel::Table => "table",
            ZoneLabel::Acknowledgment => "acknowledgment",
            ZoneLabel::References => "references",
            ZoneLabel::Header => "header",
            ZoneLabel::Footer => "footer",
            ZoneLabel::PageNumber => "page_number",
            ZoneLabel::Unknown => "unknown",
        }
    }

    /// Coarse category of the label.
    pub fn category(&self) -> LabelCategory {
        match self {
            ZoneLabel::Title
            | ZoneLabel::Author
            | ZoneLabel::Affiliation
            | ZoneLabel::Abstract
            | ZoneLabel::Keywords
            | ZoneLabel::Correspondence
            | ZoneLabel::Dates
            | ZoneLabel::BibInfo
            | ZoneLabel::Copyright => LabelCategory::Metadata,
            ZoneLabel::Body
            | ZoneLabel::Heading
            | ZoneLabel::Equation
            | ZoneLabel::Figure
            | ZoneLabel::Table
            | ZoneLabel::Acknowledgment => LabelCategory::Body,
            ZoneLabel::References => LabelCategory::References,
            ZoneLabel::Header | ZoneLabel::Footer | ZoneLabel::PageNumber | ZoneLabel::Unknown => {
                LabelCategory::Other
            },
        }
    }
}

impl fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Classification(format!("unknown zone label '{}'", s)))
    }
}

/// Probability assigned by a classifier to each candidate label.
pub type LabelDistribution = IndexMap<ZoneLabel, f64>;

/// A visually coherent region of a page.
#[derive(Debug, Clone, Default)]
pub struct Zone {
    lines: Vec<Line>,
    explicit_bounds: Option<Rect>,
    label: Option<ZoneLabel>,
    distribution: Option<LabelDistribution>,
    derived: Derived,
}

impl Zone {
    /// Create an empty, unlabelled zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zone owning `lines` in the given order.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Override the derived bounds.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.explicit_bounds = Some(bounds);
        self.derived.reset();
        self
    }

    /// Set the label (builder style).
    pub fn with_label(mut self, label: ZoneLabel) -> Self {
        self.label = Some(label);
        self
    }

    /// Append a line.
    pub fn add_line(&mut self, line: Line) {
        self.lines.push(line);
        self.derived.reset();
    }

    /// Lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Mutable access to the lines; drops the cached text and bounds.
    pub fn lines_mut(&mut self) -> &mut Vec<Line> {
        self.derived.reset();
        &mut self.lines
    }

    /// The line before line `index`, if any.
    pub fn prev_line(&self, index: usize) -> Option<&Line> {
        index.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    /// The line after line `index`, if any.
    pub fn next_line(&self, index: usize) -> Option<&Line> {
        if index >= self.lines.len() {
            return None;
        }
        self.lines.get(index + 1)
    }

    /// Explicit bounds, or the union of the line bounds.
    pub fn bounds(&self) -> Rect {
        match self.explicit_bounds {
            Some(b) => b,
            None => self
                .derived
                .bounds(|| union_of(self.lines.iter().map(Line::bounds))),
        }
    }

    /// Whether the bounds were set explicitly rather than derived.
    pub fn has_explicit_bounds(&self) -> bool {
        self.explicit_bounds.is_some()
    }

    /// Line texts joined by newlines.
    pub fn text(&self) -> &str {
        self.derived.text(|| {
            self.lines
                .iter()
                .map(Line::text)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Semantic label, if classified.
    pub fn label(&self) -> Option<ZoneLabel> {
        self.label
    }

    /// Set the semantic label.
    pub fn set_label(&mut self, label: ZoneLabel) {
        self.label = Some(label);
    }

    /// Label probabilities reported by the classifier, if any.
    pub fn distribution(&self) -> Option<&LabelDistribution> {
        self.distribution.as_ref()
    }

    /// Record the label probabilities reported by the classifier.
    pub fn set_distribution(&mut self, distribution: Option<LabelDistribution>) {
        self.distribution = distribution;
    }

    /// Number of words over all lines.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chunk, Word};

    fn line(y: f64, text: &str) -> Line {
        Line::from_words(vec![Word::from_chunks(vec![Chunk::new(
            Rect::new(0.0, y, 10.0 * text.len() as f64, 10.0),
            text,
        )])])
    }

    #[test]
    fn test_zone_text_and_bounds() {
        let zone = Zone::from_lines(vec![line(0.0, "first"), line(12.0, "second")]);
        assert_eq!(zone.text(), "first\nsecond");
        assert_eq!(zone.bounds(), Rect::new(0.0, 0.0, 60.0, 22.0));
        assert!(!zone.has_explicit_bounds());
    }

    #[test]
    fn test_zone_neighbours() {
        let zone = Zone::from_lines(vec![line(0.0, "a"), line(12.0, "b"), line(24.0, "c")]);
        assert!(zone.prev_line(0).is_none());
        assert_eq!(zone.prev_line(1).map(Line::text), Some("a"));
        assert_eq!(zone.next_line(1).map(Line::text), Some("c"));
        assert!(zone.next_line(2).is_none());
        assert!(zone.next_line(10).is_none());
    }

    #[test]
    fn test_zone_lines_mut_resets_cache() {
        let mut zone = Zone::from_lines(vec![line(0.0, "a")]);
        assert_eq!(zone.text(), "a");
        zone.lines_mut().push(line(12.0, "b"));
        assert_eq!(zone.text(), "a\nb");
        assert_eq!(zone.bounds().bottom(), 22.0);
    }

    #[test]
    fn test_label_round_trip_names() {
        for label in ZoneLabel::ALL {
            assert_eq!(label.as_str().parse::<ZoneLabel>().unwrap(), label);
        }
        assert!("nonsense".parse::<ZoneLabel>().is_err());
    }

    #[test]
    fn test_label_categories() {
        assert_eq!(ZoneLabel::Title.category(), LabelCategory::Metadata);
        assert_eq!(ZoneLabel::Body.category(), LabelCategory::Body);
        assert_eq!(ZoneLabel::References.category(), LabelCategory::References);
        assert_eq!(ZoneLabel::PageNumber.category(), LabelCategory::Other);
    }

    #[test]
    fn test_label_serde_name() {
        let json = serde_json::to_string(&ZoneLabel::BibInfo).unwrap();
        assert_eq!(json, "\"bib_info\"");
    }
}
