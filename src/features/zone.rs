//! Zone features for zone classification.
//!
//! Every calculator scores a [`Zone`] against the [`PageContext`] of the page
//! holding it. [`default_zone_features`] assembles the standard set.

use lazy_static::lazy_static;
use regex::Regex;

use super::{FeatureCalculator, FeatureVectorBuilder};
use crate::geometry::Rect;
use crate::model::{Page, Zone};

lazy_static! {
    /// A word written entirely in capitals (at least two characters).
    static ref RE_UPPERCASE_WORD: Regex = Regex::new(r"^[A-Z][-'A-Z]+$").unwrap();

    /// Text opening with a (possibly bracketed) number.
    static ref RE_STARTS_WITH_NUMBER: Regex = Regex::new(r"^\s*[\[(]?\d+").unwrap();
}

/// Bottom coordinates closer than this are treated as equal when looking for
/// the highest zone.
const BOTTOM_TOLERANCE: f64 = 0.1;

/// Zones whose top is within this distance of the highest zone's top also
/// count as highest.
const TOP_EPSILON: f64 = 10.0;

/// What a zone calculator knows about the page around the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    /// 0-based page number
    pub page_index: usize,
    /// Number of pages in the document
    pub page_count: usize,
    /// Page bounds
    pub page_bounds: Rect,
    /// Bounds of every zone of the page, in page order
    pub zone_bounds: Vec<Rect>,
}

impl PageContext {
    /// Capture the context of `page` in a document of `page_count` pages.
    pub fn new(page: &Page, page_count: usize) -> Self {
        Self {
            page_index: page.index(),
            page_count,
            page_bounds: page.bounds(),
            zone_bounds: page.zones().iter().map(Zone::bounds).collect(),
        }
    }

    /// Bounds of the zone with the smallest bottom; the first such zone wins
    /// near-ties.
    pub fn highest_zone(&self) -> Option<Rect> {
        self.zone_bounds.iter().copied().fold(None, |best, r| match best {
            Some(b) if r.bottom() >= b.bottom() - BOTTOM_TOLERANCE => Some(b),
            _ => Some(r),
        })
    }

    /// Bounds of the zone with the largest top; the first such zone wins
    /// near-ties.
    pub fn lowest_zone(&self) -> Option<Rect> {
        self.zone_bounds.iter().copied().fold(None, |best, r| match best {
            Some(b) if r.top() <= b.top() + BOTTOM_TOLERANCE => Some(b),
            _ => Some(r),
        })
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// 1 on the first page of the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsFirstPage;

impl FeatureCalculator<Zone, PageContext> for IsFirstPage {
    fn name(&self) -> &str {
        "is_first_page"
    }

    fn calculate(&self, _zone: &Zone, context: &PageContext) -> f64 {
        flag(context.page_index == 0)
    }
}

/// 1 on the last page of the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsLastPage;

impl FeatureCalculator<Zone, PageContext> for IsLastPage {
    fn name(&self) -> &str {
        "is_last_page"
    }

    fn calculate(&self, _zone: &Zone, context: &PageContext) -> f64 {
        flag(context.page_index + 1 == context.page_count)
    }
}

/// 1 for the topmost zone of the page and any zone starting level with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsHighestOnPage;

impl FeatureCalculator<Zone, PageContext> for IsHighestOnPage {
    fn name(&self) -> &str {
        "is_highest_on_page"
    }

    fn calculate(&self, zone: &Zone, context: &PageContext) -> f64 {
        let bounds = zone.bounds();
        match context.highest_zone() {
            Some(highest) => {
                flag(highest == bounds || (bounds.top() - highest.top()).abs() <= TOP_EPSILON)
            },
            None => 0.0,
        }
    }
}

/// 1 for the bottommost zone of the page and any zone ending level with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsLowestOnPage;

impl FeatureCalculator<Zone, PageContext> for IsLowestOnPage {
    fn name(&self) -> &str {
        "is_lowest_on_page"
    }

    fn calculate(&self, zone: &Zone, context: &PageContext) -> f64 {
        let bounds = zone.bounds();
        match context.lowest_zone() {
            Some(lowest) => flag(
                lowest == bounds || (bounds.bottom() - lowest.bottom()).abs() <= TOP_EPSILON,
            ),
            None => 0.0,
        }
    }
}

/// Which edge or extent of the zone a [`RelativePosition`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Left edge over page width
    X,
    /// Top edge over page height
    Y,
    /// Width over page width
    Width,
    /// Height over page height
    Height,
}

/// Zone position or size relative to the page.
#[derive(Debug, Clone, Copy)]
pub struct RelativePosition {
    dimension: Dimension,
}

impl RelativePosition {
    /// Report the given dimension.
    pub fn new(dimension: Dimension) -> Self {
        Self { dimension }
    }
}

impl FeatureCalculator<Zone, PageContext> for RelativePosition {
    fn name(&self) -> &str {
        match self.dimension {
            Dimension::X => "relative_x",
            Dimension::Y => "relative_y",
            Dimension::Width => "relative_width",
            Dimension::Height => "relative_height",
        }
    }

    fn calculate(&self, zone: &Zone, context: &PageContext) -> f64 {
        let b = zone.bounds();
        let page = context.page_bounds;
        match self.dimension {
            Dimension::X => ratio(b.left() - page.left(), page.width),
            Dimension::Y => ratio(b.top() - page.top(), page.height),
            Dimension::Width => ratio(b.width, page.width),
            Dimension::Height => ratio(b.height, page.height),
        }
    }
}

/// Number of lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCount;

impl FeatureCalculator<Zone, PageContext> for LineCount {
    fn name(&self) -> &str {
        "line_count"
    }

    fn calculate(&self, zone: &Zone, _context: &PageContext) -> f64 {
        zone.lines().len() as f64
    }
}

/// Mean number of words per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordsPerLine;

impl FeatureCalculator<Zone, PageContext> for WordsPerLine {
    fn name(&self) -> &str {
        "words_per_line"
    }

    fn calculate(&self, zone: &Zone, _context: &PageContext) -> f64 {
        ratio(zone.word_count() as f64, zone.lines().len() as f64)
    }
}

/// Share of whitespace-separated words written in capitals.
#[derive(Debug, Clone, Copy, Default)]
pub struct UppercaseWordRatio;

impl FeatureCalculator<Zone, PageContext> for UppercaseWordRatio {
    fn name(&self) -> &str {
        "uppercase_word_ratio"
    }

    fn calculate(&self, zone: &Zone, _context: &PageContext) -> f64 {
        let words: Vec<&str> = zone.text().split_whitespace().collect();
        let upper = words.iter().filter(|w| RE_UPPERCASE_WORD.is_match(w)).count();
        ratio(upper as f64, words.len() as f64)
    }
}

/// Share of non-whitespace characters that are digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitRatio;

impl FeatureCalculator<Zone, PageContext> for DigitRatio {
    fn name(&self) -> &str {
        "digit_ratio"
    }

    fn calculate(&self, zone: &Zone, _context: &PageContext) -> f64 {
        let (digits, total) = zone
            .text()
            .chars()
            .filter(|c| !c.is_whitespace())
            .fold((0usize, 0usize), |(d, t), c| {
                (d + usize::from(c.is_ascii_digit()), t + 1)
            });
        ratio(digits as f64, total as f64)
    }
}

/// 1 if the text contains an `@` (e-mail addresses).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsAtSign;

impl FeatureCalculator<Zone, PageContext> for ContainsAtSign {
    fn name(&self) -> &str {
        "contains_at_sign"
    }

    fn calculate(&self, zone: &Zone, _context: &PageContext) -> f64 {
        flag(zone.text().contains('@'))
    }
}

/// 1 if the text opens with a number, optionally bracketed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartsWithNumber;

impl FeatureCalculator<Zone, PageContext> for StartsWithNumber {
    fn name(&self) -> &str {
        "starts_with_number"
    }

    fn calculate(&self, zone: &Zone, _context: &PageContext) -> f64 {
        flag(starts_with_number(zone.text()))
    }
}

pub(crate) fn starts_with_number(text: &str) -> bool {
    RE_STARTS_WITH_NUMBER.is_match(text)
}

/// The standard zone feature set, in a fixed order.
pub fn default_zone_features() -> FeatureVectorBuilder<Zone, PageContext> {
    FeatureVectorBuilder::new()
        .with_calculator(IsFirstPage)
        .with_calculator(IsLastPage)
        .with_calculator(IsHighestOnPage)
        .with_calculator(IsLowestOnPage)
        .with_calculator(RelativePosition::new(Dimension::X))
        .with_calculator(RelativePosition::new(Dimension::Y))
        .with_calculator(RelativePosition::new(Dimension::Width))
        .with_calculator(RelativePosition::new(Dimension::Height))
        .with_calculator(LineCount)
        .with_calculator(WordsPerLine)
        .with_calculator(UppercaseWordRatio)
        .with_calculator(DigitRatio)
        .with_calculator(ContainsAtSign)
        .with_calculator(StartsWithNumber)
}
