//! One-dimensional ranges and the valleys between them.
//!
//! A [`Range`] is the extent along one axis covered by a group of chunks
//! whose extents overlap. Ranges are built by an online first-fit merge in
//! chunk input order, so the result depends on that order; this is what keeps
//! segmentation reproducible for a given extractor output.

use std::cmp::Ordering;

use crate::geometry::Rect;
use crate::utils::safe_float_cmp;

/// Projection axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal extents (`left..right`); valleys are vertical gutters.
    X,
    /// Vertical extents (`top..bottom`); valleys are horizontal gaps.
    Y,
}

impl Axis {
    /// Extent of `rect` along this axis as `(start, end)`.
    pub fn extent(&self, rect: &Rect) -> (f64, f64) {
        match self {
            Axis::X => (rect.left(), rect.right()),
            Axis::Y => (rect.top(), rect.bottom()),
        }
    }
}

/// A half-open interval `[start, end)` plus the items that contributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    /// Lowest coordinate covered
    pub start: f64,
    /// Highest coordinate covered
    pub end: f64,
    /// Ids of the contributing items, in merge order
    pub members: Vec<usize>,
}

impl Range {
    fn singleton(start: f64, end: f64, id: usize) -> Self {
        Self {
            start,
            end,
            members: vec![id],
        }
    }

    /// Whether `[start, end)` overlaps this range. Touching ranges do not overlap.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        start < self.end && end > self.start
    }

    /// Length of the range.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Merge item extents along `axis` into ranges sorted by start.
///
/// Items are visited in iteration order. Each one joins the first range (in
/// current start order) it overlaps, widening it, or else becomes a new range
/// inserted after any existing range with the same start.
///
/// # Examples
///
/// ```
/// use zone_oxide::geometry::Rect;
/// use zone_oxide::segmentation::{to_ranges, Axis};
///
/// let c = Rect::new(20.0, 0.0, 5.0, 1.0);
/// let a = Rect::new(0.0, 0.0, 5.0, 1.0);
/// let b = Rect::new(4.0, 0.0, 5.0, 1.0);
/// let ranges = to_ranges([(0, c), (1, a), (2, b)], Axis::X);
/// assert_eq!(ranges.len(), 2);
/// assert_eq!(ranges[0].members, vec![1, 2]);
/// assert_eq!(ranges[1].members, vec![0]);
/// ```
pub fn to_ranges<I>(items: I, axis: Axis) -> Vec<Range>
where
    I: IntoIterator<Item = (usize, Rect)>,
{
    let mut ranges: Vec<Range> = Vec::new();
    for (id, rect) in items {
        let (start, end) = axis.extent(&rect);
        match ranges.iter().position(|r| r.overlaps(start, end)) {
            Some(i) => {
                let mut range = ranges.remove(i);
                range.start = range.start.min(start);
                range.end = range.end.max(end);
                range.members.push(id);
                insert_sorted(&mut ranges, range);
            },
            None => insert_sorted(&mut ranges, Range::singleton(start, end, id)),
        }
    }
    ranges
}

fn insert_sorted(ranges: &mut Vec<Range>, range: Range) {
    let at = ranges.partition_point(|r| safe_float_cmp(r.start, range.start) != Ordering::Greater);
    ranges.insert(at, range);
}

/// The gap between two consecutive ranges along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valley {
    /// End of the earlier range
    pub start: f64,
    /// Start of the later range
    pub end: f64,
    /// Axis the ranges were built on
    pub axis: Axis,
}

impl Valley {
    /// Width of the gap. Negative when the ranges overlap.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Valleys between consecutive ranges: `[ranges[i].end, ranges[i + 1].start]`.
pub fn to_valleys(ranges: &[Range], axis: Axis) -> Vec<Valley> {
    ranges
        .windows(2)
        .map(|pair| Valley {
            start: pair[0].end,
            end: pair[1].start,
            axis,
        })
        .collect()
}

/// The longest valley over both axes.
///
/// Within one list the first of several equally long valleys wins; between
/// the two lists X wins ties.
pub fn max_valley(x_valleys: &[Valley], y_valleys: &[Valley]) -> Option<Valley> {
    let x_max = longest(x_valleys);
    let y_max = longest(y_valleys);
    match (x_max, y_max) {
        (Some(x), Some(y)) => {
            if safe_float_cmp(x.length(), y.length()) != Ordering::Less {
                Some(x)
            } else {
                Some(y)
            }
        },
        (x, None) => x,
        (None, y) => y,
    }
}

fn longest(valleys: &[Valley]) -> Option<Valley> {
    valleys.iter().copied().fold(None, |best, v| match best {
        Some(b) if safe_float_cmp(v.length(), b.length()) != Ordering::Greater => Some(b),
        _ => Some(v),
    })
}
