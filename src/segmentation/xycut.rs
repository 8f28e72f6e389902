//! XY-cut page segmentation.
//!
//! # Algorithm
//!
//! 1. Project the zone's chunks on X and on Y and merge overlapping extents
//!    into ranges ([`to_ranges`])
//! 2. Take the valleys between consecutive ranges on both axes
//! 3. Pick the longest valley overall (X wins ties)
//! 4. If it is longer than `threshold_ratio × page height`, split the chunks
//!    at the valley and recurse into both halves
//! 5. Otherwise the zone is a leaf
//!
//! Leaves are emitted depth first, the part before the valley ahead of the
//! part after it.

use super::{max_valley, to_ranges, to_valleys, Axis, DocumentSegmenter, Range, ZoneAssembler};
use crate::config::{AssemblyConfig, SegmentationConfig};
use crate::error::Result;
use crate::geometry::Rect;
use crate::model::{union_of, Chunk, Page, Zone};

/// A leaf of the cut tree: zone bounds plus the indices of its chunks in the
/// page's chunk list.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCut {
    /// Bounds of the zone
    pub bounds: Rect,
    /// Chunk indices, grouped by range in range order
    pub members: Vec<usize>,
}

/// Recursive whitespace-cut segmenter.
#[derive(Debug, Clone)]
pub struct XYCutSegmenter {
    /// Minimum valley length as a fraction of page height (default: 0.025).
    pub threshold_ratio: f64,

    assembler: ZoneAssembler,
}

impl Default for XYCutSegmenter {
    fn default() -> Self {
        Self::new(&SegmentationConfig::default(), &AssemblyConfig::default())
    }
}

impl XYCutSegmenter {
    /// Create a segmenter from stage configuration.
    pub fn new(segmentation: &SegmentationConfig, assembly: &AssemblyConfig) -> Self {
        Self {
            threshold_ratio: segmentation.threshold_ratio,
            assembler: ZoneAssembler::new(assembly),
        }
    }

    /// Set the cut threshold ratio.
    pub fn with_threshold_ratio(mut self, ratio: f64) -> Self {
        self.threshold_ratio = ratio;
        self
    }

    /// Minimum valley length for a page of the given height.
    pub fn threshold(&self, page_height: f64) -> f64 {
        self.threshold_ratio * page_height
    }

    /// Cut `chunks` into leaf zones.
    ///
    /// An empty chunk list yields no zones. If the page is never split the
    /// single leaf keeps `page_bounds`; every other leaf is bounded by the
    /// union of its chunks.
    pub fn cut(&self, chunks: &[Chunk], page_bounds: Rect) -> Vec<ZoneCut> {
        if chunks.is_empty() {
            return Vec::new();
        }

        let threshold = self.threshold(page_bounds.height);
        let root = ZoneCut {
            bounds: page_bounds,
            members: (0..chunks.len()).collect(),
        };

        // Explicit stack: one cut per pushed entry, popped in depth-first,
        // before-valley-first order.
        let mut leaves = Vec::new();
        let mut pending = vec![self.cut_in_two(chunks, root, threshold)];
        while let Some(parts) = pending.pop() {
            if parts.len() < 2 {
                leaves.extend(parts);
                continue;
            }
            for part in parts.into_iter().rev() {
                pending.push(self.cut_in_two(chunks, part, threshold));
            }
        }

        log::debug!(
            "XY-cut: {} chunks -> {} zones (threshold {:.2})",
            chunks.len(),
            leaves.len(),
            threshold
        );
        leaves
    }

    fn cut_in_two(&self, chunks: &[Chunk], zone: ZoneCut, threshold: f64) -> Vec<ZoneCut> {
        let items = || zone.members.iter().map(|&i| (i, chunks[i].bounds()));
        let y_ranges = to_ranges(items(), Axis::Y);
        let x_ranges = to_ranges(items(), Axis::X);
        let x_valleys = to_valleys(&x_ranges, Axis::X);
        let y_valleys = to_valleys(&y_ranges, Axis::Y);

        let valley = match max_valley(&x_valleys, &y_valleys) {
            Some(v) if v.length() > threshold => v,
            _ => return vec![zone],
        };

        let ranges = match valley.axis {
            Axis::X => x_ranges,
            Axis::Y => y_ranges,
        };
        log::debug!(
            "Cutting {} chunks along {:?} at [{:.2}, {:.2}]",
            zone.members.len(),
            valley.axis,
            valley.start,
            valley.end
        );

        let (before, after) = divide(ranges, valley.start);
        [before, after]
            .into_iter()
            .filter(|members| !members.is_empty())
            .map(|members| ZoneCut {
                bounds: union_of(members.iter().map(|&i| chunks[i].bounds())),
                members,
            })
            .collect()
    }

    /// Segment one page: its raw chunks are replaced by assembled zones.
    ///
    /// A page without raw chunks but with zones is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`](crate::Error::MalformedInput) if the
    /// page or any chunk has invalid bounds.
    pub fn segment_page(&self, page: &mut Page) -> Result<()> {
        page.validate()?;
        if page.chunks().is_empty() && !page.zones().is_empty() {
            log::debug!("Page {} already segmented, skipping", page.index());
            return Ok(());
        }

        let chunks = page.take_chunks();
        let cuts = self.cut(&chunks, page.bounds());

        let mut slots: Vec<Option<Chunk>> = chunks.into_iter().map(Some).collect();
        let zones: Vec<Zone> = cuts
            .into_iter()
            .map(|cut| {
                let members = cut
                    .members
                    .iter()
                    .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
                    .collect();
                self.assembler.assemble(members).with_bounds(cut.bounds)
            })
            .collect();

        log::debug!("Page {}: {} zones", page.index(), zones.len());
        page.set_zones(zones);
        Ok(())
    }
}

impl DocumentSegmenter for XYCutSegmenter {
    fn segment_page(&self, page: &mut Page) -> Result<()> {
        XYCutSegmenter::segment_page(self, page)
    }

    fn name(&self) -> &'static str {
        "XYCut"
    }
}

/// Split ranges at `valley_start`: ranges starting strictly before it form the
/// first group, the rest the second. Members keep range order.
fn divide(ranges: Vec<Range>, valley_start: f64) -> (Vec<usize>, Vec<usize>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    for range in ranges {
        if range.start < valley_start {
            before.extend(range.members);
        } else {
            after.extend(range.members);
        }
    }
    (before, after)
}
