//! Line features for splitting a reference block into entries.
//!
//! Every calculator scores one [`BlockLine`] against its [`ReferenceBlock`].
//! The first line of an entry typically follows a line ending in a dot,
//! starts further left than continuation lines and often opens with a number.

use super::zone::starts_with_number;
use super::{FeatureCalculator, FeatureVectorBuilder};
use crate::references::{BlockLine, ReferenceBlock};

/// Upper bound for the normalised line spacing.
const MAX_LINE_SPACING: f64 = 5.0;

/// 1 if the previous line ends with a dot; 1 for the first line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrevEndsWithDot;

impl FeatureCalculator<BlockLine, ReferenceBlock> for PrevEndsWithDot {
    fn name(&self) -> &str {
        "prev_ends_with_dot"
    }

    fn calculate(&self, line: &BlockLine, block: &ReferenceBlock) -> f64 {
        match block.prev(line) {
            Some(prev) if !prev.text().trim_end().ends_with('.') => 0.0,
            _ => 1.0,
        }
    }
}

/// Width of the previous line over the widest line of the block.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrevRelativeLength;

impl FeatureCalculator<BlockLine, ReferenceBlock> for PrevRelativeLength {
    fn name(&self) -> &str {
        "prev_relative_length"
    }

    fn calculate(&self, line: &BlockLine, block: &ReferenceBlock) -> f64 {
        match block.prev(line) {
            Some(prev) if block.max_width() > 0.0 => prev.bounds().width / block.max_width(),
            _ => 0.0,
        }
    }
}

/// 1 if the line is indented by more than `threshold` of the block width.
#[derive(Debug, Clone, Copy)]
pub struct RelativeStartThreshold {
    threshold: f64,
}

impl RelativeStartThreshold {
    /// Create with the given fraction of the block width.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for RelativeStartThreshold {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl FeatureCalculator<BlockLine, ReferenceBlock> for RelativeStartThreshold {
    fn name(&self) -> &str {
        "relative_start_threshold"
    }

    fn calculate(&self, line: &BlockLine, block: &ReferenceBlock) -> f64 {
        let indent = line.bounds().left() - block.min_x();
        let width = block.max_right() - block.min_x();
        if indent > self.threshold * width {
            1.0
        } else {
            0.0
        }
    }
}

/// Gap to the previous line over the mean line height, clamped to `[0, 5]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceBetweenLines;

impl FeatureCalculator<BlockLine, ReferenceBlock> for SpaceBetweenLines {
    fn name(&self) -> &str {
        "space_between_lines"
    }

    fn calculate(&self, line: &BlockLine, block: &ReferenceBlock) -> f64 {
        let prev = match block.prev(line) {
            Some(prev) => prev,
            None => return 0.0,
        };
        if block.mean_height() <= 0.0 {
            return 0.0;
        }
        // a line above its predecessor (column or page jump) clamps to 0
        let gap = line.bounds().top() - prev.bounds().bottom();
        (gap / block.mean_height()).clamp(0.0, MAX_LINE_SPACING)
    }
}

/// 1 if the line opens with a number, optionally bracketed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineStartsWithNumber;

impl FeatureCalculator<BlockLine, ReferenceBlock> for LineStartsWithNumber {
    fn name(&self) -> &str {
        "starts_with_number"
    }

    fn calculate(&self, line: &BlockLine, _block: &ReferenceBlock) -> f64 {
        if starts_with_number(line.text()) {
            1.0
        } else {
            0.0
        }
    }
}

/// The five reference line features, in a fixed order.
pub fn default_reference_features(
    relative_start_threshold: f64,
) -> FeatureVectorBuilder<BlockLine, ReferenceBlock> {
    FeatureVectorBuilder::new()
        .with_calculator(PrevEndsWithDot)
        .with_calculator(PrevRelativeLength)
        .with_calculator(RelativeStartThreshold::new(relative_start_threshold))
        .with_calculator(SpaceBetweenLines)
        .with_calculator(LineStartsWithNumber)
}
