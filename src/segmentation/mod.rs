//! Page segmentation: raw chunks → zones.
//!
//! [`XYCutSegmenter`] partitions each page's chunks by recursive whitespace
//! cuts built on the range/valley utilities in [`ranges`], then
//! [`ZoneAssembler`] groups the chunks of every resulting zone into lines and
//! words.

mod assembly;
pub mod ranges;
mod xycut;

pub use assembly::ZoneAssembler;
pub use ranges::{max_valley, to_ranges, to_valleys, Axis, Range, Valley};
pub use xycut::{XYCutSegmenter, ZoneCut};

use crate::error::{Error, Result};
use crate::model::{Document, Page};

/// A page left unsegmented because it failed validation.
#[derive(Debug)]
pub struct PageFailure {
    /// Index of the page within its document
    pub page: usize,
    /// Why the page was rejected
    pub error: Error,
}

/// Segmentation strategy over a whole document.
pub trait DocumentSegmenter: Send + Sync {
    /// Replace the raw chunks of one page with zones.
    fn segment_page(&self, page: &mut Page) -> Result<()>;

    /// Replace the raw chunks of every page with zones.
    ///
    /// Every page is validated before any page is touched, so on error the
    /// document is left exactly as it was.
    fn segment_document(&self, document: &mut Document) -> Result<()> {
        for page in document.pages() {
            page.validate()?;
        }
        for page in document.pages_mut() {
            self.segment_page(page)?;
        }
        Ok(())
    }

    /// Segment every page independently.
    ///
    /// A page that fails keeps its raw chunks and is reported; the other
    /// pages are segmented as usual.
    fn segment_pages(&self, document: &mut Document) -> Vec<PageFailure> {
        let mut failures = Vec::new();
        for page in document.pages_mut() {
            if let Err(error) = self.segment_page(page) {
                log::warn!("Skipping page {}: {}", page.index(), error);
                failures.push(PageFailure {
                    page: page.index(),
                    error,
                });
            }
        }
        failures
    }

    /// Get the strategy name for debugging.
    fn name(&self) -> &'static str;
}
