// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # Zone Oxide
//!
//! Logical structure recovery for extracted document glyphs.
//!
//! Takes the flat, positioned glyph chunks an external character extractor
//! produces for every page and turns them into a labelled hierarchy
//! (pages → zones → lines → words → chunks):
//!
//! ```text
//! positioned chunks (per page)
//!     ↓
//! [XYCutSegmenter]          recursive whitespace cuts → zones
//!     ↓
//! [ZoneAssembler]           zone chunks → lines → words
//!     ↓
//! [HierarchicalReadingOrder] zones, lines, words in reading order
//!     ↓
//! [ZoneClassifier]          feature vectors → external model → labels
//!     ↓
//! [KMeansReferenceExtractor] "references" lines → individual entries
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use zone_oxide::pipeline::Pipeline;
//! use zone_oxide::config::PipelineConfig;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default());
//! let document = pipeline.structure(document)?;
//! println!("{}", document.text());
//! ```
//!
//! Model training, glyph extraction from a concrete file format and output
//! serialization are left to the caller; see [`pipeline::CharacterExtractor`]
//! and [`classification::ZoneModel`] for the collaborator seams.

#![warn(missing_docs)]

pub mod error;

pub mod config;
pub mod geometry;
pub mod model;

pub mod segmentation;

pub mod reading_order;

pub mod features;

pub mod classification;

pub mod references;

pub mod pipeline;

pub use config::{ClassificationMode, PipelineConfig};
pub use error::{Error, Result};
pub use geometry::Rect;
pub use model::{Chunk, Document, Line, Page, Word, Zone, ZoneLabel};

pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all other values.
    /// This ensures that sorting operations never panic due to NaN comparisons.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// # use std::cmp::Ordering;
    /// # use zone_oxide::utils::safe_float_cmp;
    /// assert_eq!(safe_float_cmp(1.0, 2.0), Ordering::Less);
    /// assert_eq!(safe_float_cmp(f64::NAN, 1.0), Ordering::Greater);
    /// ```
    #[inline]
    pub fn safe_float_cmp(a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater, // NaN > all numbers
            (false, true) => Ordering::Less,    // all numbers < NaN
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
