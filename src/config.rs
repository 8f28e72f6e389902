//! Configuration for the structure recovery pipeline.
//!
//! Every stage has its own config struct; [`PipelineConfig`] aggregates them.
//! All structs deserialize with per-field defaults, so a JSON config file only
//! needs to name the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// XY-cut segmentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Minimum valley length, as a fraction of the page height, for a cut.
    pub threshold_ratio: f64,

    /// Leave a malformed page unsegmented instead of failing its document.
    pub skip_malformed_pages: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.025,
            skip_malformed_pages: false,
        }
    }
}

impl SegmentationConfig {
    /// Set the cut threshold ratio.
    pub fn with_threshold_ratio(mut self, ratio: f64) -> Self {
        self.threshold_ratio = ratio;
        self
    }

    /// Keep going past malformed pages.
    pub fn with_skip_malformed_pages(mut self, skip: bool) -> Self {
        self.skip_malformed_pages = skip;
        self
    }
}

/// Line and word grouping tolerances used when turning zone chunks into lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Minimum vertical overlap, relative to the smaller chunk height, for two
    /// chunks to share a line.
    pub line_overlap_ratio: f64,

    /// Horizontal gap, relative to the average chunk height of the line, above
    /// which a new word starts.
    pub word_gap_ratio: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            line_overlap_ratio: 0.5,
            word_gap_ratio: 0.25,
        }
    }
}

impl AssemblyConfig {
    /// Set the line overlap ratio.
    pub fn with_line_overlap_ratio(mut self, ratio: f64) -> Self {
        self.line_overlap_ratio = ratio;
        self
    }

    /// Set the word gap ratio.
    pub fn with_word_gap_ratio(mut self, ratio: f64) -> Self {
        self.word_gap_ratio = ratio;
        self
    }
}

/// Reference splitting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Reference blocks are truncated to this many lines.
    pub max_lines: usize,

    /// More references than this yields an empty result.
    pub max_references: usize,

    /// Below this maximum distance from the first line the block is treated
    /// as homogeneous and every line becomes one reference.
    pub homogeneity_epsilon: f64,

    /// Fraction of the block width a line must be indented by to count as
    /// starting beyond the threshold.
    pub relative_start_threshold: f64,

    /// Upper bound on k-means reassignment rounds.
    pub max_iterations: usize,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            max_lines: 10_000,
            max_references: 1_000,
            homogeneity_epsilon: 1e-3,
            relative_start_threshold: 0.1,
            max_iterations: 100,
        }
    }
}

impl ReferenceConfig {
    /// Set the line cap.
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Set the reference cap.
    pub fn with_max_references(mut self, max_references: usize) -> Self {
        self.max_references = max_references;
        self
    }

    /// Set the homogeneity epsilon.
    pub fn with_homogeneity_epsilon(mut self, epsilon: f64) -> Self {
        self.homogeneity_epsilon = epsilon;
        self
    }

    /// Set the relative start threshold.
    pub fn with_relative_start_threshold(mut self, threshold: f64) -> Self {
        self.relative_start_threshold = threshold;
        self
    }

    /// Set the k-means iteration bound.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// How zone feature vectors are handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// One query per zone (SVM style)
    #[default]
    Independent,
    /// One query per document with page boundaries marked (HMM style)
    Sequential,
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// XY-cut settings
    pub segmentation: SegmentationConfig,
    /// Line/word grouping settings
    pub assembly: AssemblyConfig,
    /// Reference splitting settings
    pub references: ReferenceConfig,
    /// Zone classification mode
    pub classification_mode: ClassificationMode,
}

impl PipelineConfig {
    /// Create configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the segmentation settings.
    pub fn with_segmentation(mut self, segmentation: SegmentationConfig) -> Self {
        self.segmentation = segmentation;
        self
    }

    /// Replace the assembly settings.
    pub fn with_assembly(mut self, assembly: AssemblyConfig) -> Self {
        self.assembly = assembly;
        self
    }

    /// Replace the reference splitting settings.
    pub fn with_references(mut self, references: ReferenceConfig) -> Self {
        self.references = references;
        self
    }

    /// Set the classification mode.
    pub fn with_classification_mode(mut self, mode: ClassificationMode) -> Self {
        self.classification_mode = mode;
        self
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Json`] if it
    /// is not valid JSON for this struct, and [`Error::Config`] if a value is
    /// out of range.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        log::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Check that every ratio is finite and non-negative and every cap is positive.
    pub fn validate(&self) -> Result<()> {
        check_ratio("segmentation.threshold_ratio", self.segmentation.threshold_ratio)?;
        check_ratio("assembly.line_overlap_ratio", self.assembly.line_overlap_ratio)?;
        check_ratio("assembly.word_gap_ratio", self.assembly.word_gap_ratio)?;
        check_ratio("references.homogeneity_epsilon", self.references.homogeneity_epsilon)?;
        check_ratio(
            "references.relative_start_threshold",
            self.references.relative_start_threshold,
        )?;
        if self.references.max_iterations == 0 {
            return Err(Error::Config("references.max_iterations must be positive".to_string()));
        }
        Ok(())
    }
}

fn check_ratio(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Config(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )));
    }
    Ok(())
}
