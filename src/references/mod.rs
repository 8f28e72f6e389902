//! Splitting a bibliography into individual references.
//!
//! The lines of the zones labelled as references are clustered into two
//! groups, entry-start lines and continuation lines, by 2-means over line
//! features. The cluster holding the first line is taken as the start lines;
//! every start line opens a new reference and continuation lines are appended
//! to it.
//!
//! Two caps guard against pathological input: blocks are truncated to
//! `max_lines` lines, and more than `max_references` results yields an empty
//! list. Both are policies, not errors.

mod block;
mod kmeans;

pub use block::{BlockLine, ReferenceBlock};
pub use kmeans::{Clustering, KMeans};

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ReferenceConfig;
use crate::error::{Error, Result};
use crate::features::reference::default_reference_features;
use crate::features::{DistanceMetric, EuclideanMetric, FeatureVector, FeatureVectorBuilder};
use crate::model::Document;

lazy_static! {
    static ref RE_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    static ref RE_LETTER: Regex = Regex::new(r"[a-zA-Z]").unwrap();
}

/// Extracts reference strings from a classified document.
pub trait ReferenceExtractor: Send + Sync {
    /// Reference strings in document order.
    fn extract_references(&self, document: &Document) -> Result<Vec<String>>;

    /// Get the strategy name for debugging.
    fn name(&self) -> &'static str;
}

/// Reference splitter clustering line feature vectors with 2-means.
pub struct KMeansReferenceExtractor {
    config: ReferenceConfig,
    builder: FeatureVectorBuilder<BlockLine, ReferenceBlock>,
    metric: EuclideanMetric,
}

impl Default for KMeansReferenceExtractor {
    fn default() -> Self {
        Self::new(ReferenceConfig::default())
    }
}

impl std::fmt::Debug for KMeansReferenceExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansReferenceExtractor")
            .field("config", &self.config)
            .field("features", &self.builder.feature_names())
            .finish()
    }
}

impl KMeansReferenceExtractor {
    /// Create an extractor with the standard line features.
    pub fn new(config: ReferenceConfig) -> Self {
        let builder = default_reference_features(config.relative_start_threshold);
        Self {
            config,
            builder,
            metric: EuclideanMetric,
        }
    }

    /// Replace the line feature set.
    pub fn with_features(mut self, builder: FeatureVectorBuilder<BlockLine, ReferenceBlock>) -> Self {
        self.builder = builder;
        self
    }

    /// Split the lines of `block` into references.
    pub fn extract_from_block(&self, block: &ReferenceBlock) -> Result<Vec<String>> {
        let truncated;
        let block = if block.len() > self.config.max_lines {
            log::warn!(
                "Reference block has {} lines, keeping the first {}",
                block.len(),
                self.config.max_lines
            );
            truncated = ReferenceBlock::new(
                block.lines()[..self.config.max_lines]
                    .iter()
                    .map(|l| (l.text().to_string(), l.bounds()))
                    .collect(),
            );
            &truncated
        } else {
            block
        };

        let vectors: Vec<FeatureVector> = block
            .lines()
            .iter()
            .map(|line| self.builder.build(line, block))
            .collect();
        self.split_vectors(&block.texts(), &vectors)
    }

    /// Split lines given their texts and precomputed feature vectors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the two lists differ in length and
    /// [`Error::InvalidFeatureSet`] if the vectors do not share one feature set.
    pub fn split_vectors(&self, texts: &[String], vectors: &[FeatureVector]) -> Result<Vec<String>> {
        if texts.len() != vectors.len() {
            return Err(Error::MalformedInput(format!(
                "{} reference lines but {} feature vectors",
                texts.len(),
                vectors.len()
            )));
        }

        let first = match vectors.first() {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };

        let mut farthest = 0;
        let mut farthest_distance = 0.0;
        for (i, vector) in vectors.iter().enumerate() {
            let distance = self.metric.distance(first, vector)?;
            if distance > farthest_distance {
                farthest = i;
                farthest_distance = distance;
            }
        }

        if texts.len() <= 1 || farthest_distance < self.config.homogeneity_epsilon {
            log::debug!(
                "Reference block of {} lines is homogeneous, one reference per line",
                texts.len()
            );
            return Ok(self.capped(texts.to_vec()));
        }

        let clustering = KMeans::with_metric(self.metric, self.config.max_iterations)
            .cluster(vectors, vec![first.clone(), vectors[farthest].clone()])?;
        let start_cluster = clustering.assignments[0];
        let starts: Vec<bool> = clustering
            .assignments
            .iter()
            .map(|&c| c == start_cluster)
            .collect();

        Ok(self.assemble_references(texts, &starts))
    }

    /// Join lines into references: each line flagged in `starts` opens a new
    /// reference, other lines are appended with a space. A reference without
    /// both a digit and an ASCII letter is dropped.
    pub fn assemble_references(&self, texts: &[String], starts: &[bool]) -> Vec<String> {
        let mut references = Vec::new();
        let mut current = String::new();
        for (text, &is_start) in texts.iter().zip(starts) {
            if is_start {
                flush(&mut references, std::mem::take(&mut current));
                current.push_str(text);
            } else {
                current.push(' ');
                current.push_str(text);
            }
        }
        flush(&mut references, current);

        log::debug!(
            "Assembled {} references from {} lines",
            references.len(),
            texts.len()
        );
        self.capped(references)
    }

    fn capped(&self, references: Vec<String>) -> Vec<String> {
        if references.len() > self.config.max_references {
            log::warn!(
                "{} references exceed the limit of {}, discarding all",
                references.len(),
                self.config.max_references
            );
            return Vec::new();
        }
        references
    }
}

fn flush(references: &mut Vec<String>, reference: String) {
    if !reference.is_empty() && RE_DIGIT.is_match(&reference) && RE_LETTER.is_match(&reference) {
        references.push(reference);
    }
}

impl ReferenceExtractor for KMeansReferenceExtractor {
    fn extract_references(&self, document: &Document) -> Result<Vec<String>> {
        let block = ReferenceBlock::from_document(document, self.config.max_lines);
        let references = self.extract_from_block(&block)?;
        log::info!(
            "Extracted {} references from {} lines",
            references.len(),
            block.len()
        );
        Ok(references)
    }

    fn name(&self) -> &'static str {
        "KMeans"
    }
}
