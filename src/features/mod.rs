//! Feature vectors for statistical classification.
//!
//! A [`FeatureCalculator`] scores one entity against a context and has a
//! stable name. A [`FeatureVectorBuilder`] evaluates an ordered list of
//! calculators into a [`FeatureVector`]. Vectors are only comparable when
//! they were built by the same calculator list, which [`DistanceMetric`]
//! implementations check.
//!
//! Calculator sets live in [`zone`] (zone classification) and [`reference`]
//! (reference line clustering).

pub mod reference;
pub mod zone;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scores an entity of type `E` in a context of type `C`.
pub trait FeatureCalculator<E, C>: Send + Sync {
    /// Stable feature name, used as the key in the feature vector.
    fn name(&self) -> &str;

    /// Compute the feature value.
    fn calculate(&self, entity: &E, context: &C) -> f64;
}

/// Ordered mapping from feature name to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: IndexMap<String, f64>,
}

impl FeatureVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a feature value. Re-inserting a name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Value of the named feature.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Feature names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Feature values in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no features.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether both vectors carry the same feature names in the same order.
    pub fn same_features(&self, other: &FeatureVector) -> bool {
        self.len() == other.len() && self.names().eq(other.names())
    }

    /// Fail with [`Error::InvalidFeatureSet`] unless both vectors share a feature set.
    pub fn check_compatible(&self, other: &FeatureVector) -> Result<()> {
        if self.same_features(other) {
            Ok(())
        } else {
            Err(Error::feature_mismatch(self.names(), other.names()))
        }
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(name, value)| format!("{}={:.3}", name, value))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl FromIterator<(String, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Evaluates an ordered list of calculators.
pub struct FeatureVectorBuilder<E, C> {
    calculators: Vec<Box<dyn FeatureCalculator<E, C>>>,
}

impl<E, C> Default for FeatureVectorBuilder<E, C> {
    fn default() -> Self {
        Self {
            calculators: Vec::new(),
        }
    }
}

impl<E, C> fmt::Debug for FeatureVectorBuilder<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureVectorBuilder")
            .field("features", &self.feature_names())
            .finish()
    }
}

impl<E, C> FeatureVectorBuilder<E, C> {
    /// Create a builder without calculators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a calculator (builder style).
    pub fn with_calculator<F>(mut self, calculator: F) -> Self
    where
        F: FeatureCalculator<E, C> + 'static,
    {
        self.calculators.push(Box::new(calculator));
        self
    }

    /// Append a boxed calculator.
    pub fn push(&mut self, calculator: Box<dyn FeatureCalculator<E, C>>) {
        self.calculators.push(calculator);
    }

    /// Names of the configured features, in evaluation order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.calculators.iter().map(|c| c.name()).collect()
    }

    /// Number of configured features.
    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    /// Whether no calculator is configured.
    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    /// Evaluate every calculator, in order, for `entity` in `context`.
    pub fn build(&self, entity: &E, context: &C) -> FeatureVector {
        let mut vector = FeatureVector::new();
        for calculator in &self.calculators {
            vector.insert(calculator.name(), calculator.calculate(entity, context));
        }
        vector
    }
}

/// Distance between two feature vectors.
pub trait DistanceMetric: Send + Sync {
    /// Compute the distance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFeatureSet`] if the vectors were not built with
    /// the same feature list.
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64>;
}

/// Euclidean distance over feature values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanMetric;

impl DistanceMetric for EuclideanMetric {
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
        a.check_compatible(b)?;
        let sum: f64 = a.values().zip(b.values()).map(|(x, y)| (x - y) * (x - y)).sum();
        Ok(sum.sqrt())
    }
}
