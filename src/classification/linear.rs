//! One-vs-rest linear zone model loaded from JSON.
//!
//! The file lists the feature names the weights were trained against and one
//! weight row per label:
//!
//! ```json
//! {
//!   "features": ["is_first_page", "relative_y"],
//!   "classes": [
//!     { "label": "title", "bias": 0.5, "weights": [2.0, -3.0] },
//!     { "label": "body",  "bias": 0.0, "weights": [-1.0, 1.0] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{LabelPrediction, ZoneModel};
use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::model::{LabelDistribution, ZoneLabel};

/// Decision function of one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClass {
    /// Label this row scores
    pub label: ZoneLabel,
    /// Intercept
    #[serde(default)]
    pub bias: f64,
    /// One weight per model feature
    pub weights: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LinearModelFile {
    features: Vec<String>,
    classes: Vec<LinearClass>,
}

/// Linear model: the label with the highest decision value wins, softmax over
/// the decision values gives the distribution.
#[derive(Debug, Clone)]
pub struct LinearZoneModel {
    features: Vec<String>,
    classes: Vec<LinearClass>,
}

impl LinearZoneModel {
    /// Build a model from feature names and class rows.
    ///
    /// # Errors
    ///
    /// [`Error::ModelUnavailable`] if there is no class or a weight row does
    /// not have one weight per feature.
    pub fn new(features: Vec<String>, classes: Vec<LinearClass>) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::ModelUnavailable("model has no classes".to_string()));
        }
        if let Some(bad) = classes.iter().find(|c| c.weights.len() != features.len()) {
            return Err(Error::ModelUnavailable(format!(
                "class '{}' has {} weights for {} features",
                bad.label,
                bad.weights.len(),
                features.len()
            )));
        }
        Ok(Self { features, classes })
    }

    /// Parse a model from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: LinearModelFile = serde_json::from_str(json)
            .map_err(|e| Error::ModelUnavailable(format!("Failed to parse zone model: {}", e)))?;
        Self::new(file.features, file.classes)
    }

    /// Load a model file.
    ///
    /// # Errors
    ///
    /// [`Error::ModelUnavailable`] if the file is missing, unreadable or not a
    /// valid model.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ModelUnavailable(format!(
                "Model file not found: {}",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::ModelUnavailable(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let model = Self::from_json_str(&json)?;
        log::info!(
            "Loaded zone model from {} ({} features, {} labels)",
            path.display(),
            model.features.len(),
            model.classes.len()
        );
        Ok(model)
    }

    /// Feature names the weights expect, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.features
    }

    /// Labels the model can predict.
    pub fn labels(&self) -> impl Iterator<Item = ZoneLabel> + '_ {
        self.classes.iter().map(|c| c.label)
    }

    /// Decision value of every class, in class order.
    pub fn decision_values(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        if features.len() != self.features.len()
            || !features.names().eq(self.features.iter().map(String::as_str))
        {
            return Err(Error::feature_mismatch(
                self.features.iter().map(String::as_str),
                features.names(),
            ));
        }
        Ok(self
            .classes
            .iter()
            .map(|c| {
                c.bias
                    + c.weights
                        .iter()
                        .zip(features.values())
                        .map(|(w, x)| w * x)
                        .sum::<f64>()
            })
            .collect())
    }
}

impl ZoneModel for LinearZoneModel {
    fn classify(&self, features: &FeatureVector) -> Result<LabelPrediction> {
        let scores = self.decision_values(features)?;

        // first maximum wins
        let mut best = 0;
        for (i, &s) in scores.iter().enumerate() {
            if s > scores[best] {
                best = i;
            }
        }

        let max = scores[best];
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        let mut distribution = LabelDistribution::new();
        for (class, e) in self.classes.iter().zip(exps) {
            *distribution.entry(class.label).or_insert(0.0) += e / total;
        }

        Ok(LabelPrediction {
            label: self.classes[best].label,
            distribution: Some(distribution),
        })
    }

    fn name(&self) -> &str {
        "linear"
    }
}
