//! Zone classification.
//!
//! [`ZoneClassifier`] builds a feature vector for every zone against its
//! page and hands the vectors to an injected [`ZoneModel`]:
//!
//! - [`ClassificationMode::Independent`]: one [`ZoneModel::classify`] call
//!   per zone.
//! - [`ClassificationMode::Sequential`]: one
//!   [`ZoneModel::classify_sequence`] call per document, with the first zone
//!   of every page flagged as starting a sequence. Decoding is up to the model.
//!
//! Labels are written only after the model has answered for every zone, so
//! a failing document is left entirely unlabelled.

mod linear;
mod training;

pub use linear::{LinearClass, LinearZoneModel};
pub use training::{hmm_training_samples, HmmTrainingSample};

use std::sync::Arc;

use crate::config::ClassificationMode;
use crate::error::{Error, Result};
use crate::features::zone::{default_zone_features, PageContext};
use crate::features::{FeatureVector, FeatureVectorBuilder};
use crate::model::{Document, LabelDistribution, Zone, ZoneLabel};

/// A model's answer for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPrediction {
    /// Most likely label
    pub label: ZoneLabel,
    /// Probability of every candidate label, if the model reports one
    pub distribution: Option<LabelDistribution>,
}

impl LabelPrediction {
    /// A prediction without a distribution.
    pub fn new(label: ZoneLabel) -> Self {
        Self {
            label,
            distribution: None,
        }
    }
}

/// One element of the zone sequence handed to a sequence model.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceObservation {
    /// Features of the zone
    pub features: FeatureVector,
    /// Whether the zone opens a new page
    pub starts_sequence: bool,
}

/// Statistical zone model.
pub trait ZoneModel: Send + Sync {
    /// Label one zone from its features.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFeatureSet`] if the features are not the ones the model
    /// was trained on, [`Error::ModelUnavailable`] if the model cannot answer.
    fn classify(&self, features: &FeatureVector) -> Result<LabelPrediction>;

    /// Label a whole zone sequence jointly.
    ///
    /// The default labels every observation independently.
    fn classify_sequence(&self, observations: &[SequenceObservation]) -> Result<Vec<ZoneLabel>> {
        observations
            .iter()
            .map(|o| self.classify(&o.features).map(|p| p.label))
            .collect()
    }

    /// Get the model name for debugging.
    fn name(&self) -> &str;
}

/// Labels the zones of a document with an injected model.
pub struct ZoneClassifier {
    model: Option<Arc<dyn ZoneModel>>,
    builder: FeatureVectorBuilder<Zone, PageContext>,
    mode: ClassificationMode,
}

impl std::fmt::Debug for ZoneClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneClassifier")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("features", &self.builder.feature_names())
            .field("mode", &self.mode)
            .finish()
    }
}

impl ZoneClassifier {
    /// Create a classifier with the standard zone features and no model.
    pub fn new(mode: ClassificationMode) -> Self {
        Self {
            model: None,
            builder: default_zone_features(),
            mode,
        }
    }

    /// Attach the model.
    pub fn with_model(mut self, model: Arc<dyn ZoneModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Replace the zone feature set.
    pub fn with_features(mut self, builder: FeatureVectorBuilder<Zone, PageContext>) -> Self {
        self.builder = builder;
        self
    }

    /// Whether a model is attached.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Classification mode.
    pub fn mode(&self) -> ClassificationMode {
        self.mode
    }

    /// Feature vectors of every zone in page/zone order, with the first zone
    /// of each page flagged as starting a sequence.
    pub fn observations(&self, document: &Document) -> Vec<SequenceObservation> {
        let page_count = document.pages().len();
        let mut observations = Vec::new();
        for page in document.pages() {
            let context = PageContext::new(page, page_count);
            for (i, zone) in page.zones().iter().enumerate() {
                observations.push(SequenceObservation {
                    features: self.builder.build(zone, &context),
                    starts_sequence: i == 0,
                });
            }
        }
        observations
    }

    /// Label every zone of `document`.
    ///
    /// # Errors
    ///
    /// [`Error::ModelUnavailable`] without a model; model errors are passed
    /// through; a sequence answer of the wrong length is
    /// [`Error::Classification`]. On error no zone is labelled.
    pub fn classify_document(&self, document: &mut Document) -> Result<()> {
        let model = self.model.as_ref().ok_or_else(|| {
            Error::ModelUnavailable("no zone model configured".to_string())
        })?;

        let observations = self.observations(document);
        let predictions: Vec<LabelPrediction> = match self.mode {
            ClassificationMode::Independent => observations
                .iter()
                .map(|o| model.classify(&o.features))
                .collect::<Result<_>>()?,
            ClassificationMode::Sequential => {
                let labels = model.classify_sequence(&observations)?;
                if labels.len() != observations.len() {
                    return Err(Error::Classification(format!(
                        "model '{}' returned {} labels for {} zones",
                        model.name(),
                        labels.len(),
                        observations.len()
                    )));
                }
                labels.into_iter().map(LabelPrediction::new).collect()
            },
        };

        let mut predictions = predictions.into_iter();
        for page in document.pages_mut() {
            for zone in page.zones_mut() {
                if let Some(prediction) = predictions.next() {
                    zone.set_label(prediction.label);
                    zone.set_distribution(prediction.distribution);
                }
            }
        }

        log::info!(
            "Classified {} zones with '{}' ({:?})",
            observations.len(),
            model.name(),
            self.mode
        );
        Ok(())
    }
}
