//! Structure recovery pipeline with pluggable stages.
//!
//! ```text
//! Document (pages of raw chunks)
//!     ↓
//! [DocumentSegmenter]      chunks → zones → lines → words
//!     ↓
//! [ReadingOrderResolver]   zones, lines, words reordered
//!     ↓
//! [ZoneClassifier]         zone labels (needs a model)
//!     ↓
//! [ReferenceExtractor]     reference strings
//! ```
//!
//! Stages run strictly in sequence for one document. Concurrency across
//! documents lives in [`BatchProcessor`].

mod batch;
mod extractor;

pub use batch::BatchProcessor;
pub use extractor::{CharacterExtractor, JsonCharacterExtractor};

use std::sync::Arc;

use crate::classification::{ZoneClassifier, ZoneModel};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::Document;
use crate::reading_order::{HierarchicalReadingOrder, ReadingOrderResolver};
use crate::references::{KMeansReferenceExtractor, ReferenceExtractor};
use crate::segmentation::{DocumentSegmenter, PageFailure, XYCutSegmenter};

/// Output of a full pipeline run.
#[derive(Debug)]
pub struct ProcessedDocument {
    /// Segmented, ordered and (with a model) labelled document
    pub document: Document,
    /// Reference strings, empty when no zone is labelled as references
    pub references: Vec<String>,
    /// Pages left unsegmented; only filled when malformed pages are skipped
    pub failed_pages: Vec<PageFailure>,
}

/// The structure recovery pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    segmenter: Box<dyn DocumentSegmenter>,
    resolver: Box<dyn ReadingOrderResolver>,
    classifier: ZoneClassifier,
    reference_extractor: Box<dyn ReferenceExtractor>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("segmenter", &self.segmenter.name())
            .field("resolver", &self.resolver.name())
            .field("classifier", &self.classifier)
            .field("reference_extractor", &self.reference_extractor.name())
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    /// Create a pipeline with the default stages configured from `config`.
    ///
    /// No zone model is attached; call [`Pipeline::with_model`] before
    /// classifying.
    pub fn new(config: PipelineConfig) -> Self {
        let segmenter = XYCutSegmenter::new(&config.segmentation, &config.assembly);
        let classifier = ZoneClassifier::new(config.classification_mode);
        let reference_extractor = KMeansReferenceExtractor::new(config.references.clone());
        Self {
            config,
            segmenter: Box::new(segmenter),
            resolver: Box::new(HierarchicalReadingOrder::new()),
            classifier,
            reference_extractor: Box::new(reference_extractor),
        }
    }

    /// Attach the zone model.
    pub fn with_model(mut self, model: Arc<dyn ZoneModel>) -> Self {
        self.classifier = self.classifier.with_model(model);
        self
    }

    /// Replace the zone classifier.
    pub fn with_classifier(mut self, classifier: ZoneClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the segmentation stage.
    pub fn with_segmenter(mut self, segmenter: Box<dyn DocumentSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Replace the reading order stage.
    pub fn with_reading_order(mut self, resolver: Box<dyn ReadingOrderResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the reference splitting stage.
    pub fn with_reference_extractor(mut self, extractor: Box<dyn ReferenceExtractor>) -> Self {
        self.reference_extractor = extractor;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether classification can run.
    pub fn has_model(&self) -> bool {
        self.classifier.has_model()
    }

    /// Segment every page and put the result in reading order.
    ///
    /// A malformed page fails the document unless
    /// [`SegmentationConfig::skip_malformed_pages`](crate::config::SegmentationConfig)
    /// is set, in which case the page keeps its raw chunks.
    pub fn structure(&self, document: Document) -> Result<Document> {
        self.structure_pages(document).map(|(document, _)| document)
    }

    /// Like [`Pipeline::structure`], also returning the pages that were
    /// skipped.
    pub fn structure_pages(&self, mut document: Document) -> Result<(Document, Vec<PageFailure>)> {
        let failures = if self.config.segmentation.skip_malformed_pages {
            self.segmenter.segment_pages(&mut document)
        } else {
            self.segmenter.segment_document(&mut document)?;
            Vec::new()
        };
        Ok((self.resolver.resolve(document)?, failures))
    }

    /// Label the zones of a structured document.
    pub fn classify(&self, mut document: Document) -> Result<Document> {
        self.classifier.classify_document(&mut document)?;
        Ok(document)
    }

    /// Split the reference zones of a classified document.
    pub fn extract_references(&self, document: &Document) -> Result<Vec<String>> {
        self.reference_extractor.extract_references(document)
    }

    /// Plain text in reading order, without classification.
    pub fn extract_text(&self, document: Document) -> Result<String> {
        let document = self.structure(document)?;
        Ok(document.text().to_string())
    }

    /// Run every stage.
    ///
    /// # Errors
    ///
    /// Fails the whole document on the first stage error, including a missing
    /// model. Use [`Pipeline::structure`] for model-free processing.
    pub fn process(&self, document: Document) -> Result<ProcessedDocument> {
        let (document, failed_pages) = self.structure_pages(document)?;
        let document = self.classify(document)?;
        let references = self.extract_references(&document)?;
        log::info!(
            "Processed document: {} pages, {} zones, {} references",
            document.pages().len(),
            document.zones().count(),
            references.len()
        );
        Ok(ProcessedDocument {
            document,
            references,
            failed_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::LabelPrediction;
    use crate::config::SegmentationConfig;
    use crate::error::Error;
    use crate::features::FeatureVector;
    use crate::geometry::Rect;
    use crate::model::{Chunk, Page, ZoneLabel};

    struct AlwaysModel(ZoneLabel);

    impl ZoneModel for AlwaysModel {
        fn classify(&self, _features: &FeatureVector) -> Result<LabelPrediction> {
            Ok(LabelPrediction::new(self.0))
        }

        fn name(&self) -> &str {
            "always"
        }
    }

    fn two_column_document() -> Document {
        let chunks = vec![
            Chunk::new(Rect::new(320.0, 100.0, 40.0, 10.0), "right"),
            Chunk::new(Rect::new(20.0, 100.0, 40.0, 10.0), "left"),
            Chunk::new(Rect::new(20.0, 20.0, 80.0, 10.0), "Title"),
        ];
        Document::from_pages(vec![
            Page::new(0, Rect::new(0.0, 0.0, 400.0, 400.0)).with_chunks(chunks)
        ])
    }

    #[test]
    fn test_extract_text_reading_order() {
        let text = Pipeline::default()
            .extract_text(two_column_document())
            .unwrap();
        assert_eq!(text, "Title\nleft\nright");
    }

    #[test]
    fn test_process_without_model_fails() {
        let result = Pipeline::default().process(two_column_document());
        assert!(matches!(result, Err(Error::ModelUnavailable(_))));
    }

    #[test]
    fn test_process_with_model() {
        let pipeline = Pipeline::default().with_model(Arc::new(AlwaysModel(ZoneLabel::Body)));
        assert!(pipeline.has_model());
        let processed = pipeline.process(two_column_document()).unwrap();
        assert_eq!(processed.document.zones().count(), 3);
        assert!(processed
            .document
            .zones()
            .all(|z| z.label() == Some(ZoneLabel::Body)));
        assert!(processed.references.is_empty());
    }

    #[test]
    fn test_malformed_page() {
        let doc = Document::from_pages(vec![Page::new(0, Rect::new(0.0, 0.0, -1.0, 10.0))
            .with_chunks(vec![Chunk::new(Rect::new(0.0, 0.0, 1.0, 1.0), "x")])]);
        assert!(matches!(
            Pipeline::default().structure(doc),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_skip_malformed_pages_keeps_good_pages() {
        let good = two_column_document().pages()[0].clone();
        let bad = Page::new(1, Rect::new(0.0, 0.0, 400.0, 400.0))
            .with_chunks(vec![Chunk::new(Rect::new(0.0, 0.0, -5.0, 10.0), "Bad")]);
        let doc = Document::from_pages(vec![good, bad]);

        assert!(Pipeline::default().structure(doc.clone()).is_err());

        let config = PipelineConfig::default()
            .with_segmentation(SegmentationConfig::default().with_skip_malformed_pages(true));
        let pipeline = Pipeline::new(config).with_model(Arc::new(AlwaysModel(ZoneLabel::Body)));
        let processed = pipeline.process(doc).unwrap();
        assert_eq!(processed.document.pages()[0].zones().len(), 3);
        assert_eq!(processed.document.pages()[1].chunks().len(), 1);
        assert_eq!(processed.failed_pages.len(), 1);
        assert_eq!(processed.failed_pages[0].page, 1);
        assert!(matches!(
            processed.failed_pages[0].error,
            Error::MalformedInput(_)
        ));
    }
}
