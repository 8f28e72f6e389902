//! Training samples for sequence zone models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::zone::PageContext;
use crate::features::{FeatureVector, FeatureVectorBuilder};
use crate::model::{Document, Zone, ZoneLabel};

/// One labelled zone with its successor's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmTrainingSample {
    /// Zone features
    pub features: FeatureVector,
    /// Label of the zone, after remapping
    pub label: Option<ZoneLabel>,
    /// Label of the next zone in the document, after remapping
    pub next_label: Option<ZoneLabel>,
    /// Whether the zone is the first of its document
    pub starts_sequence: bool,
}

/// Build one sample per zone, in document order.
///
/// Successor labels cross page boundaries but not documents. When
/// `label_map` is given, labels found in it are replaced by their mapping.
pub fn hmm_training_samples(
    documents: &[Document],
    builder: &FeatureVectorBuilder<Zone, PageContext>,
    label_map: Option<&HashMap<ZoneLabel, ZoneLabel>>,
) -> Vec<HmmTrainingSample> {
    let remap = |label: Option<ZoneLabel>| {
        label.map(|l| label_map.and_then(|m| m.get(&l)).copied().unwrap_or(l))
    };

    let mut samples = Vec::new();
    for document in documents {
        let first = samples.len();
        let page_count = document.pages().len();
        for page in document.pages() {
            let context = PageContext::new(page, page_count);
            for zone in page.zones() {
                samples.push(HmmTrainingSample {
                    features: builder.build(zone, &context),
                    label: remap(zone.label()),
                    next_label: None,
                    starts_sequence: samples.len() == first,
                });
            }
        }

        for i in first + 1..samples.len() {
            samples[i - 1].next_label = samples[i].label;
        }
    }

    log::debug!(
        "Prepared {} training samples from {} documents",
        samples.len(),
        documents.len()
    );
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::zone::default_zone_features;
    use crate::geometry::Rect;
    use crate::model::{Chunk, Line, Page, Word};

    fn zone(label: ZoneLabel) -> Zone {
        Zone::from_lines(vec![Line::from_words(vec![Word::from_chunks(vec![
            Chunk::new(Rect::new(0.0, 0.0, 10.0, 10.0), "x"),
        ])])])
        .with_label(label)
    }

    fn document(pages: Vec<Vec<ZoneLabel>>) -> Document {
        Document::from_pages(
            pages
                .into_iter()
                .enumerate()
                .map(|(i, labels)| {
                    Page::new(i, Rect::new(0.0, 0.0, 100.0, 100.0))
                        .with_zones(labels.into_iter().map(zone).collect())
                })
                .collect(),
        )
    }

    #[test]
    fn test_next_label_crosses_pages() {
        let docs = vec![document(vec![
            vec![ZoneLabel::Title, ZoneLabel::Author],
            vec![ZoneLabel::Body],
        ])];
        let samples = hmm_training_samples(&docs, &default_zone_features(), None);
        let next: Vec<_> = samples.iter().map(|s| s.next_label).collect();
        assert_eq!(next, vec![Some(ZoneLabel::Author), Some(ZoneLabel::Body), None]);
        let starts: Vec<_> = samples.iter().map(|s| s.starts_sequence).collect();
        assert_eq!(starts, vec![true, false, false]);
    }

    #[test]
    fn test_documents_are_separate_sequences() {
        let docs = vec![
            document(vec![vec![ZoneLabel::Title]]),
            document(vec![vec![ZoneLabel::Body, ZoneLabel::References]]),
        ];
        let samples = hmm_training_samples(&docs, &default_zone_features(), None);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].next_label, None);
        assert!(samples[1].starts_sequence);
        assert_eq!(samples[1].next_label, Some(ZoneLabel::References));
    }

    #[test]
    fn test_label_map() {
        let docs = vec![document(vec![vec![ZoneLabel::Title, ZoneLabel::Heading]])];
        let map: HashMap<_, _> = [(ZoneLabel::Heading, ZoneLabel::Body)].into_iter().collect();
        let samples = hmm_training_samples(&docs, &default_zone_features(), Some(&map));
        assert_eq!(samples[0].label, Some(ZoneLabel::Title));
        assert_eq!(samples[0].next_label, Some(ZoneLabel::Body));
        assert_eq!(samples[1].label, Some(ZoneLabel::Body));
    }

    #[test]
    fn test_samples_serialize() {
        let docs = vec![document(vec![vec![ZoneLabel::Title]])];
        let samples = hmm_training_samples(&docs, &default_zone_features(), None);
        let json = serde_json::to_string(&samples).unwrap();
        assert!(json.contains("\"label\":\"title\""));
        let back: Vec<HmmTrainingSample> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, samples);
    }
}
