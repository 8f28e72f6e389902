//! Integration tests for hierarchical reading order resolution.

use proptest::prelude::*;
use zone_oxide::geometry::Rect;
use zone_oxide::model::{Chunk, Document, Line, Page, Word, Zone};
use zone_oxide::reading_order::{reading_order, HierarchicalReadingOrder, ReadingOrderResolver};

// ============================================================================
// Helper Functions for Creating Mock Data
// ============================================================================

fn word(x: f64, y: f64, width: f64, text: &str) -> Word {
    Word::from_chunks(vec![Chunk::new(Rect::new(x, y, width, 10.0), text)])
}

/// A zone of single-word lines, one per `(x, y, text)`.
fn zone(lines: &[(f64, f64, &str)]) -> Zone {
    Zone::from_lines(
        lines
            .iter()
            .map(|&(x, y, text)| Line::from_words(vec![word(x, y, 100.0, text)]))
            .collect(),
    )
}

fn page(zones: Vec<Zone>) -> Page {
    Page::new(0, Rect::new(0.0, 0.0, 600.0, 800.0)).with_zones(zones)
}

/// Word texts per zone per line, per page.
fn signature(doc: &Document) -> Vec<Vec<Vec<Vec<String>>>> {
    doc.pages()
        .iter()
        .map(|p| {
            p.zones()
                .iter()
                .map(|z| {
                    z.lines()
                        .iter()
                        .map(|l| l.words().iter().map(|w| w.text().to_string()).collect())
                        .collect()
                })
                .collect()
        })
        .collect()
}

// ============================================================================
// Zone Order
// ============================================================================

#[test]
fn test_article_page_order() {
    let footer = zone(&[(280.0, 760.0, "footer")]);
    let right = zone(&[(320.0, 100.0, "right-1"), (320.0, 112.0, "right-2")]);
    let title = zone(&[(150.0, 30.0, "title")]);
    let left = zone(&[(40.0, 100.0, "left-1"), (40.0, 112.0, "left-2")]);

    let doc = Document::from_pages(vec![page(vec![footer, right, title, left])]);
    let doc = HierarchicalReadingOrder::new().resolve(doc).unwrap();
    assert_eq!(doc.text(), "title\nleft-1\nleft-2\nright-1\nright-2\nfooter");
}

#[test]
fn test_lines_and_words_are_ordered() {
    let shuffled = Zone::from_lines(vec![
        Line::from_words(vec![word(60.0, 20.0, 20.0, "four"), word(0.0, 20.0, 20.0, "three")]),
        Line::from_words(vec![word(40.0, 0.0, 20.0, "two"), word(0.0, 0.0, 20.0, "one")]),
    ]);
    let doc = Document::from_pages(vec![page(vec![shuffled])]);
    let doc = HierarchicalReadingOrder::new().resolve(doc).unwrap();
    assert_eq!(doc.text(), "one two\nthree four");
}

#[test]
fn test_empty_inputs_are_noops() {
    let resolver = HierarchicalReadingOrder::new();
    let doc = resolver.resolve(Document::new()).unwrap();
    assert!(doc.pages().is_empty());

    let doc = resolver.resolve(Document::from_pages(vec![page(Vec::new())])).unwrap();
    assert!(doc.pages()[0].zones().is_empty());
    assert!(reading_order(&[]).is_empty());
    assert_eq!(resolver.name(), "Hierarchical");
}

#[test]
fn test_resolved_page_is_unchanged() {
    let doc = Document::from_pages(vec![page(vec![
        zone(&[(0.0, 0.0, "a")]),
        zone(&[(0.0, 50.0, "b")]),
        zone(&[(300.0, 50.0, "c")]),
    ])]);
    let before = signature(&doc);
    let after = HierarchicalReadingOrder::new().resolve(doc).unwrap();
    assert_eq!(signature(&after), before);
}

#[test]
fn test_resolution_refreshes_cached_text() {
    let z = zone(&[(0.0, 50.0, "second"), (0.0, 0.0, "first")]);
    assert_eq!(z.text(), "second\nfirst");
    let doc = Document::from_pages(vec![page(vec![z])]);
    let doc = HierarchicalReadingOrder::new().resolve(doc).unwrap();
    assert_eq!(doc.pages()[0].zones()[0].text(), "first\nsecond");
}

// ============================================================================
// Properties
// ============================================================================

/// Zones of lines of words at random positions; every word text is unique.
fn arb_document() -> impl Strategy<Value = Document> {
    let word_spec = (0.0..500.0f64, 1.0..60.0f64);
    let line_spec = (0.0..780.0f64, prop::collection::vec(word_spec, 1..4));
    let zone_spec = prop::collection::vec(line_spec, 1..4);
    let page_spec = prop::collection::vec(zone_spec, 0..8);
    prop::collection::vec(page_spec, 1..3).prop_map(|pages| {
        Document::from_pages(
            pages
                .into_iter()
                .enumerate()
                .map(|(pi, zones)| {
                    let zones = zones
                        .into_iter()
                        .enumerate()
                        .map(|(zi, lines)| {
                            Zone::from_lines(
                                lines
                                    .into_iter()
                                    .enumerate()
                                    .map(|(li, (y, words))| {
                                        Line::from_words(
                                            words
                                                .into_iter()
                                                .enumerate()
                                                .map(|(wi, (x, w))| {
                                                    word(x, y, w, &format!("p{pi}z{zi}l{li}w{wi}"))
                                                })
                                                .collect(),
                                        )
                                    })
                                    .collect(),
                            )
                        })
                        .collect();
                    Page::new(pi, Rect::new(0.0, 0.0, 600.0, 800.0)).with_zones(zones)
                })
                .collect(),
        )
    })
}

fn arb_rects() -> impl Strategy<Value = Vec<Rect>> {
    prop::collection::vec(
        (0.0..500.0f64, 0.0..700.0f64, 0.0..100.0f64, 0.0..100.0f64),
        0..30,
    )
    .prop_map(|v| v.into_iter().map(|(x, y, w, h)| Rect::new(x, y, w, h)).collect())
}

proptest! {
    #[test]
    fn prop_resolution_is_idempotent(doc in arb_document()) {
        let resolver = HierarchicalReadingOrder::new();
        let once = resolver.resolve(doc).unwrap();
        let first = signature(&once);
        let twice = resolver.resolve(once).unwrap();
        prop_assert_eq!(signature(&twice), first);
    }

    #[test]
    fn prop_order_is_a_permutation(rects in arb_rects()) {
        let mut order = reading_order(&rects);
        order.sort_unstable();
        prop_assert_eq!(order, (0..rects.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_ordered_rects_stay_ordered(rects in arb_rects()) {
        let order = reading_order(&rects);
        let ordered: Vec<Rect> = order.iter().map(|&i| rects[i]).collect();
        let again = reading_order(&ordered);
        prop_assert_eq!(again, (0..ordered.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_resolution_keeps_content(doc in arb_document()) {
        let mut before: Vec<String> = signature(&doc).into_iter().flatten().flatten().flatten().collect();
        let resolved = HierarchicalReadingOrder::new().resolve(doc).unwrap();
        let mut after: Vec<String> = signature(&resolved).into_iter().flatten().flatten().flatten().collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
