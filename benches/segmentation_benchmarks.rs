//! Segmentation and reference splitting benchmarks
//!
//! XY-cut is benchmarked on synthetic two-column pages of growing word
//! counts, the reference splitter on bibliographies of growing length.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use zone_oxide::geometry::Rect;
use zone_oxide::model::{Chunk, Page};
use zone_oxide::reading_order::reading_order;
use zone_oxide::references::{KMeansReferenceExtractor, ReferenceBlock};
use zone_oxide::segmentation::XYCutSegmenter;

const PAGE: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 612.0,
    height: 792.0,
};

/// Two columns of `lines` lines with eight words each.
fn two_column_chunks(lines: usize) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(lines * 16);
    for line in 0..lines {
        let y = 72.0 + (line % 55) as f64 * 12.0;
        for column in [54.0, 318.0] {
            for word in 0..8 {
                let x = column + word as f64 * 30.0;
                chunks.push(Chunk::new(Rect::new(x, y, 26.0, 10.0), "word"));
            }
        }
    }
    chunks
}

fn bibliography(count: usize) -> ReferenceBlock {
    let mut lines = Vec::with_capacity(count * 2);
    for i in 0..count {
        let y = (2 * i) as f64 * 12.0;
        lines.push((
            format!("[{}] Author, A. and Other, B", i + 1),
            Rect::new(0.0, y, 400.0, 10.0),
        ));
        lines.push((
            format!("Journal {}, 2001.", i),
            Rect::new(60.0, y + 12.0, 300.0, 10.0),
        ));
    }
    ReferenceBlock::new(lines)
}

fn bench_xycut(c: &mut Criterion) {
    let mut group = c.benchmark_group("xycut");
    let segmenter = XYCutSegmenter::default();

    for lines in [10, 30, 55] {
        let chunks = two_column_chunks(lines);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_chunks", chunks.len())),
            &chunks,
            |b, chunks| b.iter(|| black_box(segmenter.cut(black_box(chunks), PAGE))),
        );
    }
    group.finish();
}

fn bench_segment_page(c: &mut Criterion) {
    let segmenter = XYCutSegmenter::default();
    let chunks = two_column_chunks(55);
    c.bench_function("segment_page_880_chunks", |b| {
        b.iter(|| {
            let mut page = Page::new(0, PAGE).with_chunks(chunks.clone());
            let _ = segmenter.segment_page(&mut page);
            black_box(page)
        })
    });
}

fn bench_reading_order(c: &mut Criterion) {
    let rects: Vec<Rect> = two_column_chunks(55).iter().map(Chunk::bounds).collect();
    c.bench_function("reading_order_880_rects", |b| {
        b.iter(|| black_box(reading_order(black_box(&rects))))
    });
}

fn bench_reference_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_splitting");
    let extractor = KMeansReferenceExtractor::default();

    for count in [50, 200, 1000] {
        let block = bibliography(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &block, |b, block| {
            b.iter(|| black_box(extractor.extract_from_block(black_box(block))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_xycut,
    bench_segment_page,
    bench_reading_order,
    bench_reference_splitting
);
criterion_main!(benches);
