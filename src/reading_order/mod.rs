//! Reading order resolution.
//!
//! Reorders the zones of every page, the lines of every zone and the words of
//! every line in place. The hierarchical strategy alternates two splits:
//!
//! - **Bands**: items whose vertical extents overlap (transitively) form one
//!   band; bands are read top to bottom.
//! - **Columns**: inside a single band, items whose horizontal extents overlap
//!   form one column; columns are read left to right.
//!
//! Each band or column is decomposed again until it cannot be split, and the
//! remaining items are sorted by top then left. Words are only sorted left to
//! right.
//!
//! The decomposition depends on geometry alone and all sorts are stable, so
//! resolving an already resolved document changes nothing.

use crate::error::Result;
use crate::geometry::Rect;
use crate::model::{apply_order, Document, Page, Zone};
use crate::utils::safe_float_cmp;

/// Trait for reordering a document into reading order.
pub trait ReadingOrderResolver: Send + Sync {
    /// Reorder zones, lines and words of every page and return the document.
    ///
    /// Must be idempotent, and a no-op for pages without zones.
    fn resolve(&self, document: Document) -> Result<Document>;

    /// Return the name of this strategy for debugging.
    fn name(&self) -> &'static str;
}

/// Recursive band/column reading order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchicalReadingOrder;

impl HierarchicalReadingOrder {
    /// Create the resolver.
    pub fn new() -> Self {
        Self
    }

    /// Reorder one page in place.
    pub fn resolve_page(&self, page: &mut Page) {
        if page.zones().is_empty() {
            return;
        }

        let zones = page.zones_mut();
        for zone in zones.iter_mut() {
            self.resolve_zone(zone);
        }
        let bounds: Vec<Rect> = zones.iter().map(Zone::bounds).collect();
        let order = reading_order(&bounds);
        apply_order(zones, &order);
    }

    /// Reorder the lines of a zone and the words of each line in place.
    pub fn resolve_zone(&self, zone: &mut Zone) {
        let lines = zone.lines_mut();
        for line in lines.iter_mut() {
            line.words_mut()
                .sort_by(|a, b| safe_float_cmp(a.bounds().left(), b.bounds().left()));
        }
        let bounds: Vec<Rect> = lines.iter().map(|l| l.bounds()).collect();
        let order = reading_order(&bounds);
        apply_order(lines, &order);
    }
}

impl ReadingOrderResolver for HierarchicalReadingOrder {
    fn resolve(&self, mut document: Document) -> Result<Document> {
        for page in document.pages_mut() {
            self.resolve_page(page);
        }
        log::debug!(
            "Resolved reading order for {} pages",
            document.pages().len()
        );
        Ok(document)
    }

    fn name(&self) -> &'static str {
        "Hierarchical"
    }
}

/// Reading order of `rects` as a permutation: position `k` of the result is
/// the index of the `k`-th rectangle to read.
///
/// # Examples
///
/// ```
/// use zone_oxide::geometry::Rect;
/// use zone_oxide::reading_order::reading_order;
///
/// // title across the page, then two columns
/// let rects = [
///     Rect::new(300.0, 50.0, 200.0, 400.0), // right column
///     Rect::new(0.0, 0.0, 500.0, 30.0),     // title
///     Rect::new(0.0, 50.0, 200.0, 400.0),   // left column
/// ];
/// assert_eq!(reading_order(&rects), vec![1, 2, 0]);
/// ```
pub fn reading_order(rects: &[Rect]) -> Vec<usize> {
    let mut order = Vec::with_capacity(rects.len());
    decompose(rects, (0..rects.len()).collect(), Split::Bands, &mut order);
    order
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Split {
    Bands,
    Columns,
}

impl Split {
    fn extent(&self, rect: &Rect) -> (f64, f64) {
        match self {
            Split::Bands => (rect.top(), rect.bottom()),
            Split::Columns => (rect.left(), rect.right()),
        }
    }

    fn other(&self) -> Split {
        match self {
            Split::Bands => Split::Columns,
            Split::Columns => Split::Bands,
        }
    }
}

/// `items` are indices into `rects` in current order.
///
/// Recursion only happens on proper subsets of `items`, so depth is bounded by
/// the item count.
fn decompose(rects: &[Rect], items: Vec<usize>, split: Split, out: &mut Vec<usize>) {
    if items.len() <= 1 {
        out.extend(items);
        return;
    }

    let groups = components(rects, &items, split);
    if groups.len() > 1 {
        for group in groups {
            decompose(rects, group, Split::Bands, out);
        }
        return;
    }

    let other = components(rects, &items, split.other());
    if other.len() > 1 {
        for group in other {
            decompose(rects, group, Split::Bands, out);
        }
        return;
    }

    let mut items = items;
    items.sort_by(|&a, &b| {
        safe_float_cmp(rects[a].top(), rects[b].top())
            .then_with(|| safe_float_cmp(rects[a].left(), rects[b].left()))
    });
    out.extend(items);
}

/// Connected components of overlapping extents along `split`, in extent order.
/// Members of each component keep their order in `items`.
fn components(rects: &[Rect], items: &[usize], split: Split) -> Vec<Vec<usize>> {
    // (start, end, position in items)
    let mut spans: Vec<(f64, f64, usize)> = items
        .iter()
        .enumerate()
        .map(|(pos, &i)| {
            let (s, e) = split.extent(&rects[i]);
            (s, e, pos)
        })
        .collect();
    // wider extents first among equal starts, so the grouping does not
    // depend on input order
    spans.sort_by(|a, b| safe_float_cmp(a.0, b.0).then_with(|| safe_float_cmp(b.1, a.1)));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current_end = f64::NEG_INFINITY;
    for (start, end, pos) in spans {
        match groups.last_mut() {
            Some(group) if start < current_end => {
                group.push(pos);
                current_end = current_end.max(end);
            },
            _ => {
                groups.push(vec![pos]);
                current_end = end;
            },
        }
    }

    groups
        .into_iter()
        .map(|mut positions| {
            positions.sort_unstable();
            positions.into_iter().map(|pos| items[pos]).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chunk, Line, Word};

    fn word(x: f64, y: f64, text: &str) -> Word {
        Word::from_chunks(vec![Chunk::new(Rect::new(x, y, 10.0, 10.0), text)])
    }

    fn zone_at(x: f64, y: f64, text: &str) -> Zone {
        Zone::from_lines(vec![Line::from_words(vec![word(x, y, text)])])
    }

    #[test]
    fn test_bands_top_to_bottom() {
        let rects = [Rect::new(0.0, 100.0, 10.0, 10.0), Rect::new(0.0, 0.0, 10.0, 10.0)];
        assert_eq!(reading_order(&rects), vec![1, 0]);
    }

    #[test]
    fn test_columns_left_to_right_within_band() {
        let rects = [
            Rect::new(300.0, 0.0, 100.0, 500.0),
            Rect::new(0.0, 10.0, 100.0, 500.0),
        ];
        assert_eq!(reading_order(&rects), vec![1, 0]);
    }

    #[test]
    fn test_column_content_read_before_next_column() {
        // left column has two blocks; both come before the right column
        let rects = [
            Rect::new(300.0, 0.0, 100.0, 300.0),
            Rect::new(0.0, 200.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        ];
        assert_eq!(reading_order(&rects), vec![2, 1, 0]);
    }

    #[test]
    fn test_entangled_items_sort_by_top_then_left() {
        // overlapping on both axes: no split possible
        let rects = [
            Rect::new(5.0, 5.0, 20.0, 20.0),
            Rect::new(0.0, 0.0, 20.0, 20.0),
            Rect::new(10.0, 0.0, 20.0, 20.0),
        ];
        assert_eq!(reading_order(&rects), vec![1, 2, 0]);
    }

    #[test]
    fn test_identical_rects_keep_input_order() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(reading_order(&[r, r, r]), vec![0, 1, 2]);
    }

    #[test]
    fn test_order_is_idempotent() {
        let rects = vec![
            Rect::new(300.0, 60.0, 100.0, 300.0),
            Rect::new(0.0, 0.0, 400.0, 40.0),
            Rect::new(0.0, 260.0, 100.0, 100.0),
            Rect::new(0.0, 60.0, 100.0, 100.0),
            Rect::new(50.0, 400.0, 10.0, 0.0),
        ];
        let first = reading_order(&rects);
        let reordered: Vec<Rect> = first.iter().map(|&i| rects[i]).collect();
        let second = reading_order(&reordered);
        assert_eq!(second, (0..rects.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        assert!(reading_order(&[]).is_empty());
        let doc = Document::from_pages(vec![Page::new(0, Rect::default())]);
        let doc = HierarchicalReadingOrder::new().resolve(doc).unwrap();
        assert!(doc.pages()[0].zones().is_empty());
    }

    #[test]
    fn test_resolve_page_orders_zones_lines_words() {
        let zone = Zone::from_lines(vec![
            Line::from_words(vec![word(40.0, 20.0, "d"), word(0.0, 20.0, "c")]),
            Line::from_words(vec![word(0.0, 0.0, "a"), word(40.0, 0.0, "b")]),
        ]);
        let mut page = Page::new(0, Rect::new(0.0, 0.0, 600.0, 800.0))
            .with_zones(vec![zone_at(0.0, 300.0, "last")]);
        page.zones_mut().push(zone);

        HierarchicalReadingOrder::new().resolve_page(&mut page);
        assert_eq!(page.text(), "a b\nc d\nlast");
    }
}
