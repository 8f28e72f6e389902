//! Pages and documents.

use super::{Chunk, Derived, Zone};
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// A single page.
///
/// Before segmentation a page carries the raw chunks of the character
/// extractor; [`Page::set_zones`] replaces them with zones.
#[derive(Debug, Clone)]
pub struct Page {
    index: usize,
    bounds: Rect,
    chunks: Vec<Chunk>,
    zones: Vec<Zone>,
    derived: Derived,
}

impl Page {
    /// Create an empty page with the given 0-based index and page bounds.
    pub fn new(index: usize, bounds: Rect) -> Self {
        Self {
            index,
            bounds,
            chunks: Vec::new(),
            zones: Vec::new(),
            derived: Derived::default(),
        }
    }

    /// Attach raw chunks (builder style). Drops any zones.
    pub fn with_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.set_chunks(chunks);
        self
    }

    /// Attach zones (builder style). Drops any raw chunks.
    pub fn with_zones(mut self, zones: Vec<Zone>) -> Self {
        self.set_zones(zones);
        self
    }

    /// 0-based page number.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Page bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Raw chunks awaiting segmentation.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Replace the raw chunks. Drops any zones.
    pub fn set_chunks(&mut self, chunks: Vec<Chunk>) {
        self.chunks = chunks;
        self.zones.clear();
        self.derived.reset();
    }

    /// Move the raw chunks out of the page.
    pub fn take_chunks(&mut self) -> Vec<Chunk> {
        self.derived.reset();
        std::mem::take(&mut self.chunks)
    }

    /// Zones in order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Mutable access to the zones; drops the cached text.
    pub fn zones_mut(&mut self) -> &mut Vec<Zone> {
        self.derived.reset();
        &mut self.zones
    }

    /// Replace the zones. Drops any raw chunks.
    pub fn set_zones(&mut self, zones: Vec<Zone>) {
        self.zones = zones;
        self.chunks.clear();
        self.derived.reset();
    }

    /// The zone before zone `index`, if any.
    pub fn prev_zone(&self, index: usize) -> Option<&Zone> {
        index.checked_sub(1).and_then(|i| self.zones.get(i))
    }

    /// The zone after zone `index`, if any.
    pub fn next_zone(&self, index: usize) -> Option<&Zone> {
        if index >= self.zones.len() {
            return None;
        }
        self.zones.get(index + 1)
    }

    /// Zone texts joined by newlines.
    pub fn text(&self) -> &str {
        self.derived.text(|| {
            self.zones
                .iter()
                .map(Zone::text)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Check the page bounds and every raw chunk for usable geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] for non-finite coordinates or
    /// negative extents.
    pub fn validate(&self) -> Result<()> {
        if !self.bounds.is_valid() {
            return Err(Error::MalformedInput(format!(
                "page {} has invalid bounds {:?}",
                self.index, self.bounds
            )));
        }
        if let Some((i, chunk)) = self
            .chunks
            .iter()
            .enumerate()
            .find(|(_, c)| !c.bounds().is_valid())
        {
            return Err(Error::MalformedInput(format!(
                "chunk {} ('{}') on page {} has invalid bounds {:?}",
                i,
                chunk.text(),
                self.index,
                chunk.bounds()
            )));
        }
        Ok(())
    }
}

/// A whole document: an ordered list of pages.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pages: Vec<Page>,
    derived: Derived,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document owning `pages` in the given order.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            derived: Derived::default(),
        }
    }

    /// Append a page.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
        self.derived.reset();
    }

    /// Pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Mutable access to the pages; drops the cached text.
    pub fn pages_mut(&mut self) -> &mut Vec<Page> {
        self.derived.reset();
        &mut self.pages
    }

    /// Iterate over all zones of all pages.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.pages.iter().flat_map(|p| p.zones().iter())
    }

    /// Page texts joined by newlines.
    pub fn text(&self) -> &str {
        self.derived.text(|| {
            self.pages
                .iter()
                .map(Page::text)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Line, Word};

    fn zone(text: &str, y: f64) -> Zone {
        Zone::from_lines(vec![Line::from_words(vec![Word::from_chunks(vec![
            Chunk::new(Rect::new(0.0, y, 10.0, 10.0), text),
        ])])])
    }

    #[test]
    fn test_page_holds_chunks_or_zones() {
        let mut page = Page::new(0, Rect::new(0.0, 0.0, 600.0, 800.0))
            .with_chunks(vec![Chunk::new(Rect::new(0.0, 0.0, 5.0, 5.0), "x")]);
        assert_eq!(page.chunks().len(), 1);
        page.set_zones(vec![zone("x", 0.0)]);
        assert!(page.chunks().is_empty());
        assert_eq!(page.zones().len(), 1);
        page.set_chunks(vec![]);
        assert!(page.zones().is_empty());
    }

    #[test]
    fn test_page_text_invalidated_by_zones_mut() {
        let mut page =
            Page::new(0, Rect::new(0.0, 0.0, 100.0, 100.0)).with_zones(vec![zone("a", 0.0)]);
        assert_eq!(page.text(), "a");
        page.zones_mut().push(zone("b", 20.0));
        assert_eq!(page.text(), "a\nb");
    }

    #[test]
    fn test_document_text() {
        let mut doc = Document::new();
        doc.add_page(Page::new(0, Rect::default()).with_zones(vec![zone("one", 0.0)]));
        assert_eq!(doc.text(), "one");
        doc.add_page(Page::new(1, Rect::default()).with_zones(vec![zone("two", 0.0)]));
        assert_eq!(doc.text(), "one\ntwo");
        assert_eq!(doc.zones().count(), 2);
    }

    #[test]
    fn test_validate_rejects_negative_page() {
        let page = Page::new(3, Rect::new(0.0, 0.0, -1.0, 10.0));
        let err = page.validate().unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(err.to_string().contains("page 3"));
    }

    #[test]
    fn test_validate_rejects_bad_chunk() {
        let page = Page::new(0, Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_chunks(vec![Chunk::new(Rect::new(0.0, 0.0, 1.0, f64::NAN), "q")]);
        assert!(page.validate().is_err());
    }

    #[test]
    fn test_zone_neighbours_on_page() {
        let page = Page::new(0, Rect::default()).with_zones(vec![zone("a", 0.0), zone("b", 20.0)]);
        assert!(page.prev_zone(0).is_none());
        assert_eq!(page.next_zone(0).map(Zone::text), Some("b"));
        assert_eq!(page.prev_zone(1).map(Zone::text), Some("a"));
    }
}
