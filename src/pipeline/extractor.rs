//! Character extraction: the source of positioned chunks.
//!
//! Reading glyphs out of a concrete file format is left to a
//! [`CharacterExtractor`]. [`JsonCharacterExtractor`] reads a JSON glyph
//! dump:
//!
//! ```json
//! {
//!   "pages": [
//!     {
//!       "bounds": { "x": 0, "y": 0, "width": 612, "height": 792 },
//!       "chunks": [
//!         { "bounds": { "x": 72, "y": 72, "width": 6, "height": 10 },
//!           "text": "A", "font_name": "Times-Bold", "font_size": 10 }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Rect;
use crate::model::{Chunk, Document, Page};

/// Produces a document of raw, unsegmented pages.
///
/// Implementations must emit chunks in a stable order: segmentation output
/// depends on it.
pub trait CharacterExtractor: Send + Sync {
    /// Read every page's chunks from `reader`.
    fn extract_characters(&self, reader: &mut dyn Read) -> Result<Document>;

    /// Get the extractor name for debugging.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize, Deserialize)]
struct GlyphDump {
    pages: Vec<GlyphPage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GlyphPage {
    bounds: Rect,
    #[serde(default)]
    chunks: Vec<Chunk>,
}

/// Reads the JSON glyph dump format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCharacterExtractor;

impl JsonCharacterExtractor {
    /// Create the extractor.
    pub fn new() -> Self {
        Self
    }

    /// Read a glyph dump from a file.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path)?;
        let document = self.extract_characters(&mut file)?;
        log::debug!(
            "Read {} pages from {}",
            document.pages().len(),
            path.display()
        );
        Ok(document)
    }

    /// Serialize the raw chunks of `document` back into the dump format.
    pub fn to_json(&self, document: &Document) -> Result<String> {
        let dump = GlyphDump {
            pages: document
                .pages()
                .iter()
                .map(|p| GlyphPage {
                    bounds: p.bounds(),
                    chunks: p.chunks().to_vec(),
                })
                .collect(),
        };
        Ok(serde_json::to_string(&dump)?)
    }
}

impl CharacterExtractor for JsonCharacterExtractor {
    /// # Errors
    ///
    /// [`Error::Json`](crate::Error::Json) for a malformed dump,
    /// [`Error::MalformedInput`](crate::Error::MalformedInput) for invalid
    /// page or chunk bounds.
    fn extract_characters(&self, reader: &mut dyn Read) -> Result<Document> {
        let dump: GlyphDump = serde_json::from_reader(reader)?;
        let mut document = Document::new();
        for (index, page) in dump.pages.into_iter().enumerate() {
            let page = Page::new(index, page.bounds).with_chunks(page.chunks);
            page.validate()?;
            document.add_page(page);
        }
        Ok(document)
    }

    fn name(&self) -> &'static str {
        "JsonGlyphDump"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    const DUMP: &str = r#"{
        "pages": [
            {
                "bounds": {"x": 0, "y": 0, "width": 600, "height": 800},
                "chunks": [
                    {"bounds": {"x": 50, "y": 10, "width": 5, "height": 10}, "text": "b"},
                    {"bounds": {"x": 10, "y": 10, "width": 5, "height": 10}, "text": "a",
                     "font_name": "Times", "font_size": 9.5}
                ]
            },
            {"bounds": {"x": 0, "y": 0, "width": 600, "height": 800}}
        ]
    }"#;

    #[test]
    fn test_preserves_chunk_order() {
        let doc = JsonCharacterExtractor::new()
            .extract_characters(&mut DUMP.as_bytes())
            .unwrap();
        assert_eq!(doc.pages().len(), 2);
        let texts: Vec<_> = doc.pages()[0].chunks().iter().map(Chunk::text).collect();
        assert_eq!(texts, vec!["b", "a"]);
        assert_eq!(doc.pages()[0].chunks()[1].font_name(), Some("Times"));
        assert_eq!(doc.pages()[1].index(), 1);
        assert!(doc.pages()[1].chunks().is_empty());
    }

    #[test]
    fn test_rejects_negative_width() {
        let json = r#"{"pages": [{"bounds": {"x": 0, "y": 0, "width": 100, "height": 100},
            "chunks": [{"bounds": {"x": 0, "y": 0, "width": -3, "height": 10}, "text": "x"}]}]}"#;
        let result = JsonCharacterExtractor::new().extract_characters(&mut json.as_bytes());
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = JsonCharacterExtractor::new().extract_characters(&mut "{".as_bytes());
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let extractor = JsonCharacterExtractor::new();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DUMP.as_bytes()).unwrap();
        let doc = extractor.extract_file(file.path()).unwrap();

        let again = extractor
            .extract_characters(&mut extractor.to_json(&doc).unwrap().as_bytes())
            .unwrap();
        assert_eq!(again.pages()[0].chunks(), doc.pages()[0].chunks());
    }
}
