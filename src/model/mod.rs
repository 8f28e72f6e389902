//! Hierarchical document model.
//!
//! ```text
//! Document ⊃ Page ⊃ Zone ⊃ Line ⊃ Word ⊃ Chunk
//! ```
//!
//! Every container owns its children in order and exposes a [`Rect`] and a
//! text rendering. Both are derived bottom-up (union of child bounds,
//! concatenation of child text) unless bounds were set explicitly, and both
//! are cached. Any mutable access to a container's children drops its cache,
//! so derived values never go stale.
//!
//! A [`Page`] holds either the raw chunks of the character extractor
//! (before segmentation) or its zones (after), never both.
//!
//! Sibling links (`prev`/`next`) are positional lookups into the parent's
//! children rather than stored references.
//!
//! [`Rect`]: crate::geometry::Rect

mod document;
mod text;
mod zone;

pub use document::{Document, Page};
pub use text::{Chunk, Line, Word};
pub use zone::{LabelCategory, LabelDistribution, Zone, ZoneLabel};

use std::cell::OnceCell;

use crate::geometry::Rect;

/// Lazily computed text and bounds of a container.
#[derive(Debug, Clone, Default)]
pub(crate) struct Derived {
    text: OnceCell<String>,
    bounds: OnceCell<Rect>,
}

impl Derived {
    pub(crate) fn text<F>(&self, compute: F) -> &str
    where
        F: FnOnce() -> String,
    {
        self.text.get_or_init(compute)
    }

    pub(crate) fn bounds<F>(&self, compute: F) -> Rect
    where
        F: FnOnce() -> Rect,
    {
        *self.bounds.get_or_init(compute)
    }

    pub(crate) fn reset(&mut self) {
        self.text.take();
        self.bounds.take();
    }
}

/// Union of child bounds; an empty container has zero-sized bounds at the origin.
pub(crate) fn union_of<I>(rects: I) -> Rect
where
    I: IntoIterator<Item = Rect>,
{
    rects
        .into_iter()
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default()
}

/// Rearrange `items` so that position `k` holds the element previously at `order[k]`.
///
/// `order` must be a permutation of `0..items.len()`.
pub(crate) fn apply_order<T>(items: &mut Vec<T>, order: &[usize]) {
    debug_assert_eq!(items.len(), order.len());
    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(
        order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take)),
    );
}
