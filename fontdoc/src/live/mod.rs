//! Live wrappers over the document store.
//!
//! A wrapper is a handle holding the [`Document`] plus the indices that lead
//! from the root record to its slot. Reading resolves the slot on every call,
//! writing goes through a single document edit so the edit context is marked
//! dirty exactly once per call. Parents cache their child handles; the cache is
//! rebuilt when the backing collection changes length or the document has been
//! restructured since it was built, so asking twice without a structural edit
//! in between hands back the same handles.
//!
//! Children never hold their parent's handle, only its address. Upward
//! navigation builds a fresh parent handle.

use std::cell::RefCell;

use log::{trace, warn};

use crate::{
    document::Document,
    store::{AnchorData, FontData, GuideData, LayerData, ShapeData},
};

/// Generate getter/setter pairs for record fields.
///
/// Getters return `None` once the slot is gone; setters are a single edit.
macro_rules! live_fields {
    ($($(#[$meta:meta])* $field:ident, $setter:ident: $ty:ty;)*) => {
        $(
            $(#[$meta])*
            pub fn $field(&self) -> Option<$ty> {
                self.read(|record| record.$field.clone())
            }

            pub fn $setter(&self, value: $ty) {
                self.update(|record| record.$field = value);
            }
        )*
    };
}

/// As [`live_fields`] for fields that are optional in the record.
macro_rules! live_optional_fields {
    ($($(#[$meta:meta])* $field:ident, $setter:ident: $ty:ty;)*) => {
        $(
            $(#[$meta])*
            pub fn $field(&self) -> Option<$ty> {
                self.read(|record| record.$field.clone()).flatten()
            }

            pub fn $setter(&self, value: Option<$ty>) {
                self.update(|record| record.$field = value);
            }
        )*
    };
}

mod design_space;
mod font;
mod glyph;
mod layer;
mod marks;
mod shape;

pub use design_space::{Axis, Instance, Master};
pub use font::Font;
pub use glyph::Glyph;
pub use layer::Layer;
pub use marks::{Anchor, Guide};
pub use shape::{Component, Node, Path, Shape};

/// A wrapper that views one record in the store.
pub trait LiveSlot {
    type Record;

    fn document(&self) -> &Document;

    /// Find this wrapper's record, `None` if it no longer exists.
    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a Self::Record>;

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut Self::Record>;

    fn read<R>(&self, f: impl FnOnce(&Self::Record) -> R) -> Option<R> {
        self.document().read(|font| self.resolve(font).map(f))
    }

    /// Change the record as one edit.
    ///
    /// Writes to a record that no longer exists are dropped and leave the
    /// document clean.
    fn update<R>(&self, f: impl FnOnce(&mut Self::Record) -> R) -> Option<R> {
        let result = self
            .document()
            .edit(|font| self.resolve_mut(font).map(f));
        if result.is_none() {
            warn!("Ignoring write to a record that is no longer in the document");
        }
        result
    }

    fn exists(&self) -> bool {
        self.read(|_| ()).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LayerAddr {
    pub(crate) glyph: usize,
    pub(crate) layer: usize,
}

impl LayerAddr {
    pub(crate) fn get(self, font: &FontData) -> Option<&LayerData> {
        font.glyphs.get(self.glyph)?.layers.get(self.layer)
    }

    pub(crate) fn get_mut(self, font: &mut FontData) -> Option<&mut LayerData> {
        font.glyphs.get_mut(self.glyph)?.layers.get_mut(self.layer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ShapeAddr {
    pub(crate) layer: LayerAddr,
    pub(crate) shape: usize,
}

impl ShapeAddr {
    pub(crate) fn get(self, font: &FontData) -> Option<&ShapeData> {
        self.layer.get(font)?.shapes.get(self.shape)
    }

    pub(crate) fn get_mut(self, font: &mut FontData) -> Option<&mut ShapeData> {
        self.layer.get_mut(font)?.shapes.get_mut(self.shape)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeAddr {
    pub(crate) shape: ShapeAddr,
    pub(crate) node: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct AnchorAddr {
    pub(crate) layer: LayerAddr,
    pub(crate) anchor: usize,
}

impl AnchorAddr {
    pub(crate) fn get(self, font: &FontData) -> Option<&AnchorData> {
        self.layer.get(font)?.anchors.get(self.anchor)
    }

    pub(crate) fn get_mut(self, font: &mut FontData) -> Option<&mut AnchorData> {
        self.layer.get_mut(font)?.anchors.get_mut(self.anchor)
    }
}

/// Guides hang off layers and masters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum GuideOwner {
    Layer(LayerAddr),
    Master(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct GuideAddr {
    pub(crate) owner: GuideOwner,
    pub(crate) guide: usize,
}

impl GuideOwner {
    pub(crate) fn guides(self, font: &FontData) -> Option<&Vec<GuideData>> {
        match self {
            GuideOwner::Layer(layer) => layer.get(font).map(|l| &l.guides),
            GuideOwner::Master(master) => font.masters.get(master).map(|m| &m.guides),
        }
    }

    pub(crate) fn guides_mut(self, font: &mut FontData) -> Option<&mut Vec<GuideData>> {
        match self {
            GuideOwner::Layer(layer) => layer.get_mut(font).map(|l| &mut l.guides),
            GuideOwner::Master(master) => font.masters.get_mut(master).map(|m| &mut m.guides),
        }
    }
}

struct CacheEntry<W> {
    len: usize,
    generation: u64,
    children: Vec<W>,
}

/// Child handles of one parent wrapper.
pub(crate) struct ChildCache<W> {
    entry: RefCell<Option<CacheEntry<W>>>,
}

impl<W> Default for ChildCache<W> {
    fn default() -> Self {
        ChildCache {
            entry: RefCell::new(None),
        }
    }
}

impl<W: Clone> ChildCache<W> {
    /// The cached handles, rebuilt with `build` if `len` or `generation`
    /// differ from what they were built against.
    pub(crate) fn get(&self, len: usize, generation: u64, build: impl FnMut(usize) -> W) -> Vec<W> {
        let mut entry = self.entry.borrow_mut();
        if let Some(entry) = entry.as_ref() {
            if entry.len == len && entry.generation == generation {
                return entry.children.clone();
            }
        }
        trace!("Building {len} child handles at generation {generation}");
        let children: Vec<W> = (0..len).map(build).collect();
        *entry = Some(CacheEntry {
            len,
            generation,
            children: children.clone(),
        });
        children
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn cache_reuses_until_stale() {
        let cache = ChildCache::default();
        let builds = Cell::new(0);
        let build = |i: usize| {
            builds.set(builds.get() + 1);
            i * 10
        };

        assert_eq!(vec![0, 10], cache.get(2, 0, build));
        assert_eq!(vec![0, 10], cache.get(2, 0, build));
        assert_eq!(2, builds.get());

        assert_eq!(vec![0, 10, 20], cache.get(3, 0, build));
        assert_eq!(5, builds.get());

        cache.get(3, 1, build);
        assert_eq!(8, builds.get());
    }
}
