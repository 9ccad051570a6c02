//! The document: owner of the store and the only way to change it.

use std::{
    cell::{Cell, Ref, RefCell},
    fmt::Debug,
    fs,
    path::Path,
    rc::Rc,
};

use log::{debug, trace};
use serde_json::Value;

use crate::{context::EditContext, error::Error, live::Font, store::FontData};

struct DocumentInner {
    data: RefCell<FontData>,
    context: EditContext,
    // bumped on every structural edit, child caches compare against it
    generation: Cell<u64>,
}

/// A loaded font document.
///
/// Cloning is cheap and yields another handle to the same document. Every
/// write made through [`Document::edit`] or [`Document::restructure`] marks
/// the injected [`EditContext`] dirty exactly once.
#[derive(Clone)]
pub struct Document(Rc<DocumentInner>);

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("glyphs", &self.0.data.borrow().glyphs.len())
            .field("generation", &self.0.generation.get())
            .field("dirty", &self.0.context.is_dirty())
            .finish()
    }
}

impl Document {
    pub fn new(data: FontData, context: EditContext) -> Document {
        Document(Rc::new(DocumentInner {
            data: RefCell::new(data),
            context,
            generation: Cell::new(0),
        }))
    }

    pub fn from_json(raw: &str, context: EditContext) -> Result<Document, Error> {
        Ok(Document::new(serde_json::from_str(raw)?, context))
    }

    pub fn load(path: &Path, context: EditContext) -> Result<Document, Error> {
        let raw = fs::read_to_string(path).map_err(Error::IoError)?;
        let data = serde_json::from_str(&raw)
            .map_err(|e| Error::ParseError(path.to_path_buf(), format!("{e}")))?;
        debug!("Loaded {path:?}");
        Ok(Document::new(data, context))
    }

    /// Write the document to `path` and mark it clean.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        fs::write(path, self.to_json_string()?)?;
        self.0.context.mark_clean();
        debug!("Saved {path:?}");
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&*self.0.data.borrow())?)
    }

    pub fn to_json(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(&*self.0.data.borrow())?)
    }

    /// The root wrapper.
    pub fn font(&self) -> Font {
        Font::new(self.clone())
    }

    pub fn context(&self) -> &EditContext {
        &self.0.context
    }

    pub fn is_dirty(&self) -> bool {
        self.0.context.is_dirty()
    }

    /// A copy of the current records.
    pub fn snapshot(&self) -> FontData {
        self.0.data.borrow().clone()
    }

    /// Borrow the records for reading.
    ///
    /// The closure must not edit the document.
    pub fn read<R>(&self, f: impl FnOnce(&FontData) -> R) -> R {
        f(&self.0.data.borrow())
    }

    pub(crate) fn borrow(&self) -> Ref<'_, FontData> {
        self.0.data.borrow()
    }

    pub fn generation(&self) -> u64 {
        self.0.generation.get()
    }

    pub(crate) fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Apply one logical edit.
    ///
    /// The closure returns `None` when the slot it wanted to change is gone,
    /// in which case nothing is marked dirty.
    pub(crate) fn edit<R>(&self, f: impl FnOnce(&mut FontData) -> Option<R>) -> Option<R> {
        let result = f(&mut self.0.data.borrow_mut());
        if result.is_some() {
            self.0.context.mark_dirty();
        }
        result
    }

    /// An edit that adds or removes records; child caches rebuild after it.
    pub(crate) fn restructure<R>(&self, f: impl FnOnce(&mut FontData) -> Option<R>) -> Option<R> {
        let result = self.edit(f);
        if result.is_some() {
            self.0.generation.set(self.0.generation.get() + 1);
            trace!("Document generation {}", self.0.generation.get());
        }
        result
    }

    /// Rewrite records into an equivalent form without counting it as an edit.
    pub(crate) fn normalize<R>(&self, f: impl FnOnce(&mut FontData) -> R) -> R {
        f(&mut self.0.data.borrow_mut())
    }
}
