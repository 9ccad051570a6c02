use std::{collections::BTreeMap, rc::Rc};

use log::debug;
use serde_json::Value;

use crate::{
    document::Document,
    error::Error,
    store::{FontData, GlyphData, I18NDictionary},
    types::GlyphName,
};

use super::{
    design_space::{Axis, Instance, Master},
    glyph::Glyph,
    ChildCache, LiveSlot,
};

struct FontInner {
    doc: Document,
    glyphs: ChildCache<Glyph>,
    axes: ChildCache<Axis>,
    masters: ChildCache<Master>,
    instances: ChildCache<Instance>,
}

/// The root wrapper.
#[derive(Clone)]
pub struct Font(Rc<FontInner>);

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Font").field(&self.0.doc).finish()
    }
}

impl LiveSlot for Font {
    type Record = FontData;

    fn document(&self) -> &Document {
        &self.0.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a FontData> {
        Some(font)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut FontData> {
        Some(font)
    }
}

impl Font {
    pub(crate) fn new(doc: Document) -> Font {
        Font(Rc::new(FontInner {
            doc,
            glyphs: Default::default(),
            axes: Default::default(),
            masters: Default::default(),
            instances: Default::default(),
        }))
    }

    fn get<R>(&self, f: impl FnOnce(&FontData) -> R) -> R {
        self.0.doc.read(f)
    }

    fn set(&self, f: impl FnOnce(&mut FontData)) {
        self.0.doc.edit(|font| {
            f(font);
            Some(())
        });
    }

    pub fn upm(&self) -> u16 {
        self.get(|f| f.upm)
    }

    pub fn set_upm(&self, upm: u16) {
        self.set(|f| f.upm = upm);
    }

    pub fn version(&self) -> (u16, u16) {
        self.get(|f| f.version)
    }

    pub fn set_version(&self, version: (u16, u16)) {
        self.set(|f| f.version = version);
    }

    pub fn note(&self) -> Option<String> {
        self.get(|f| f.note.clone())
    }

    pub fn set_note(&self, note: Option<String>) {
        self.set(|f| f.note = note);
    }

    pub fn date(&self) -> Option<String> {
        self.get(|f| f.date.clone())
    }

    pub fn set_date(&self, date: Option<String>) {
        self.set(|f| f.date = date);
    }

    pub fn names(&self) -> BTreeMap<String, I18NDictionary> {
        self.get(|f| f.names.clone())
    }

    /// Set one localized entry of the name table, e.g. `("familyName", "dflt", "Test")`.
    pub fn set_name(&self, key: &str, language: &str, value: &str) {
        self.set(|f| {
            f.names
                .entry(key.to_string())
                .or_default()
                .insert(language.to_string(), value.to_string());
        });
    }

    pub fn custom_ot_values(&self) -> Option<Value> {
        self.get(|f| f.custom_ot_values.clone())
    }

    pub fn set_custom_ot_values(&self, value: Option<Value>) {
        self.set(|f| f.custom_ot_values = value);
    }

    pub fn variation_sequences(&self) -> Option<Value> {
        self.get(|f| f.variation_sequences.clone())
    }

    pub fn features(&self) -> Value {
        self.get(|f| f.features.clone())
    }

    pub fn set_features(&self, features: Value) {
        self.set(|f| f.features = features);
    }

    pub fn first_kern_groups(&self) -> Option<BTreeMap<String, Vec<String>>> {
        self.get(|f| f.first_kern_groups.clone())
    }

    pub fn second_kern_groups(&self) -> Option<BTreeMap<String, Vec<String>>> {
        self.get(|f| f.second_kern_groups.clone())
    }

    pub fn format_specific(&self) -> Option<Value> {
        self.get(|f| f.format_specific.clone())
    }

    pub fn source(&self) -> Option<String> {
        self.get(|f| f.source.clone())
    }

    pub fn glyphs(&self) -> Vec<Glyph> {
        let (len, generation) = (self.get(|f| f.glyphs.len()), self.0.doc.generation());
        self.0
            .glyphs
            .get(len, generation, |i| Glyph::new(self.0.doc.clone(), i))
    }

    pub fn axes(&self) -> Vec<Axis> {
        let (len, generation) = (self.get(|f| f.axes.len()), self.0.doc.generation());
        self.0
            .axes
            .get(len, generation, |i| Axis::new(self.0.doc.clone(), i))
    }

    pub fn masters(&self) -> Vec<Master> {
        let (len, generation) = (self.get(|f| f.masters.len()), self.0.doc.generation());
        self.0
            .masters
            .get(len, generation, |i| Master::new(self.0.doc.clone(), i))
    }

    pub fn instances(&self) -> Vec<Instance> {
        let (len, generation) = (self.get(|f| f.instances.len()), self.0.doc.generation());
        self.0
            .instances
            .get(len, generation, |i| Instance::new(self.0.doc.clone(), i))
    }

    pub fn find_glyph(&self, name: &str) -> Option<Glyph> {
        let index = self.get(|f| f.glyph_index(name))?;
        self.glyphs().get(index).cloned()
    }

    pub fn find_glyph_by_codepoint(&self, codepoint: u32) -> Option<Glyph> {
        let index = self.get(|f| {
            f.glyphs
                .iter()
                .position(|g| g.codepoints.contains(&codepoint))
        })?;
        self.glyphs().get(index).cloned()
    }

    /// Find an axis by id.
    pub fn find_axis(&self, id: &str) -> Option<Axis> {
        let index = self.get(|f| f.axes.iter().position(|a| a.id == id))?;
        self.axes().get(index).cloned()
    }

    pub fn find_axis_by_tag(&self, tag: &str) -> Option<Axis> {
        let index = self.get(|f| f.axes.iter().position(|a| a.tag == tag))?;
        self.axes().get(index).cloned()
    }

    pub fn find_master(&self, id: &str) -> Option<Master> {
        let index = self.get(|f| f.masters.iter().position(|m| m.id == id))?;
        self.masters().get(index).cloned()
    }

    /// Append an empty glyph.
    pub fn add_glyph(&self, name: &str, category: &str) -> Result<Glyph, Error> {
        if self.get(|f| f.glyph_index(name)).is_some() {
            return Err(Error::DuplicateGlyph(GlyphName::new(name)));
        }
        let index = self
            .0
            .doc
            .restructure(|f| {
                f.glyphs.push(GlyphData::new(name, category));
                Some(f.glyphs.len() - 1)
            })
            .ok_or(Error::StaleHandle("font"))?;
        debug!("Added glyph '{name}'");
        self.glyphs()
            .get(index)
            .cloned()
            .ok_or(Error::StaleHandle("glyph"))
    }

    /// Remove a glyph by name, returning whether there was one.
    ///
    /// Components referencing it are left alone and flatten to nothing.
    pub fn remove_glyph(&self, name: &str) -> bool {
        let removed = self
            .0
            .doc
            .restructure(|f| {
                let index = f.glyph_index(name)?;
                Some(f.glyphs.remove(index))
            })
            .is_some();
        if removed {
            debug!("Removed glyph '{name}'");
        }
        removed
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        self.0.doc.to_json_string()
    }

    pub fn to_json(&self) -> Result<Value, Error> {
        self.0.doc.to_json()
    }
}
