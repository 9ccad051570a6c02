use std::rc::Rc;

use log::debug;
use serde_json::Value;

use crate::{
    document::Document,
    error::Error,
    store::{FontData, GlyphData, LayerData, LayerMaster},
    types::GlyphName,
};

use super::{font::Font, layer::Layer, ChildCache, LayerAddr, LiveSlot};

struct GlyphInner {
    doc: Document,
    index: usize,
    layers: ChildCache<Layer>,
}

#[derive(Clone)]
pub struct Glyph(Rc<GlyphInner>);

impl std::fmt::Debug for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glyph")
            .field("index", &self.0.index)
            .field("name", &self.name())
            .finish()
    }
}

impl PartialEq for Glyph {
    fn eq(&self, other: &Self) -> bool {
        self.0.doc.same_document(&other.0.doc) && self.0.index == other.0.index
    }
}

impl LiveSlot for Glyph {
    type Record = GlyphData;

    fn document(&self) -> &Document {
        &self.0.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a GlyphData> {
        font.glyphs.get(self.0.index)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut GlyphData> {
        font.glyphs.get_mut(self.0.index)
    }
}

impl Glyph {
    pub(crate) fn new(doc: Document, index: usize) -> Glyph {
        Glyph(Rc::new(GlyphInner {
            doc,
            index,
            layers: Default::default(),
        }))
    }

    /// Whether both are the very same handle, not just views of the same slot.
    pub fn same_handle(&self, other: &Glyph) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn font(&self) -> Font {
        self.0.doc.font()
    }

    pub fn name(&self) -> Option<GlyphName> {
        self.read(|g| g.name.clone())
    }

    /// Rename the glyph; names stay unique within the font.
    ///
    /// Components referencing the old name are left alone.
    pub fn set_name(&self, name: &str) -> Result<(), Error> {
        let taken = self.0.doc.read(|font| {
            font.glyphs
                .iter()
                .enumerate()
                .any(|(i, g)| i != self.0.index && g.name == name)
        });
        if taken {
            return Err(Error::DuplicateGlyph(GlyphName::new(name)));
        }
        self.update(|g| g.name = GlyphName::new(name))
            .ok_or(Error::StaleHandle("glyph"))
    }

    live_fields! {
        category, set_category: String;
        codepoints, set_codepoints: Vec<u32>;
    }

    live_optional_fields! {
        production_name, set_production_name: String;
        exported, set_exported: bool;
        direction, set_direction: String;
        formatspecific, set_formatspecific: Value;
    }

    /// Every stored layer, backgrounds and orphans included.
    pub fn all_layers(&self) -> Vec<Layer> {
        let len = self.read(|g| g.layers.len()).unwrap_or_default();
        self.0.layers.get(len, self.0.doc.generation(), |layer| {
            Layer::new(
                self.0.doc.clone(),
                LayerAddr {
                    glyph: self.0.index,
                    layer,
                },
            )
        })
    }

    /// The foreground layer of each master, in master order.
    ///
    /// Background layers, layers merely associated with a master and layers of
    /// masters the font does not have are skipped.
    pub fn layers(&self) -> Vec<Layer> {
        let indices = self
            .0
            .doc
            .read(|font| {
                self.resolve(font)
                    .map(|g| g.master_layer_indices(&font.masters))
            })
            .unwrap_or_default();
        let all = self.all_layers();
        indices
            .into_iter()
            .filter_map(|i| all.get(i).cloned())
            .collect()
    }

    pub fn find_layer_by_id(&self, id: &str) -> Option<Layer> {
        let index = self.read(|g| g.layers.iter().position(|l| l.id.as_deref() == Some(id)))??;
        self.all_layers().get(index).cloned()
    }

    /// The foreground layer that is default for `master_id`, whether or not
    /// the font still has that master.
    pub fn find_layer_by_master_id(&self, master_id: &str) -> Option<Layer> {
        let index = self.read(|g| {
            g.layers
                .iter()
                .position(|l| !l.is_background && l.is_default_for(master_id))
        })??;
        self.all_layers().get(index).cloned()
    }

    pub fn add_layer(&self, width: f64, master: Option<LayerMaster>) -> Result<Layer, Error> {
        let index = self
            .0
            .doc
            .restructure(|font| {
                let glyph = self.resolve_mut(font)?;
                glyph.layers.push(LayerData {
                    width: Some(width),
                    master,
                    ..Default::default()
                });
                Some(glyph.layers.len() - 1)
            })
            .ok_or(Error::StaleHandle("glyph"))?;
        debug!("Added layer {index} to glyph {}", self.0.index);
        self.all_layers()
            .get(index)
            .cloned()
            .ok_or(Error::StaleHandle("layer"))
    }

    /// Remove the stored layer at `index`, as counted by [`Glyph::all_layers`].
    pub fn remove_layer(&self, index: usize) -> Option<LayerData> {
        let removed = self.0.doc.restructure(|font| {
            let glyph = self.resolve_mut(font)?;
            (index < glyph.layers.len()).then(|| glyph.layers.remove(index))
        });
        if removed.is_some() {
            debug!("Removed layer {index} from glyph {}", self.0.index);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test::load_test_document;

    #[test]
    fn filtered_layers_follow_masters() {
        let font = load_test_document("layers.babelfont").font();
        let glyph = font.find_glyph("a").unwrap();

        assert_eq!(5, glyph.all_layers().len());
        let layers = glyph.layers();
        assert_eq!(
            vec![Some("bold-a".to_string()), Some("light-a".to_string())],
            layers.iter().map(|l| l.id()).collect::<Vec<_>>()
        );
        // same handles as the unfiltered view
        assert!(layers[0].same_handle(&glyph.all_layers()[3]));
    }

    #[test]
    fn find_layers() {
        let font = load_test_document("layers.babelfont").font();
        let glyph = font.find_glyph("a").unwrap();
        assert_eq!(
            Some(1),
            glyph.find_layer_by_id("light-a").map(|l| l.index())
        );
        assert_eq!(
            Some(Some("light-a".to_string())),
            glyph.find_layer_by_master_id("light").map(|l| l.id())
        );
        assert!(glyph.find_layer_by_master_id("orphan").is_some());
        assert!(glyph.find_layer_by_id("nope").is_none());
    }

    #[test]
    fn add_and_remove_layers() {
        let doc = load_test_document("layers.babelfont");
        let glyph = doc.font().find_glyph("a").unwrap();
        let before = glyph.all_layers();

        let layer = glyph
            .add_layer(640.0, Some(LayerMaster::AssociatedWithMaster("light".into())))
            .unwrap();
        assert_eq!(Some(640.0), layer.width());
        assert_eq!(6, glyph.all_layers().len());
        // an associated layer is not a master layer
        assert_eq!(2, glyph.layers().len());
        assert!(!before[0].same_handle(&glyph.all_layers()[0]));

        let removed = glyph.remove_layer(5).unwrap();
        assert_eq!(Some(640.0), removed.width);
        assert_eq!(None, glyph.remove_layer(17));
        assert_eq!(2, doc.context().edit_count());
    }

    #[test]
    fn glyph_properties() {
        let doc = load_test_document("layers.babelfont");
        let glyph = doc.font().find_glyph("a").unwrap();
        assert_eq!(Some(vec![0x61]), glyph.codepoints());
        assert_eq!(None, glyph.production_name());

        glyph.set_category("Mark".to_string());
        glyph.set_exported(Some(false));
        assert_eq!(Some("Mark".to_string()), glyph.category());
        assert_eq!(Some(false), glyph.exported());
        assert_eq!(2, doc.context().edit_count());
    }

    #[test]
    fn rename_keeps_names_unique() {
        let doc = load_test_document("components.babelfont");
        let font = doc.font();
        let stem = font.find_glyph("stem").unwrap();

        let result = stem.set_name("bar");
        assert!(
            matches!(&result, Err(Error::DuplicateGlyph(name)) if name.as_str() == "bar"),
            "{result:?}"
        );
        assert_eq!(Some(GlyphName::new("stem")), stem.name());
        assert!(!doc.is_dirty());

        stem.set_name("stem").unwrap();
        stem.set_name("stem.alt").unwrap();
        assert_eq!(2, doc.context().edit_count());
        assert_eq!(Some(stem), font.find_glyph("stem.alt"));
        assert_eq!(None, font.find_glyph("stem"));
    }
}
