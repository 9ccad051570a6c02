use std::rc::Rc;

use kurbo::Affine;
use log::debug;
use serde_json::Value;

use crate::{
    document::Document,
    error::Error,
    store::{
        AnchorData, ComponentData, FontData, LayerData, LayerMaster, Location, PathData, ShapeData,
    },
};

use super::{
    font::Font,
    glyph::Glyph,
    marks::{Anchor, Guide},
    shape::{Component, Path, Shape},
    AnchorAddr, ChildCache, GuideAddr, GuideOwner, LayerAddr, LiveSlot, ShapeAddr,
};

struct LayerInner {
    doc: Document,
    addr: LayerAddr,
    shapes: ChildCache<Shape>,
    anchors: ChildCache<Anchor>,
    guides: ChildCache<Guide>,
}

#[derive(Clone)]
pub struct Layer(Rc<LayerInner>);

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("glyph", &self.0.addr.glyph)
            .field("layer", &self.0.addr.layer)
            .finish()
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.0.doc.same_document(&other.0.doc) && self.0.addr == other.0.addr
    }
}

impl LiveSlot for Layer {
    type Record = LayerData;

    fn document(&self) -> &Document {
        &self.0.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a LayerData> {
        self.0.addr.get(font)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut LayerData> {
        self.0.addr.get_mut(font)
    }
}

impl Layer {
    pub(crate) fn new(doc: Document, addr: LayerAddr) -> Layer {
        Layer(Rc::new(LayerInner {
            doc,
            addr,
            shapes: Default::default(),
            anchors: Default::default(),
            guides: Default::default(),
        }))
    }

    pub fn same_handle(&self, other: &Layer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Position among the glyph's stored layers.
    pub fn index(&self) -> usize {
        self.0.addr.layer
    }

    pub fn glyph(&self) -> Glyph {
        Glyph::new(self.0.doc.clone(), self.0.addr.glyph)
    }

    pub fn font(&self) -> Font {
        self.0.doc.font()
    }

    /// The advance width; `None` when unset or when the layer is gone.
    pub fn width(&self) -> Option<f64> {
        self.read(|l| l.width).flatten()
    }

    pub fn set_width(&self, width: f64) {
        self.update(|l| l.width = Some(width));
    }

    live_fields! {
        is_background, set_is_background: bool;
    }

    live_optional_fields! {
        name, set_name: String;
        id, set_id: String;
        color, set_color: Value;
        layer_index, set_layer_index: i32;
        background_layer_id, set_background_layer_id: String;
        location, set_location: Location;
        master, set_master: LayerMaster;
        format_specific, set_format_specific: Value;
    }

    pub fn master_id(&self) -> Option<String> {
        self.read(|l| l.master_id().map(str::to_string)).flatten()
    }

    pub fn shapes(&self) -> Vec<Shape> {
        let len = self.read(|l| l.shapes.len()).unwrap_or_default();
        self.0.shapes.get(len, self.0.doc.generation(), |shape| {
            Shape::new(
                self.0.doc.clone(),
                ShapeAddr {
                    layer: self.0.addr,
                    shape,
                },
            )
        })
    }

    pub fn anchors(&self) -> Vec<Anchor> {
        let len = self.read(|l| l.anchors.len()).unwrap_or_default();
        self.0.anchors.get(len, self.0.doc.generation(), |anchor| {
            Anchor::new(
                self.0.doc.clone(),
                AnchorAddr {
                    layer: self.0.addr,
                    anchor,
                },
            )
        })
    }

    pub fn guides(&self) -> Vec<Guide> {
        let len = self.read(|l| l.guides.len()).unwrap_or_default();
        self.0.guides.get(len, self.0.doc.generation(), |guide| {
            Guide::new(
                self.0.doc.clone(),
                GuideAddr {
                    owner: GuideOwner::Layer(self.0.addr),
                    guide,
                },
            )
        })
    }

    /// Append a shape on top of the existing ones.
    pub fn add_shape(&self, shape: ShapeData) -> Result<Shape, Error> {
        let index = self
            .0
            .doc
            .restructure(|font| {
                let layer = self.resolve_mut(font)?;
                layer.shapes.push(shape);
                Some(layer.shapes.len() - 1)
            })
            .ok_or(Error::StaleHandle("layer"))?;
        debug!("Added shape {index} to {:?}", self.0.addr);
        self.shapes()
            .get(index)
            .cloned()
            .ok_or(Error::StaleHandle("shape"))
    }

    /// Append an empty path.
    pub fn add_path(&self, closed: bool) -> Result<Path, Error> {
        self.add_shape(ShapeData::Path(PathData::new(closed)))?
            .as_path()
    }

    pub fn add_component(
        &self,
        reference: &str,
        transform: Option<Affine>,
    ) -> Result<Component, Error> {
        self.add_shape(ShapeData::Component(ComponentData::new(reference, transform)))?
            .as_component()
    }

    pub fn remove_shape(&self, index: usize) -> Option<ShapeData> {
        let removed = self.0.doc.restructure(|font| {
            let layer = self.resolve_mut(font)?;
            (index < layer.shapes.len()).then(|| layer.shapes.remove(index))
        });
        if removed.is_some() {
            debug!("Removed shape {index} from {:?}", self.0.addr);
        }
        removed
    }

    pub fn add_anchor(&self, x: f64, y: f64, name: Option<&str>) -> Result<Anchor, Error> {
        let index = self
            .0
            .doc
            .restructure(|font| {
                let layer = self.resolve_mut(font)?;
                layer.anchors.push(AnchorData {
                    x,
                    y,
                    name: name.map(str::to_string),
                    format_specific: None,
                });
                Some(layer.anchors.len() - 1)
            })
            .ok_or(Error::StaleHandle("layer"))?;
        self.anchors()
            .get(index)
            .cloned()
            .ok_or(Error::StaleHandle("anchor"))
    }

    pub fn remove_anchor(&self, index: usize) -> Option<AnchorData> {
        self.0.doc.restructure(|font| {
            let layer = self.resolve_mut(font)?;
            (index < layer.anchors.len()).then(|| layer.anchors.remove(index))
        })
    }
}
