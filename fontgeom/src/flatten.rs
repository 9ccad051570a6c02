//! Resolving components into plain paths.

use fontdoc::{FontData, GlyphName, Layer, LiveSlot, NodeData, ShapeData};
use kurbo::Affine;
use log::{trace, warn};
use serde::Serialize;

use crate::{
    error::Error,
    segment::{segment, Segment},
};

/// A path with every node already in the coordinate space of the layer that
/// was flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatPath {
    pub nodes: Vec<NodeData>,
    pub closed: bool,
}

impl FlatPath {
    pub fn segments(&self) -> Vec<Segment> {
        segment(&self.nodes, self.closed)
    }
}

/// Resolve every component in `shapes`, depth first, into paths.
///
/// Referenced glyphs are drawn with their layer for `master_id`, see
/// [`fontdoc::GlyphData::layer_for_master`]. References to glyphs the font
/// does not have draw nothing. A glyph that ends up referencing itself is an
/// error; the same glyph used twice side by side is not.
pub fn flatten(
    shapes: &[ShapeData],
    font: &FontData,
    master_id: Option<&str>,
) -> Result<Vec<FlatPath>, Error> {
    let mut flattener = Flattener {
        font,
        master_id,
        chain: Vec::new(),
        paths: Vec::new(),
    };
    flattener.visit(shapes, Affine::IDENTITY)?;
    Ok(flattener.paths)
}

/// Only the layer's own paths, untransformed.
pub fn direct_paths(shapes: &[ShapeData]) -> Vec<FlatPath> {
    shapes
        .iter()
        .filter_map(|shape| match shape {
            ShapeData::Path(path) => Some(FlatPath {
                nodes: path.nodes.to_nodes().into_owned(),
                closed: path.closed,
            }),
            ShapeData::Component(_) => None,
        })
        .collect()
}

/// Flatten a live layer; a layer that is no longer in the document has no paths.
pub fn flatten_layer(layer: &Layer) -> Result<Vec<FlatPath>, Error> {
    layer.document().read(|font| {
        let Some(data) = layer.resolve(font) else {
            return Ok(Vec::new());
        };
        let mut flattener = Flattener {
            font,
            master_id: data.master_id(),
            chain: Vec::new(),
            paths: Vec::new(),
        };
        if let Some(glyph) = layer.glyph().resolve(font) {
            flattener.chain.push(glyph.name.clone());
        }
        flattener.visit(&data.shapes, Affine::IDENTITY)?;
        Ok(flattener.paths)
    })
}

struct Flattener<'a> {
    font: &'a FontData,
    master_id: Option<&'a str>,
    // glyphs on the way down from the root, for cycle detection
    chain: Vec<GlyphName>,
    paths: Vec<FlatPath>,
}

impl Flattener<'_> {
    fn visit(&mut self, shapes: &[ShapeData], transform: Affine) -> Result<(), Error> {
        for shape in shapes {
            match shape {
                ShapeData::Path(path) => self.paths.push(FlatPath {
                    nodes: path
                        .nodes
                        .to_nodes()
                        .iter()
                        .map(|node| transform_node(node, transform))
                        .collect(),
                    closed: path.closed,
                }),
                ShapeData::Component(component) => {
                    let reference = &component.reference;
                    if self.chain.contains(reference) {
                        let mut chain = self.chain.clone();
                        chain.push(reference.clone());
                        return Err(Error::CyclicComponent(chain));
                    }
                    let Some(glyph) = self.font.glyph(reference.as_str()) else {
                        warn!("Component references missing glyph '{reference}'");
                        continue;
                    };
                    let Some(layer) = glyph.layer_for_master(self.master_id) else {
                        warn!("Component references '{reference}' which has no layers");
                        continue;
                    };
                    let transform = transform * component.affine();
                    trace!("Flatten '{reference}' with {transform:?}");
                    self.chain.push(reference.clone());
                    self.visit(&layer.shapes, transform)?;
                    self.chain.pop();
                }
            }
        }
        Ok(())
    }
}

/// Only the position changes; type and smoothness carry over.
fn transform_node(node: &NodeData, transform: Affine) -> NodeData {
    let point = transform * node.point();
    NodeData {
        x: point.x,
        y: point.y,
        ..node.clone()
    }
}
