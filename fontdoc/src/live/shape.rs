use std::{cell::OnceCell, rc::Rc};

use kurbo::{Affine, Point};
use log::debug;
use serde_json::Value;

use crate::{
    document::Document,
    error::Error,
    nodes::{NodeData, NodeType},
    store::{ComponentData, FontData, PathData, ShapeData, ShapeKind},
    transform::{DecomposedTransform, TransformData},
    types::GlyphName,
};

use super::{glyph::Glyph, layer::Layer, ChildCache, LiveSlot, NodeAddr, ShapeAddr};

struct ShapeInner {
    doc: Document,
    addr: ShapeAddr,
    path: OnceCell<Path>,
    component: OnceCell<Component>,
}

/// One entry of a layer's shape list, either a [`Path`] or a [`Component`].
#[derive(Clone)]
pub struct Shape(Rc<ShapeInner>);

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape")
            .field("addr", &self.0.addr)
            .field("kind", &self.kind())
            .finish()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.0.doc.same_document(&other.0.doc) && self.0.addr == other.0.addr
    }
}

impl LiveSlot for Shape {
    type Record = ShapeData;

    fn document(&self) -> &Document {
        &self.0.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a ShapeData> {
        self.0.addr.get(font)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut ShapeData> {
        self.0.addr.get_mut(font)
    }
}

impl Shape {
    pub(crate) fn new(doc: Document, addr: ShapeAddr) -> Shape {
        Shape(Rc::new(ShapeInner {
            doc,
            addr,
            path: OnceCell::new(),
            component: OnceCell::new(),
        }))
    }

    pub fn same_handle(&self, other: &Shape) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Position in the layer's shape list, which is also its z-order.
    pub fn index(&self) -> usize {
        self.0.addr.shape
    }

    pub fn layer(&self) -> Layer {
        Layer::new(self.0.doc.clone(), self.0.addr.layer)
    }

    pub fn kind(&self) -> Option<ShapeKind> {
        self.read(ShapeData::kind)
    }

    pub fn is_path(&self) -> bool {
        self.kind() == Some(ShapeKind::Path)
    }

    pub fn is_component(&self) -> bool {
        self.kind() == Some(ShapeKind::Component)
    }

    fn expect_kind(&self, expected: ShapeKind) -> Result<(), Error> {
        let actual = self.kind().ok_or(Error::StaleHandle("shape"))?;
        if actual != expected {
            return Err(Error::WrongShapeKind {
                index: self.0.addr.shape,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// View this shape as a path.
    ///
    /// Asking a component for its path is an error, not an empty path.
    pub fn as_path(&self) -> Result<Path, Error> {
        self.expect_kind(ShapeKind::Path)?;
        Ok(self
            .0
            .path
            .get_or_init(|| Path::new(self.0.doc.clone(), self.0.addr))
            .clone())
    }

    pub fn as_component(&self) -> Result<Component, Error> {
        self.expect_kind(ShapeKind::Component)?;
        Ok(self
            .0
            .component
            .get_or_init(|| Component::new(self.0.doc.clone(), self.0.addr))
            .clone())
    }
}

struct PathInner {
    doc: Document,
    addr: ShapeAddr,
    nodes: ChildCache<Node>,
}

#[derive(Clone)]
pub struct Path(Rc<PathInner>);

impl std::fmt::Debug for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Path").field(&self.0.addr).finish()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.0.doc.same_document(&other.0.doc) && self.0.addr == other.0.addr
    }
}

impl LiveSlot for Path {
    type Record = PathData;

    fn document(&self) -> &Document {
        &self.0.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a PathData> {
        match self.0.addr.get(font)? {
            ShapeData::Path(path) => Some(path),
            ShapeData::Component(_) => None,
        }
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut PathData> {
        match self.0.addr.get_mut(font)? {
            ShapeData::Path(path) => Some(path),
            ShapeData::Component(_) => None,
        }
    }
}

impl Path {
    /// A path wrapper; upgrades compact node storage to a node list first.
    ///
    /// The upgrade rewrites the store into an equivalent form, it is not an
    /// edit and does not mark the document dirty.
    pub(crate) fn new(doc: Document, addr: ShapeAddr) -> Path {
        let path = Path(Rc::new(PathInner {
            doc,
            addr,
            nodes: Default::default(),
        }));
        path.upgrade_nodes();
        path
    }

    /// Borrows the store mutably only while the slot is still compact.
    fn upgrade_nodes(&self) {
        if !self.read(|p| p.nodes.is_compact()).unwrap_or(false) {
            return;
        }
        let upgraded = self.0.doc.normalize(|font| match self.resolve_mut(font) {
            Some(path) if path.nodes.is_compact() => Some(path.nodes.normalize().len()),
            _ => None,
        });
        if let Some(count) = upgraded {
            debug!("Parsed {count} compact nodes of {:?}", self.0.addr);
        }
    }

    pub fn same_handle(&self, other: &Path) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.0.doc.clone(), self.0.addr)
    }

    live_fields! {
        closed, set_closed: bool;
    }

    live_optional_fields! {
        format_specific, set_format_specific: Value;
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.upgrade_nodes();
        let len = self.read(|p| p.nodes.len()).unwrap_or_default();
        self.0.nodes.get(len, self.0.doc.generation(), |node| {
            Node::new(
                self.0.doc.clone(),
                NodeAddr {
                    shape: self.0.addr,
                    node,
                },
            )
        })
    }

    /// A copy of the node records.
    pub fn node_data(&self) -> Vec<NodeData> {
        self.read(|p| p.nodes.to_nodes().into_owned())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.read(|p| p.nodes.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a node before `index`; an index past the end appends.
    pub fn insert_node(&self, index: usize, node: NodeData) -> Result<Node, Error> {
        let index = self
            .0
            .doc
            .restructure(|font| {
                let nodes = self.resolve_mut(font)?.nodes.normalize();
                let index = index.min(nodes.len());
                nodes.insert(index, node);
                Some(index)
            })
            .ok_or(Error::StaleHandle("path"))?;
        self.nodes()
            .get(index)
            .cloned()
            .ok_or(Error::StaleHandle("node"))
    }

    pub fn append_node(&self, x: f64, y: f64, nodetype: NodeType) -> Result<Node, Error> {
        self.insert_node(usize::MAX, NodeData::new(x, y, nodetype))
    }

    pub fn remove_node(&self, index: usize) -> Option<NodeData> {
        self.0.doc.restructure(|font| {
            let nodes = self.resolve_mut(font)?.nodes.normalize();
            (index < nodes.len()).then(|| nodes.remove(index))
        })
    }

    /// Replace every node in one edit.
    pub fn set_nodes(&self, nodes: Vec<NodeData>) {
        self.0.doc.restructure(|font| {
            self.resolve_mut(font)?.nodes = nodes.into();
            Some(())
        });
    }
}

#[derive(Clone)]
pub struct Node {
    doc: Document,
    addr: NodeAddr,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Node").field(&self.addr).finish()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.addr == other.addr
    }
}

impl LiveSlot for Node {
    type Record = NodeData;

    fn document(&self) -> &Document {
        &self.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a NodeData> {
        match self.addr.shape.get(font)? {
            ShapeData::Path(path) => path.nodes.parsed()?.get(self.addr.node),
            ShapeData::Component(_) => None,
        }
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut NodeData> {
        match self.addr.shape.get_mut(font)? {
            ShapeData::Path(path) => path.nodes.parsed_mut()?.get_mut(self.addr.node),
            ShapeData::Component(_) => None,
        }
    }
}

impl Node {
    pub(crate) fn new(doc: Document, addr: NodeAddr) -> Node {
        Node { doc, addr }
    }

    pub fn index(&self) -> usize {
        self.addr.node
    }

    pub fn path(&self) -> Path {
        Path::new(self.doc.clone(), self.addr.shape)
    }

    live_fields! {
        x, set_x: f64;
        y, set_y: f64;
        nodetype, set_nodetype: NodeType;
        smooth, set_smooth: Option<bool>;
    }

    pub fn point(&self) -> Option<Point> {
        self.read(NodeData::point)
    }

    /// Move the node as a single edit.
    pub fn set_point(&self, point: Point) {
        self.update(|n| {
            n.x = point.x;
            n.y = point.y;
        });
    }
}

#[derive(Clone)]
pub struct Component {
    doc: Document,
    addr: ShapeAddr,
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("addr", &self.addr)
            .field("reference", &self.reference())
            .finish()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.addr == other.addr
    }
}

impl LiveSlot for Component {
    type Record = ComponentData;

    fn document(&self) -> &Document {
        &self.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a ComponentData> {
        match self.addr.get(font)? {
            ShapeData::Component(component) => Some(component),
            ShapeData::Path(_) => None,
        }
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut ComponentData> {
        match self.addr.get_mut(font)? {
            ShapeData::Component(component) => Some(component),
            ShapeData::Path(_) => None,
        }
    }
}

impl Component {
    pub(crate) fn new(doc: Document, addr: ShapeAddr) -> Component {
        Component { doc, addr }
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.doc.clone(), self.addr)
    }

    live_fields! {
        reference, set_reference: GlyphName;
    }

    live_optional_fields! {
        format_specific, set_format_specific: Value;
    }

    /// The transform, identity when the record has none.
    pub fn transform(&self) -> Option<Affine> {
        self.read(ComponentData::affine)
    }

    pub fn set_transform(&self, transform: Affine) {
        self.update(|c| c.transform = Some(transform.into()));
    }

    pub fn decomposed_transform(&self) -> Option<DecomposedTransform> {
        self.read(|c| match c.transform {
            Some(TransformData::Decomposed(decomposed)) => decomposed,
            _ => DecomposedTransform::from_affine(c.affine()),
        })
    }

    pub fn set_decomposed_transform(&self, transform: DecomposedTransform) {
        self.update(|c| c.transform = Some(TransformData::Decomposed(transform)));
    }

    /// The glyph this component draws, if the font has it.
    pub fn referenced_glyph(&self) -> Option<Glyph> {
        let reference = self.reference()?;
        self.doc.font().find_glyph(reference.as_str())
    }
}
