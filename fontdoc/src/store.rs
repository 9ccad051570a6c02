//! serde records making up the document store.
//!
//! These are the single source of truth. Field names follow the babelfont
//! JSON layout; anything we do not model explicitly survives a load/save
//! cycle through the flattened `other` maps.

use std::collections::BTreeMap;
use std::fmt::Display;

use indexmap::IndexMap;
use kurbo::Affine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{nodes::NodeStorage, transform::TransformData, types::GlyphName};

/// Language tag to localized string.
pub type I18NDictionary = BTreeMap<String, String>;

/// Axis tag to coordinate, in axis order.
pub type Location = IndexMap<String, f64>;

fn default_upm() -> u16 {
    1000
}

fn default_version() -> (u16, u16) {
    (1, 0)
}

fn default_category() -> String {
    "Unknown".to_string()
}

fn default_closed() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontData {
    #[serde(default = "default_upm")]
    pub upm: u16,
    #[serde(default = "default_version")]
    pub version: (u16, u16),
    #[serde(default)]
    pub axes: Vec<AxisData>,
    #[serde(default)]
    pub instances: Vec<InstanceData>,
    #[serde(default)]
    pub masters: Vec<MasterData>,
    #[serde(default)]
    pub glyphs: Vec<GlyphData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub names: BTreeMap<String, I18NDictionary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ot_values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_sequences: Option<Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub features: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_kern_groups: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_kern_groups: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Default for FontData {
    fn default() -> Self {
        FontData {
            upm: default_upm(),
            version: default_version(),
            axes: Vec::new(),
            instances: Vec::new(),
            masters: Vec::new(),
            glyphs: Vec::new(),
            note: None,
            date: None,
            names: BTreeMap::new(),
            custom_ot_values: None,
            variation_sequences: None,
            features: Value::Null,
            first_kern_groups: None,
            second_kern_groups: None,
            format_specific: None,
            source: None,
            other: BTreeMap::new(),
        }
    }
}

impl FontData {
    pub fn glyph_index(&self, name: &str) -> Option<usize> {
        self.glyphs.iter().position(|g| g.name == name)
    }

    pub fn glyph(&self, name: &str) -> Option<&GlyphData> {
        self.glyphs.iter().find(|g| g.name == name)
    }

    pub fn master(&self, id: &str) -> Option<&MasterData> {
        self.masters.iter().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisData {
    #[serde(default)]
    pub name: I18NDictionary,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
    /// `[user, design]` pairs of a piecewise linear map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Vec<(f64, f64)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatspecific: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterData {
    #[serde(default)]
    pub name: I18NDictionary,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub guides: Vec<GuideData>,
    #[serde(default)]
    pub metrics: IndexMap<String, f64>,
    #[serde(default)]
    pub kerning: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ot_values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: I18NDictionary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub custom_names: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphData {
    pub name: GlyphName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_name: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub codepoints: Vec<u32>,
    #[serde(default)]
    pub layers: Vec<LayerData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatspecific: Option<Value>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl GlyphData {
    pub fn new(name: impl Into<GlyphName>, category: impl Into<String>) -> GlyphData {
        GlyphData {
            name: name.into(),
            production_name: None,
            category: category.into(),
            codepoints: Vec::new(),
            layers: Vec::new(),
            exported: None,
            direction: None,
            formatspecific: None,
            other: BTreeMap::new(),
        }
    }

    /// Indices of the foreground layer drawn for each master, in master order.
    ///
    /// Background layers, extra copies and layers for masters the font no
    /// longer has are left out.
    pub fn master_layer_indices(&self, masters: &[MasterData]) -> Vec<usize> {
        masters
            .iter()
            .filter_map(|master| {
                self.layers
                    .iter()
                    .position(|l| !l.is_background && l.is_default_for(&master.id))
            })
            .collect()
    }

    /// The layer to draw when this glyph is used at `master_id`.
    ///
    /// Prefers the foreground layer that is default for the master, then any
    /// foreground layer associated with it, then the first layer.
    pub fn layer_for_master(&self, master_id: Option<&str>) -> Option<&LayerData> {
        let foreground = || self.layers.iter().filter(|l| !l.is_background);
        master_id
            .and_then(|id| {
                foreground()
                    .find(|l| l.is_default_for(id))
                    .or_else(|| foreground().find(|l| l.master_id() == Some(id)))
            })
            .or_else(|| self.layers.first())
    }
}

/// How a layer relates to a master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerMaster {
    DefaultForMaster(String),
    AssociatedWithMaster(String),
}

impl LayerMaster {
    pub fn id(&self) -> &str {
        match self {
            LayerMaster::DefaultForMaster(id) | LayerMaster::AssociatedWithMaster(id) => id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub guides: Vec<GuideData>,
    #[serde(default)]
    pub shapes: Vec<ShapeData>,
    #[serde(default)]
    pub anchors: Vec<AnchorData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_index: Option<i32>,
    #[serde(default)]
    pub is_background: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_layer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<LayerMaster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl LayerData {
    pub fn master_id(&self) -> Option<&str> {
        self.master.as_ref().map(LayerMaster::id)
    }

    pub fn is_default_for(&self, master_id: &str) -> bool {
        matches!(&self.master, Some(LayerMaster::DefaultForMaster(id)) if id == master_id)
    }

    /// Move every path node, component and anchor by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for shape in self.shapes.iter_mut() {
            match shape {
                ShapeData::Path(path) => {
                    for node in path.nodes.normalize().iter_mut() {
                        node.x += dx;
                        node.y += dy;
                    }
                }
                ShapeData::Component(component) => component
                    .transform
                    .get_or_insert_with(TransformData::default)
                    .translate(dx, dy),
            }
        }
        for anchor in self.anchors.iter_mut() {
            anchor.x += dx;
            anchor.y += dy;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Path,
    Component,
}

impl Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeKind::Path => f.write_str("path"),
            ShapeKind::Component => f.write_str("component"),
        }
    }
}

/// A layer shape, serialized as a single key object: `{"Path": {..}}` or
/// `{"Component": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeData {
    Path(PathData),
    Component(ComponentData),
}

impl ShapeData {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeData::Path(_) => ShapeKind::Path,
            ShapeData::Component(_) => ShapeKind::Component,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    #[serde(default)]
    pub nodes: NodeStorage,
    #[serde(default = "default_closed")]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
}

impl PathData {
    pub fn new(closed: bool) -> PathData {
        PathData {
            nodes: NodeStorage::default(),
            closed,
            format_specific: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub reference: GlyphName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
}

impl ComponentData {
    pub fn new(reference: impl Into<GlyphName>, transform: Option<Affine>) -> ComponentData {
        ComponentData {
            reference: reference.into(),
            transform: transform.map(TransformData::from),
            format_specific: None,
        }
    }

    /// The transform, identity when the document has none.
    pub fn affine(&self) -> Affine {
        self.transform
            .as_ref()
            .map(TransformData::to_affine)
            .unwrap_or(Affine::IDENTITY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorData {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideData {
    #[serde(default)]
    pub pos: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_specific: Option<Value>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::nodes::{NodeData, NodeType};

    fn layer(master: Option<LayerMaster>, is_background: bool, width: f64) -> LayerData {
        LayerData {
            width: Some(width),
            master,
            is_background,
            ..Default::default()
        }
    }

    fn master(id: &str) -> MasterData {
        MasterData {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn shapes_are_single_key_objects() {
        let shapes: Vec<ShapeData> = serde_json::from_str(
            r#"[
                {"Path": {"nodes": "0 0 l 10 0 l", "closed": false}},
                {"Component": {"reference": "acute", "transform": [1, 0, 0, 1, 5, 6]}}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            vec![ShapeKind::Path, ShapeKind::Component],
            shapes.iter().map(ShapeData::kind).collect::<Vec<_>>()
        );
        let ShapeData::Component(component) = &shapes[1] else {
            panic!("{shapes:?}");
        };
        assert_eq!(
            Affine::translate((5.0, 6.0)),
            component.affine(),
            "{component:?}"
        );
    }

    #[test]
    fn missing_collections_are_empty() {
        let glyph: GlyphData = serde_json::from_str(r#"{"name": "space"}"#).unwrap();
        assert!(glyph.layers.is_empty());
        assert_eq!("Unknown", glyph.category);

        let layer: LayerData = serde_json::from_str("{}").unwrap();
        assert!(layer.shapes.is_empty() && layer.anchors.is_empty() && layer.guides.is_empty());
        assert_eq!(None, layer.width);
    }

    #[test]
    fn unknown_keys_survive() {
        let raw = r#"{"upm": 2048, "glyphs": [], "com.example.flavour": "salty"}"#;
        let font: FontData = serde_json::from_str(raw).unwrap();
        assert_eq!(2048, font.upm);
        let round_tripped: Value = serde_json::to_value(&font).unwrap();
        assert_eq!(
            Some("salty"),
            round_tripped["com.example.flavour"].as_str()
        );
    }

    #[test]
    fn master_layers_in_master_order() {
        let mut glyph = GlyphData::new("a", "Base");
        glyph.layers = vec![
            layer(Some(LayerMaster::DefaultForMaster("bold".into())), false, 1.0),
            layer(Some(LayerMaster::DefaultForMaster("light".into())), true, 2.0),
            layer(Some(LayerMaster::DefaultForMaster("light".into())), false, 3.0),
            layer(Some(LayerMaster::DefaultForMaster("gone".into())), false, 4.0),
            layer(Some(LayerMaster::AssociatedWithMaster("bold".into())), false, 5.0),
            layer(Some(LayerMaster::DefaultForMaster("bold".into())), false, 6.0),
        ];
        assert_eq!(
            vec![2, 0],
            glyph.master_layer_indices(&[master("light"), master("bold")])
        );
    }

    #[test]
    fn layer_for_master_falls_back() {
        let mut glyph = GlyphData::new("a", "Base");
        glyph.layers = vec![
            layer(None, false, 1.0),
            layer(Some(LayerMaster::AssociatedWithMaster("m2".into())), false, 2.0),
            layer(Some(LayerMaster::DefaultForMaster("m3".into())), true, 3.0),
        ];
        let width = |id| glyph.layer_for_master(id).and_then(|l| l.width);
        assert_eq!(Some(2.0), width(Some("m2")));
        assert_eq!(Some(1.0), width(Some("m3")));
        assert_eq!(Some(1.0), width(None));
    }

    #[test]
    fn translate_moves_everything() {
        let mut layer = LayerData {
            shapes: vec![
                ShapeData::Path(PathData {
                    nodes: NodeStorage::Compact("0 0 l 10 0 l".to_string()),
                    closed: true,
                    format_specific: None,
                }),
                ShapeData::Component(ComponentData::new("b", None)),
            ],
            anchors: vec![AnchorData {
                x: 1.0,
                y: 1.0,
                ..Default::default()
            }],
            ..Default::default()
        };
        layer.translate(5.0, -1.0);

        let ShapeData::Path(path) = &layer.shapes[0] else {
            panic!("{layer:?}");
        };
        assert_eq!(
            Some(
                &[
                    NodeData::new(5.0, -1.0, NodeType::Line),
                    NodeData::new(15.0, -1.0, NodeType::Line)
                ][..]
            ),
            path.nodes.parsed()
        );
        let ShapeData::Component(component) = &layer.shapes[1] else {
            panic!("{layer:?}");
        };
        assert_eq!(Affine::translate((5.0, -1.0)), component.affine());
        assert_eq!((6.0, 0.0), (layer.anchors[0].x, layer.anchors[0].y));
    }
}
