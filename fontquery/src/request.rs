//! Batch outline requests.

use fontdoc::{store::Location, Document, FontData, GlyphName, NodeStorage, PathData, ShapeData};
use fontgeom::{direct_paths, flatten, Bounds, FlatPath};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{error::Error, location::master_for_location};

/// Outlines for a set of glyphs at one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRequest {
    pub glyph_names: Vec<String>,
    /// User space coordinates by axis tag; empty means the default location
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub flatten_components: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineRecord {
    pub name: GlyphName,
    pub width: Option<f64>,
    pub shapes: Vec<ShapeData>,
    pub bounds: OutlineBounds,
}

/// The box of every path node of an outline record, all zero if there are
/// none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineBounds {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl OutlineBounds {
    fn of_shapes(shapes: &[ShapeData]) -> OutlineBounds {
        let points = direct_paths(shapes)
            .into_iter()
            .flat_map(|path| path.nodes)
            .map(|node| node.point());
        Bounds::of_points(points)
            .map(|b| OutlineBounds {
                x_min: b.min_x,
                y_min: b.min_y,
                x_max: b.max_x,
                y_max: b.max_y,
            })
            .unwrap_or_default()
    }
}

fn path_shape(path: FlatPath) -> ShapeData {
    ShapeData::Path(PathData {
        nodes: NodeStorage::Parsed(path.nodes),
        closed: path.closed,
        format_specific: None,
    })
}

impl OutlineRequest {
    /// Answer the request against `font`.
    ///
    /// Names the font has no glyph for are skipped, as are glyphs without
    /// layers. Flattening a glyph whose components form a cycle fails the
    /// whole request.
    pub fn resolve(&self, font: &FontData) -> Result<Vec<OutlineRecord>, Error> {
        let master_id = master_for_location(font, &self.location).map(|m| m.id.as_str());
        debug!(
            "{} outlines at {:?}, master {master_id:?}",
            self.glyph_names.len(),
            self.location
        );

        let mut records = Vec::with_capacity(self.glyph_names.len());
        for name in self.glyph_names.iter() {
            let Some(glyph) = font.glyph(name) else {
                warn!("Glyph '{name}' not found, skipping");
                continue;
            };
            let Some(layer) = glyph.layer_for_master(master_id) else {
                warn!("Glyph '{name}' has no layers, skipping");
                continue;
            };
            let shapes: Vec<ShapeData> = if self.flatten_components {
                flatten(&layer.shapes, font, master_id)?
                    .into_iter()
                    .map(path_shape)
                    .collect()
            } else {
                layer.shapes.clone()
            };
            records.push(OutlineRecord {
                name: glyph.name.clone(),
                width: layer.width,
                bounds: OutlineBounds::of_shapes(&shapes),
                shapes,
            });
        }
        Ok(records)
    }

    /// Answer the request against the document as it is now.
    pub fn resolve_in(&self, doc: &Document) -> Result<Vec<OutlineRecord>, Error> {
        doc.read(|font| self.resolve(font))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::test::load_test_document;

    fn request(names: &[&str], location: &[(&str, f64)], flatten: bool) -> OutlineRequest {
        OutlineRequest {
            glyph_names: names.iter().map(|n| n.to_string()).collect(),
            location: location.iter().map(|(t, v)| (t.to_string(), *v)).collect(),
            flatten_components: flatten,
        }
    }

    #[test]
    fn request_reads_camel_case() {
        let raw = r#"{"glyphNames": ["a"], "location": {"wght": 100}, "flattenComponents": true}"#;
        assert_eq!(
            request(&["a"], &[("wght", 100.0)], true),
            serde_json::from_str::<OutlineRequest>(raw).unwrap()
        );
        let bare: OutlineRequest = serde_json::from_str(r#"{"glyphNames": []}"#).unwrap();
        assert!(bare.location.is_empty());
        assert!(!bare.flatten_components);
    }

    #[test]
    fn location_picks_the_layer() {
        let doc = load_test_document("layers.babelfont");
        let light = request(&["a"], &[("wght", 100.0)], false)
            .resolve_in(&doc)
            .unwrap();
        assert_eq!(Some(480.0), light[0].width);
        assert_eq!(
            OutlineBounds {
                x_min: 40.0,
                y_min: 0.0,
                x_max: 440.0,
                y_max: 500.0,
            },
            light[0].bounds
        );

        // nothing sits at the default weight, the first master stands in
        let default = request(&["a"], &[], false).resolve_in(&doc).unwrap();
        assert_eq!(Some(520.0), default[0].width);
    }

    #[test]
    fn missing_glyphs_are_skipped() {
        let doc = load_test_document("square.babelfont");
        let records = request(&["nope", "square", "space"], &[], false)
            .resolve_in(&doc)
            .unwrap();
        assert_eq!(
            vec!["square", "space"],
            records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(OutlineBounds::default(), records[1].bounds);
    }

    #[test]
    fn flattened_records() {
        let doc = load_test_document("components.babelfont");
        let records = request(&["stack"], &[("wdth", 50.0)], true)
            .resolve_in(&doc)
            .unwrap();
        let record = &records[0];
        assert_eq!(2, record.shapes.len());
        assert!(record
            .shapes
            .iter()
            .all(|s| matches!(s, ShapeData::Path(..))));
        // m02 draws bar 200 wide
        assert_eq!(200.0, record.bounds.x_max);
        assert_eq!(220.0, record.bounds.y_max);
    }

    #[test]
    fn unflattened_components_have_no_bounds() {
        let doc = load_test_document("components.babelfont");
        let records = request(&["stack"], &[], false).resolve_in(&doc).unwrap();
        assert!(records[0]
            .shapes
            .iter()
            .all(|s| matches!(s, ShapeData::Component(..))));
        assert_eq!(OutlineBounds::default(), records[0].bounds);
    }

    #[test]
    fn cycles_fail_the_request() {
        let doc = load_test_document("components.babelfont");
        assert!(matches!(
            request(&["square", "loop_a"], &[], true).resolve_in(&doc),
            Err(Error::Geometry(fontgeom::Error::CyclicComponent(..)))
        ));
    }

    #[test]
    fn record_json() {
        let doc = load_test_document("square.babelfont");
        let records = request(&["square"], &[], false).resolve_in(&doc).unwrap();
        assert_eq!(
            json!([{
                "name": "square",
                "width": 150.0,
                "shapes": [{"Path": {"nodes": "0 0 l 100 0 l 100 100 l 0 100 l", "closed": true}}],
                "bounds": {"xMin": 0.0, "yMin": 0.0, "xMax": 100.0, "yMax": 100.0}
            }]),
            serde_json::to_value(&records).unwrap()
        );
    }
}
