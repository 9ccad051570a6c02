//! Per glyph measurements through the live object model.

use bitflags::bitflags;
use fontdoc::{store::Location, Document, Font, Glyph, GlyphName, Layer, LiveSlot};
use fontgeom::{bounds, Bounds, LayerMetrics, Outline, Segment, Sidebearings};
use log::{trace, warn};
use regex::Regex;
use serde::Serialize;

use crate::{error::Error, location::master_for_location};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// Resolve components into paths before measuring
        const FLATTEN_COMPONENTS = 0b0001;
        /// Anchors count towards bounds
        const INCLUDE_ANCHORS = 0b0010;
    }
}

impl Flags {
    pub fn outline(self) -> Outline {
        if self.contains(Flags::FLATTEN_COMPONENTS) {
            Outline::Flattened
        } else {
            Outline::Direct
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundsRecord {
    pub name: GlyphName,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebearingsRecord {
    pub name: GlyphName,
    pub width: Option<f64>,
    pub lsb: f64,
    pub rsb: f64,
    /// Sidebearings along a horizontal line, when one was asked for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Sidebearings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentsRecord {
    pub name: GlyphName,
    /// One list per path
    pub paths: Vec<Vec<Segment>>,
}

/// Measures glyphs of one document at one master.
pub struct Query {
    font: Font,
    master_id: Option<String>,
    flags: Flags,
}

impl Query {
    /// `location` is in user space, see
    /// [`master_for_location`](crate::location::master_for_location).
    pub fn new(doc: &Document, location: &Location, flags: Flags) -> Query {
        let master_id = doc.read(|font| master_for_location(font, location).map(|m| m.id.clone()));
        Query {
            font: doc.font(),
            master_id,
            flags,
        }
    }

    pub fn master_id(&self) -> Option<&str> {
        self.master_id.as_deref()
    }

    /// The named glyphs, or every glyph if `names` is empty, that match `filter`.
    pub fn select(&self, names: &[String], filter: Option<&Regex>) -> Vec<Glyph> {
        let glyphs = if names.is_empty() {
            self.font.glyphs()
        } else {
            names
                .iter()
                .filter_map(|name| {
                    let glyph = self.font.find_glyph(name);
                    if glyph.is_none() {
                        warn!("Glyph '{name}' not found, skipping");
                    }
                    glyph
                })
                .collect()
        };
        let Some(regex) = filter else {
            return glyphs;
        };
        glyphs
            .into_iter()
            .filter(|glyph| {
                let name = glyph.name().unwrap_or_default();
                let result = regex.is_match(name.as_str());
                if !result {
                    trace!("'{name}' does not match --glyph-name-filter");
                }
                result
            })
            .collect()
    }

    /// The layer of `glyph` drawn for this query's master.
    pub fn layer(&self, glyph: &Glyph) -> Option<Layer> {
        let index = glyph.read(|g| {
            let chosen = g.layer_for_master(self.master_id.as_deref())?;
            g.layers.iter().position(|l| std::ptr::eq(l, chosen))
        })??;
        glyph.all_layers().get(index).cloned()
    }

    fn measured(&self, glyph: &Glyph) -> Option<(GlyphName, Layer)> {
        let name = glyph.name()?;
        match self.layer(glyph) {
            Some(layer) => Some((name, layer)),
            None => {
                warn!("Glyph '{name}' has no layers, skipping");
                None
            }
        }
    }

    pub fn bounds(&self, glyph: &Glyph) -> Result<Option<BoundsRecord>, Error> {
        let Some((name, layer)) = self.measured(glyph) else {
            return Ok(None);
        };
        let paths = layer.paths(self.flags.outline())?;
        let anchors = layer.read(|l| l.anchors.clone()).unwrap_or_default();
        let bounds = bounds(
            &paths,
            &anchors,
            self.flags.contains(Flags::INCLUDE_ANCHORS),
            layer.width(),
        );
        Ok(Some(BoundsRecord { name, bounds }))
    }

    /// LSB and RSB always look at the flattened outline; `y` picks a line to
    /// measure along with the outline the flags ask for.
    pub fn sidebearings(
        &self,
        glyph: &Glyph,
        y: Option<f64>,
    ) -> Result<Option<SidebearingsRecord>, Error> {
        let Some((name, layer)) = self.measured(glyph) else {
            return Ok(None);
        };
        let at = match y {
            Some(y) => layer.sidebearings_at(y, self.flags.outline())?,
            None => None,
        };
        Ok(Some(SidebearingsRecord {
            name,
            width: layer.width(),
            lsb: layer.lsb()?,
            rsb: layer.rsb()?,
            at,
        }))
    }

    pub fn segments(&self, glyph: &Glyph) -> Result<Option<SegmentsRecord>, Error> {
        let Some((name, layer)) = self.measured(glyph) else {
            return Ok(None);
        };
        let paths = layer
            .paths(self.flags.outline())?
            .iter()
            .map(|path| path.segments())
            .collect();
        Ok(Some(SegmentsRecord { name, paths }))
    }
}

#[cfg(test)]
mod tests {
    use fontgeom::SegmentKind;
    use kurbo::Rect;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::test::load_test_document;

    fn names(glyphs: &[Glyph]) -> Vec<String> {
        glyphs
            .iter()
            .map(|g| g.name().unwrap().to_string())
            .collect()
    }

    fn at_wdth(value: f64) -> Location {
        [("wdth".to_string(), value)].into_iter().collect()
    }

    #[test]
    fn select_and_filter() {
        let doc = load_test_document("components.babelfont");
        let query = Query::new(&doc, &Location::new(), Flags::default());
        assert_eq!(
            vec!["bar", "stack", "nested", "stem", "ghost", "loop_a", "loop_b"],
            names(&query.select(&[], None))
        );
        let loops = Regex::new("^loop_").unwrap();
        assert_eq!(vec!["loop_a", "loop_b"], names(&query.select(&[], Some(&loops))));
        assert_eq!(
            vec!["loop_b"],
            names(&query.select(
                &["nope".to_string(), "loop_b".to_string(), "bar".to_string()],
                Some(&loops)
            ))
        );
    }

    #[test]
    fn layer_follows_location() {
        let doc = load_test_document("components.babelfont");
        let bar = doc.font().find_glyph("bar").unwrap();
        let query = Query::new(&doc, &at_wdth(50.0), Flags::default());
        assert_eq!(Some("m02"), query.master_id());
        assert_eq!(
            Some("bar-m02".to_string()),
            query.layer(&bar).and_then(|l| l.id())
        );
    }

    #[rstest]
    #[case::direct(Flags::empty(), Rect::new(50.0, 0.0, 60.0, 100.0))]
    #[case::flattened(Flags::FLATTEN_COMPONENTS, Rect::new(0.0, 0.0, 100.0, 100.0))]
    #[case::anchors(Flags::FLATTEN_COMPONENTS | Flags::INCLUDE_ANCHORS, Rect::new(0.0, 0.0, 100.0, 100.0))]
    fn bounds_by_flags(#[case] flags: Flags, #[case] expected: Rect) {
        let doc = load_test_document("components.babelfont");
        let stem = doc.font().find_glyph("stem").unwrap();
        let record = Query::new(&doc, &Location::new(), flags)
            .bounds(&stem)
            .unwrap()
            .unwrap();
        assert_eq!(expected, record.bounds.to_rect());
    }

    #[test]
    fn anchors_widen_bounds() {
        let doc = load_test_document("components.babelfont");
        let bar = doc.font().find_glyph("bar").unwrap();
        let flags = Flags::INCLUDE_ANCHORS;
        let record = Query::new(&doc, &Location::new(), flags)
            .bounds(&bar)
            .unwrap()
            .unwrap();
        assert_eq!(60.0, record.bounds.max_y);
    }

    #[test]
    fn sidebearing_record() {
        let doc = load_test_document("components.babelfont");
        let stem = doc.font().find_glyph("stem").unwrap();
        let query = Query::new(&doc, &Location::new(), Flags::default());
        assert_eq!(
            SidebearingsRecord {
                name: GlyphName::new("stem"),
                width: Some(120.0),
                lsb: 0.0,
                rsb: 20.0,
                at: Some(Sidebearings {
                    left: 50.0,
                    right: 60.0
                }),
            },
            query.sidebearings(&stem, Some(50.0)).unwrap().unwrap()
        );
        assert_eq!(None, query.sidebearings(&stem, None).unwrap().unwrap().at);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn segment_record() {
        let doc = load_test_document("components.babelfont");
        let stack = doc.font().find_glyph("stack").unwrap();
        let record = Query::new(&doc, &Location::new(), Flags::FLATTEN_COMPONENTS)
            .segments(&stack)
            .unwrap()
            .unwrap();
        assert_eq!(2, record.paths.len());
        assert!(record
            .paths
            .iter()
            .flatten()
            .all(|s| s.kind == SegmentKind::Line));
        assert_eq!(4, record.paths[1].len());
    }

    #[test]
    fn cycles_surface() {
        let doc = load_test_document("components.babelfont");
        let looped = doc.font().find_glyph("loop_a").unwrap();
        let query = Query::new(&doc, &Location::new(), Flags::FLATTEN_COMPONENTS);
        assert!(matches!(
            query.bounds(&looped),
            Err(Error::Geometry(fontgeom::Error::CyclicComponent(..)))
        ));
    }
}
