//! Sidebearings, measured and set.

use fontdoc::{error::Error as DocError, Layer, LiveSlot};
use kurbo::Point;
use log::debug;
use serde::Serialize;

use crate::{
    bounds::{layer_bounds, Bounds},
    error::Error,
    flatten::{direct_paths, flatten_layer, FlatPath},
    intersect::{intersect, Intersection},
};

/// How far past the advance on either side the sidebearing test line reaches.
const TEST_LINE_OVERSHOOT: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sidebearings {
    pub left: f64,
    pub right: f64,
}

/// Sidebearings of `paths` at height `y`, `None` if nothing is crossed there.
pub fn sidebearings_at(paths: &[FlatPath], advance: f64, y: f64) -> Option<Sidebearings> {
    let hits = intersect(
        paths,
        Point::new(-TEST_LINE_OVERSHOOT, y),
        Point::new(advance + TEST_LINE_OVERSHOOT, y),
    );
    let first = hits.iter().map(|i| i.x).min_by(f64::total_cmp)?;
    let last = hits.iter().map(|i| i.x).max_by(f64::total_cmp)?;
    Some(Sidebearings {
        left: first,
        right: advance - last,
    })
}

/// Which paths of a layer a measurement looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    /// The layer's own paths; components are ignored
    Direct,
    /// Paths with every component resolved
    Flattened,
}

/// Measurements and metric edits on a live layer.
///
/// An unset advance width counts as zero here.
pub trait LayerMetrics {
    fn paths(&self, outline: Outline) -> Result<Vec<FlatPath>, Error>;

    fn bounds(&self, include_anchors: bool) -> Result<Bounds, Error>;

    fn intersections(
        &self,
        p1: Point,
        p2: Point,
        outline: Outline,
    ) -> Result<Vec<Intersection>, Error>;

    fn sidebearings_at(&self, y: f64, outline: Outline) -> Result<Option<Sidebearings>, Error>;

    /// Distance from the origin to the left of the outline, anchors excluded.
    fn lsb(&self) -> Result<f64, Error>;

    /// Distance from the right of the outline to the advance.
    fn rsb(&self) -> Result<f64, Error>;

    /// Move the outline, components and anchors so the LSB becomes `lsb`;
    /// the advance moves with them so the RSB is kept.
    fn set_lsb(&self, lsb: f64) -> Result<(), Error>;

    /// Change the advance so the RSB becomes `rsb`.
    fn set_rsb(&self, rsb: f64) -> Result<(), Error>;
}

impl LayerMetrics for Layer {
    fn paths(&self, outline: Outline) -> Result<Vec<FlatPath>, Error> {
        match outline {
            Outline::Direct => Ok(self.read(|l| direct_paths(&l.shapes)).unwrap_or_default()),
            Outline::Flattened => flatten_layer(self),
        }
    }

    fn bounds(&self, include_anchors: bool) -> Result<Bounds, Error> {
        layer_bounds(self, include_anchors)
    }

    fn intersections(
        &self,
        p1: Point,
        p2: Point,
        outline: Outline,
    ) -> Result<Vec<Intersection>, Error> {
        Ok(intersect(&self.paths(outline)?, p1, p2))
    }

    fn sidebearings_at(&self, y: f64, outline: Outline) -> Result<Option<Sidebearings>, Error> {
        let advance = self.width().unwrap_or_default();
        Ok(sidebearings_at(&self.paths(outline)?, advance, y))
    }

    fn lsb(&self) -> Result<f64, Error> {
        Ok(self.bounds(false)?.min_x)
    }

    fn rsb(&self) -> Result<f64, Error> {
        let advance = self.width().unwrap_or_default();
        Ok(advance - self.bounds(false)?.max_x)
    }

    fn set_lsb(&self, lsb: f64) -> Result<(), Error> {
        let delta = lsb - self.lsb()?;
        self.update(|layer| {
            layer.translate(delta, 0.0);
            layer.width = Some(layer.width.unwrap_or_default() + delta);
        })
        .ok_or(DocError::StaleHandle("layer"))?;
        debug!("Moved {self:?} by {delta} for an LSB of {lsb}");
        Ok(())
    }

    fn set_rsb(&self, rsb: f64) -> Result<(), Error> {
        let max_x = self.bounds(false)?.max_x;
        self.update(|layer| layer.width = Some(max_x + rsb))
            .ok_or(DocError::StaleHandle("layer"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fontdoc::NodeType;
    use kurbo::Rect;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test::{layer_of, load_test_document};

    #[test]
    fn square_sidebearings() {
        let doc = load_test_document("square.babelfont");
        let square = layer_of(&doc, "square");
        assert_eq!(
            Some(Sidebearings {
                left: 0.0,
                right: 50.0
            }),
            square.sidebearings_at(50.0, Outline::Flattened).unwrap()
        );
    }

    #[test]
    fn nothing_above_the_outline() {
        let doc = load_test_document("square.babelfont");
        let square = layer_of(&doc, "square");
        assert_eq!(None, square.sidebearings_at(500.0, Outline::Direct).unwrap());
    }

    #[test]
    fn direct_or_flattened() {
        let doc = load_test_document("components.babelfont");
        let stem = layer_of(&doc, "stem");
        assert_eq!(
            Some(Sidebearings {
                left: 50.0,
                right: 60.0
            }),
            stem.sidebearings_at(50.0, Outline::Direct).unwrap()
        );
        assert_eq!(
            Some(Sidebearings {
                left: 0.0,
                right: 20.0
            }),
            stem.sidebearings_at(50.0, Outline::Flattened).unwrap()
        );
        assert_eq!(
            4,
            stem.intersections(
                Point::new(-1.0, 50.0),
                Point::new(121.0, 50.0),
                Outline::Flattened
            )
            .unwrap()
            .len()
        );
    }

    #[test]
    fn read_lsb_rsb() {
        let doc = load_test_document("square.babelfont");
        let square = layer_of(&doc, "square");
        assert_eq!(0.0, square.lsb().unwrap());
        assert_eq!(50.0, square.rsb().unwrap());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn set_lsb_moves_everything_once() {
        let doc = load_test_document("components.babelfont");
        let stem = layer_of(&doc, "stem");
        stem.add_anchor(55.0, 100.0, Some("top")).unwrap();
        let edits = doc.context().edit_count();
        let rsb = stem.rsb().unwrap();

        stem.set_lsb(30.0).unwrap();
        assert_eq!(edits + 1, doc.context().edit_count());
        assert_eq!(30.0, stem.lsb().unwrap());
        assert_eq!(rsb, stem.rsb().unwrap());
        assert_eq!(Some(150.0), stem.width());

        let path = stem.shapes()[0].as_path().unwrap();
        assert_eq!(Some(80.0), path.nodes()[0].x());
        assert_eq!(Some(NodeType::Line), path.nodes()[0].nodetype());
        let component = stem.shapes()[1].as_component().unwrap();
        assert_eq!(
            Some(kurbo::Affine::translate((30.0, 40.0))),
            component.transform()
        );
        assert_eq!(Some(85.0), stem.anchors()[0].x());
    }

    #[test]
    fn set_rsb_changes_only_width() {
        let doc = load_test_document("square.babelfont");
        let square = layer_of(&doc, "square");
        square.set_rsb(75.0).unwrap();
        assert_eq!(1, doc.context().edit_count());
        assert_eq!(Some(175.0), square.width());
        assert_eq!(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            square.bounds(false).unwrap().to_rect()
        );
        assert_eq!(75.0, square.rsb().unwrap());
    }

    #[test]
    fn metric_edits_on_stale_layer() {
        let doc = load_test_document("square.babelfont");
        let square = layer_of(&doc, "square");
        square.glyph().remove_layer(0).unwrap();
        assert!(matches!(
            square.set_rsb(10.0),
            Err(Error::Document(DocError::StaleHandle("layer")))
        ));
    }

    #[test]
    fn cyclic_layer_cannot_be_measured() {
        let doc = load_test_document("components.babelfont");
        let looped = layer_of(&doc, "loop_b");
        assert!(matches!(looped.lsb(), Err(Error::CyclicComponent(..))));
        assert!(matches!(
            looped.sidebearings_at(0.0, Outline::Flattened),
            Err(Error::CyclicComponent(..))
        ));
        assert_eq!(
            None,
            looped.sidebearings_at(0.0, Outline::Direct).unwrap()
        );
    }
}
