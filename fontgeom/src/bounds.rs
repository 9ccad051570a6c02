//! Bounding boxes of layers.

use fontdoc::{AnchorData, FontData, Layer, LayerData, LiveSlot};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    flatten::{flatten, FlatPath},
};

/// Width assumed for layers that have none.
pub const DEFAULT_WIDTH: f64 = 250.0;

/// Half the height of the box reported for layers with nothing to measure.
const FALLBACK_HALF_HEIGHT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// The box of every point, `None` if there are none.
    pub fn of_points(points: impl IntoIterator<Item = Point>) -> Option<Bounds> {
        points
            .into_iter()
            .map(|p| Rect::from_points(p, p))
            .reduce(|acc, r| acc.union(r))
            .map(|r| Bounds::new(r.x0, r.y0, r.x1, r.y1))
    }

    /// A thin box along the baseline spanning the advance, for layers with
    /// no points at all.
    pub fn fallback(advance: Option<f64>) -> Bounds {
        Bounds::new(
            0.0,
            -FALLBACK_HALF_HEIGHT,
            advance.unwrap_or(DEFAULT_WIDTH),
            FALLBACK_HALF_HEIGHT,
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// The box of every node of `paths`, control points included, and
/// optionally of `anchors`.
pub fn bounds(
    paths: &[FlatPath],
    anchors: &[AnchorData],
    include_anchors: bool,
    advance: Option<f64>,
) -> Bounds {
    let nodes = paths.iter().flat_map(|p| p.nodes.iter().map(|n| n.point()));
    let anchors = anchors
        .iter()
        .filter(|_| include_anchors)
        .map(|a| Point::new(a.x, a.y));
    Bounds::of_points(nodes.chain(anchors)).unwrap_or_else(|| Bounds::fallback(advance))
}

/// Bounds of a layer record with its components flattened.
pub fn layer_data_bounds(
    layer: &LayerData,
    font: &FontData,
    include_anchors: bool,
) -> Result<Bounds, Error> {
    let paths = flatten(&layer.shapes, font, layer.master_id())?;
    Ok(bounds(&paths, &layer.anchors, include_anchors, layer.width))
}

/// Bounds of a live layer with its components flattened.
///
/// A layer that is no longer in the document measures as the fallback box.
pub fn layer_bounds(layer: &Layer, include_anchors: bool) -> Result<Bounds, Error> {
    layer.document().read(|font| match layer.resolve(font) {
        Some(data) => layer_data_bounds(data, font, include_anchors),
        None => Ok(Bounds::fallback(None)),
    })
}
