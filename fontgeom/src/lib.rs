//! Geometry on top of [`fontdoc`]: segments, flattened components, bounds,
//! line intersections and sidebearings.
//!
//! Nothing here is cached; every query reads the document as it is now.

pub mod bounds;
pub mod error;
pub mod flatten;
pub mod intersect;
pub mod metrics;
pub mod segment;

pub use bounds::{bounds, layer_bounds, layer_data_bounds, Bounds, DEFAULT_WIDTH};
pub use error::Error;
pub use flatten::{direct_paths, flatten, flatten_layer, FlatPath};
pub use intersect::{intersect, Intersection};
pub use metrics::{sidebearings_at, LayerMetrics, Outline, Sidebearings};
pub use segment::{segment, Segment, SegmentKind};
