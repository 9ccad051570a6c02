//! Where a straight line crosses an outline.

use kurbo::{Line, ParamCurve, Point};
use log::trace;
use serde::Serialize;

use crate::{
    flatten::FlatPath,
    segment::{Segment, SegmentKind},
};

/// Denominators at or below this mean the lines are parallel.
const PARALLEL_EPSILON: f64 = 1e-10;

/// Crossings closer than this along the test line are the same crossing.
const SAME_CROSSING: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Intersection {
    pub x: f64,
    pub y: f64,
    /// Fraction of the way from the test line's start to its end
    pub t: f64,
}

impl Intersection {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Where a crossing came from.
#[derive(Debug, Clone, Copy)]
struct Origin {
    path: usize,
    segment: usize,
    segments: usize,
    closed: bool,
}

impl Origin {
    /// Whether both segments follow each other in the same path, and so
    /// share an end point.
    fn adjoins(&self, other: &Origin) -> bool {
        if self.path != other.path {
            return false;
        }
        let (first, second) = (
            self.segment.min(other.segment),
            self.segment.max(other.segment),
        );
        second - first == 1 || (self.closed && first == 0 && second + 1 == self.segments)
    }
}

/// Every crossing of the segment `p1`-`p2` with `paths`, ordered along the line.
///
/// Segments that are not finite are skipped. A line through a vertex crosses
/// the two segments meeting there at once; that is reported as one crossing.
/// Crossings of different contours are all kept, even where they coincide.
pub fn intersect(paths: &[FlatPath], p1: Point, p2: Point) -> Vec<Intersection> {
    let line = Line::new(p1, p2);
    let mut hits: Vec<(Intersection, Origin)> = Vec::new();
    for (path_index, path) in paths.iter().enumerate() {
        let segments = path.segments();
        for (index, segment) in segments.iter().enumerate() {
            if !segment.is_finite() {
                continue;
            }
            let origin = Origin {
                path: path_index,
                segment: index,
                segments: segments.len(),
                closed: path.closed,
            };
            hits.extend(
                intersect_segment(segment, line)
                    .into_iter()
                    .map(|hit| (hit, origin)),
            );
        }
    }
    hits.sort_by(|(a, _), (b, _)| a.t.total_cmp(&b.t));

    let mut found: Vec<(Intersection, Origin)> = Vec::with_capacity(hits.len());
    for (hit, origin) in hits {
        let seen = found
            .iter()
            .rev()
            .take_while(|(kept, _)| (hit.t - kept.t).abs() < SAME_CROSSING)
            .any(|(_, kept)| kept.adjoins(&origin));
        if !seen {
            found.push((hit, origin));
        }
    }
    trace!("{} crossings of {p1:?}-{p2:?}", found.len());
    found.into_iter().map(|(hit, _)| hit).collect()
}

fn intersect_segment(segment: &Segment, line: Line) -> Vec<Intersection> {
    match segment.kind {
        SegmentKind::Line => line_line(line, Line::new(segment.start(), segment.end()))
            .into_iter()
            .collect(),
        SegmentKind::Quadratic | SegmentKind::Cubic => {
            let seg = segment.to_path_seg();
            seg.intersect_line(line)
                .into_iter()
                .filter_map(|hit| {
                    let point = seg.eval(hit.segment_t);
                    let t = line_param(line, point);
                    (0.0..=1.0).contains(&t).then_some(Intersection {
                        x: point.x,
                        y: point.y,
                        t,
                    })
                })
                .collect()
        }
    }
}

/// The crossing of two line segments, ends included.
fn line_line(line: Line, other: Line) -> Option<Intersection> {
    let (p1, p2, p3, p4) = (line.p0, line.p1, other.p0, other.p1);
    let denom = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denom.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / denom;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    // each coordinate comes from whichever line moves least along it
    let lerp = |a: f64, b: f64, c: f64, d: f64| {
        if (d - c).abs() <= (b - a).abs() {
            c + u * (d - c)
        } else {
            a + t * (b - a)
        }
    };
    Some(Intersection {
        x: lerp(p1.x, p2.x, p3.x, p4.x),
        y: lerp(p1.y, p2.y, p3.y, p4.y),
        t,
    })
}

/// Where `point` lies along `line`, measured on the axis the line runs along
/// the most.
fn line_param(line: Line, point: Point) -> f64 {
    let delta = line.p1 - line.p0;
    if delta.x.abs() >= delta.y.abs() {
        (point.x - line.p0.x) / delta.x
    } else {
        (point.y - line.p0.y) / delta.y
    }
}
