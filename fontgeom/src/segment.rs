//! Splitting a node list into line and curve segments.
//!
//! A segment is a run `on-curve, off-curve*, on-curve`. The number of points
//! in the run decides its kind; runs with more than two off-curve points are
//! not drawable and are dropped.

use fontdoc::NodeData;
use kurbo::{CubicBez, Line, PathSeg, Point, QuadBez};
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentKind {
    Line,
    Quadratic,
    Cubic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// 2, 3 or 4 points depending on `kind`, ends included
    pub points: Vec<Point>,
}

impl Segment {
    fn from_run(run: &[Point]) -> Option<Segment> {
        let kind = match run.len() {
            2 => SegmentKind::Line,
            3 => SegmentKind::Quadratic,
            4 => SegmentKind::Cubic,
            _ => return None,
        };
        Some(Segment {
            kind,
            points: run.to_vec(),
        })
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn to_path_seg(&self) -> PathSeg {
        let p = &self.points;
        match self.kind {
            SegmentKind::Line => PathSeg::Line(Line::new(p[0], p[1])),
            SegmentKind::Quadratic => PathSeg::Quad(QuadBez::new(p[0], p[1], p[2])),
            SegmentKind::Cubic => PathSeg::Cubic(CubicBez::new(p[0], p[1], p[2], p[3])),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.is_finite())
    }
}

/// Split `nodes` into segments.
///
/// Closed paths start at their first on-curve node and wrap around back to
/// it. Open paths run front to back and the last node only ever ends a
/// segment. Fewer than two nodes, or a closed path without any on-curve
/// node, yields nothing.
pub fn segment(nodes: &[NodeData], closed: bool) -> Vec<Segment> {
    let len = nodes.len();
    if len < 2 {
        return Vec::new();
    }
    let Some(start) = nodes.iter().position(NodeData::is_on_curve) else {
        return Vec::new();
    };
    let span = if closed { len } else { len - 1 - start };

    let mut segments = Vec::new();
    let mut run = vec![nodes[start].point()];
    for step in 1..=span.min(2 * len) {
        let node = &nodes[(start + step) % len];
        run.push(node.point());
        if !node.is_on_curve() {
            continue;
        }
        match Segment::from_run(&run) {
            Some(segment) => segments.push(segment),
            None => warn!(
                "Skipping a run of {} points ending at node {}",
                run.len(),
                (start + step) % len
            ),
        }
        run.clear();
        run.push(node.point());
    }
    segments
}
