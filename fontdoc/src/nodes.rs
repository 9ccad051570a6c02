//! Path nodes and the compact node-string format.
//!
//! Paths in a babelfont document usually store their nodes as a single string
//! of whitespace separated `x y type` triples, e.g. `"0 0 l 100 0 l 100 100 cs"`.
//! The type is one of `m`, `l`, `o`, `c`, `q` (move, line, off-curve, curve,
//! quadratic curve), optionally suffixed with `s` for a smooth node.

use std::{borrow::Cow, fmt::Write};

use kurbo::Point;
use log::warn;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Move,
    #[default]
    Line,
    OffCurve,
    Curve,
    QCurve,
}

impl NodeType {
    pub fn is_on_curve(self) -> bool {
        !matches!(self, NodeType::OffCurve)
    }

    fn code(self) -> char {
        match self {
            NodeType::Move => 'm',
            NodeType::Line => 'l',
            NodeType::OffCurve => 'o',
            NodeType::Curve => 'c',
            NodeType::QCurve => 'q',
        }
    }

    /// Unrecognized codes are read as lines.
    fn from_code(code: char) -> NodeType {
        match code {
            'm' => NodeType::Move,
            'l' => NodeType::Line,
            'o' => NodeType::OffCurve,
            'c' => NodeType::Curve,
            'q' => NodeType::QCurve,
            _ => NodeType::Line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub nodetype: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
}

impl NodeData {
    pub fn new(x: f64, y: f64, nodetype: NodeType) -> NodeData {
        NodeData {
            x,
            y,
            nodetype,
            smooth: None,
        }
    }

    pub fn smooth(mut self) -> NodeData {
        self.smooth = Some(true);
        self
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_on_curve(&self) -> bool {
        self.nodetype.is_on_curve()
    }
}

/// Parse a compact node string.
///
/// Triples whose coordinates are not finite numbers are dropped, as is an incomplete
/// trailing triple.
pub fn parse_nodes(raw: &str) -> Vec<NodeData> {
    let tokens: Vec<_> = raw.split_whitespace().collect();
    let mut nodes = Vec::with_capacity(tokens.len() / 3);
    for triple in tokens.chunks_exact(3) {
        let (Ok(x), Ok(y)) = (triple[0].parse::<f64>(), triple[1].parse::<f64>()) else {
            warn!("Skipping malformed node '{}'", triple.join(" "));
            continue;
        };
        if !x.is_finite() || !y.is_finite() {
            warn!("Skipping non-finite node '{}'", triple.join(" "));
            continue;
        }
        let mut code = triple[2].chars();
        let nodetype = NodeType::from_code(code.next().unwrap_or('l'));
        let smooth = (code.next() == Some('s')).then_some(true);
        nodes.push(NodeData {
            x,
            y,
            nodetype,
            smooth,
        });
    }
    nodes
}

/// Write nodes in the compact string form.
pub fn serialize_nodes(nodes: &[NodeData]) -> String {
    let mut out = String::with_capacity(nodes.len() * 12);
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // f64 Display is the shortest repr that reads back to the same value
        let _ = write!(out, "{} {} {}", node.x, node.y, node.nodetype.code());
        if node.smooth == Some(true) {
            out.push('s');
        }
    }
    out
}

/// How a path's nodes are held in the store.
///
/// Documents arrive with compact strings; the first structured access through a
/// [`Path`](crate::Path) upgrades the slot to [`NodeStorage::Parsed`] so every
/// later reader sees the list form. Serialization always writes the string form.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeStorage {
    Compact(String),
    Parsed(Vec<NodeData>),
}

impl Default for NodeStorage {
    fn default() -> Self {
        NodeStorage::Parsed(Vec::new())
    }
}

impl NodeStorage {
    pub fn is_compact(&self) -> bool {
        matches!(self, NodeStorage::Compact(_))
    }

    /// The nodes, parsing on the fly if the slot has not been upgraded.
    pub fn to_nodes(&self) -> Cow<'_, [NodeData]> {
        match self {
            NodeStorage::Compact(raw) => Cow::Owned(parse_nodes(raw)),
            NodeStorage::Parsed(nodes) => Cow::Borrowed(nodes),
        }
    }

    pub fn parsed(&self) -> Option<&[NodeData]> {
        match self {
            NodeStorage::Compact(_) => None,
            NodeStorage::Parsed(nodes) => Some(nodes),
        }
    }

    pub fn parsed_mut(&mut self) -> Option<&mut Vec<NodeData>> {
        match self {
            NodeStorage::Compact(_) => None,
            NodeStorage::Parsed(nodes) => Some(nodes),
        }
    }

    /// Replace a compact string with its parsed list, returning the list.
    pub fn normalize(&mut self) -> &mut Vec<NodeData> {
        if let NodeStorage::Compact(raw) = self {
            let nodes = parse_nodes(raw);
            *self = NodeStorage::Parsed(nodes);
        }
        match self {
            NodeStorage::Parsed(nodes) => nodes,
            NodeStorage::Compact(_) => unreachable!("compact storage was just replaced"),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NodeStorage::Compact(raw) => raw.split_whitespace().count() / 3,
            NodeStorage::Parsed(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<NodeData>> for NodeStorage {
    fn from(value: Vec<NodeData>) -> Self {
        NodeStorage::Parsed(value)
    }
}

impl Serialize for NodeStorage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeStorage::Compact(raw) => serializer.serialize_str(raw),
            NodeStorage::Parsed(nodes) => serializer.serialize_str(&serialize_nodes(nodes)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodes {
    Compact(String),
    Parsed(Vec<NodeData>),
    Malformed(IgnoredAny),
}

impl<'de> Deserialize<'de> for NodeStorage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawNodes::deserialize(deserializer)? {
            RawNodes::Compact(raw) => NodeStorage::Compact(raw),
            RawNodes::Parsed(nodes) => NodeStorage::Parsed(nodes),
            RawNodes::Malformed(_) => {
                warn!("Unreadable path nodes replaced with an empty list");
                NodeStorage::default()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn parse_triples() {
        assert_eq!(
            vec![
                NodeData::new(0.0, 0.0, NodeType::Move),
                NodeData::new(100.5, -20.0, NodeType::OffCurve),
                NodeData::new(150.0, 30.0, NodeType::Curve).smooth(),
                NodeData::new(200.0, 0.0, NodeType::QCurve),
            ],
            parse_nodes("0 0 m 100.5 -20 o\n150 30 cs   200 0 q")
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("  \n\t ")]
    #[case::incomplete("10 20")]
    #[case::nan("nan 0 l")]
    #[case::infinite("0 inf l -inf 5 c")]
    fn parse_to_nothing(#[case] raw: &str) {
        assert_eq!(Vec::<NodeData>::new(), parse_nodes(raw));
    }

    #[test]
    fn unknown_type_is_line() {
        assert_eq!(
            vec![NodeData::new(1.0, 2.0, NodeType::Line)],
            parse_nodes("1 2 z")
        );
    }

    #[test]
    fn skip_unparseable_coordinates() {
        assert_eq!(
            vec![NodeData::new(3.0, 4.0, NodeType::Curve)],
            parse_nodes("1 nope l 3 4 c")
        );
        assert_eq!(
            vec![NodeData::new(3.0, 4.0, NodeType::Curve)],
            parse_nodes("NaN 1 l 3 4 c 1 infinity o")
        );
    }

    #[test]
    fn serialize_round_trips() {
        let nodes = vec![
            NodeData::new(0.0, 0.0, NodeType::Line),
            NodeData::new(33.25, 0.1, NodeType::OffCurve),
            NodeData::new(-66.0, 1e-3, NodeType::OffCurve),
            NodeData::new(100.0, 100.0, NodeType::Curve).smooth(),
            NodeData::new(50.0, 75.0, NodeType::QCurve),
            NodeData::new(0.0, 10.0, NodeType::Move),
        ];
        let raw = serialize_nodes(&nodes);
        assert_eq!(
            "0 0 l 33.25 0.1 o -66 0.001 o 100 100 cs 50 75 q 0 10 m",
            raw
        );
        assert_eq!(nodes, parse_nodes(&raw));
    }

    #[test]
    fn reparse_is_stable() {
        let raw = "10 10 l 20 20 o 30 30 o 40 40 c 50 50 ls";
        let once = parse_nodes(raw);
        assert_eq!(once, parse_nodes(&serialize_nodes(&once)));
    }

    #[test]
    fn storage_accepts_both_forms() {
        let compact: NodeStorage = serde_json::from_str(r#""0 0 l 10 0 l""#).unwrap();
        assert!(compact.is_compact());
        assert_eq!(2, compact.len());

        let parsed: NodeStorage =
            serde_json::from_str(r#"[{"x": 0, "y": 0, "nodetype": "Line"}, {"x": 10, "y": 0}]"#)
                .unwrap();
        assert_eq!(compact.to_nodes(), parsed.to_nodes());
    }

    #[test]
    fn storage_writes_compact_string() {
        let storage = NodeStorage::Parsed(vec![
            NodeData::new(0.0, 0.0, NodeType::Line),
            NodeData::new(5.0, 5.0, NodeType::Curve).smooth(),
        ]);
        assert_eq!(
            r#""0 0 l 5 5 cs""#,
            serde_json::to_string(&storage).unwrap()
        );
    }

    #[test]
    fn storage_normalizes_in_place() {
        let mut storage = NodeStorage::Compact("1 2 l 3 4 o 5 6 c".to_string());
        assert_eq!(3, storage.normalize().len());
        assert!(!storage.is_compact());
        assert_eq!(Some(NodeType::OffCurve), storage.parsed().map(|n| n[1].nodetype));
    }

    #[test]
    fn malformed_storage_is_empty() {
        let storage: NodeStorage = serde_json::from_str("42").unwrap();
        assert!(storage.is_empty());
    }
}
