//! Anchors and guides: positioned marks that are not outline geometry.

use kurbo::Point;
use serde_json::Value;

use crate::{
    document::Document,
    store::{AnchorData, FontData, GuideData, Position},
};

use super::{AnchorAddr, GuideAddr, LiveSlot};

#[derive(Clone)]
pub struct Anchor {
    doc: Document,
    addr: AnchorAddr,
}

impl std::fmt::Debug for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Anchor").field(&self.addr).finish()
    }
}

impl PartialEq for Anchor {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.addr == other.addr
    }
}

impl LiveSlot for Anchor {
    type Record = AnchorData;

    fn document(&self) -> &Document {
        &self.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a AnchorData> {
        self.addr.get(font)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut AnchorData> {
        self.addr.get_mut(font)
    }
}

impl Anchor {
    pub(crate) fn new(doc: Document, addr: AnchorAddr) -> Anchor {
        Anchor { doc, addr }
    }

    live_fields! {
        x, set_x: f64;
        y, set_y: f64;
    }

    live_optional_fields! {
        name, set_name: String;
        format_specific, set_format_specific: Value;
    }

    pub fn point(&self) -> Option<Point> {
        self.read(|a| Point::new(a.x, a.y))
    }
}

#[derive(Clone)]
pub struct Guide {
    doc: Document,
    addr: GuideAddr,
}

impl std::fmt::Debug for Guide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Guide").field(&self.addr).finish()
    }
}

impl PartialEq for Guide {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.addr == other.addr
    }
}

impl LiveSlot for Guide {
    type Record = GuideData;

    fn document(&self) -> &Document {
        &self.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a GuideData> {
        self.addr.owner.guides(font)?.get(self.addr.guide)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut GuideData> {
        self.addr.owner.guides_mut(font)?.get_mut(self.addr.guide)
    }
}

impl Guide {
    pub(crate) fn new(doc: Document, addr: GuideAddr) -> Guide {
        Guide { doc, addr }
    }

    live_fields! {
        /// Position and angle in degrees.
        pos, set_pos: Position;
    }

    live_optional_fields! {
        name, set_name: String;
        color, set_color: Value;
        format_specific, set_format_specific: Value;
    }
}
