//! Axes, masters and instances.

use std::{collections::BTreeMap, rc::Rc};

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    document::Document,
    store::{AxisData, FontData, I18NDictionary, InstanceData, Location, MasterData},
};

use super::{marks::Guide, ChildCache, GuideAddr, GuideOwner, LiveSlot};

#[derive(Clone)]
pub struct Axis {
    doc: Document,
    index: usize,
}

impl std::fmt::Debug for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Axis")
            .field("index", &self.index)
            .field("tag", &self.tag())
            .finish()
    }
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.index == other.index
    }
}

impl LiveSlot for Axis {
    type Record = AxisData;

    fn document(&self) -> &Document {
        &self.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a AxisData> {
        font.axes.get(self.index)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut AxisData> {
        font.axes.get_mut(self.index)
    }
}

impl Axis {
    pub(crate) fn new(doc: Document, index: usize) -> Axis {
        Axis { doc, index }
    }

    live_fields! {
        name, set_name: I18NDictionary;
        tag, set_tag: String;
        id, set_id: String;
    }

    live_optional_fields! {
        min, set_min: f64;
        max, set_max: f64;
        default, set_default: f64;
        /// `(user, design)` pairs.
        map, set_map: Vec<(f64, f64)>;
        hidden, set_hidden: bool;
        values, set_values: Vec<f64>;
        formatspecific, set_formatspecific: Value;
    }
}

struct MasterInner {
    doc: Document,
    index: usize,
    guides: ChildCache<Guide>,
}

#[derive(Clone)]
pub struct Master(Rc<MasterInner>);

impl std::fmt::Debug for Master {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Master")
            .field("index", &self.0.index)
            .field("id", &self.id())
            .finish()
    }
}

impl PartialEq for Master {
    fn eq(&self, other: &Self) -> bool {
        self.0.doc.same_document(&other.0.doc) && self.0.index == other.0.index
    }
}

impl LiveSlot for Master {
    type Record = MasterData;

    fn document(&self) -> &Document {
        &self.0.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a MasterData> {
        font.masters.get(self.0.index)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut MasterData> {
        font.masters.get_mut(self.0.index)
    }
}

impl Master {
    pub(crate) fn new(doc: Document, index: usize) -> Master {
        Master(Rc::new(MasterInner {
            doc,
            index,
            guides: Default::default(),
        }))
    }

    pub fn same_handle(&self, other: &Master) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    live_fields! {
        name, set_name: I18NDictionary;
        id, set_id: String;
        metrics, set_metrics: IndexMap<String, f64>;
        kerning, set_kerning: BTreeMap<String, BTreeMap<String, f64>>;
    }

    live_optional_fields! {
        location, set_location: Location;
        custom_ot_values, set_custom_ot_values: Value;
        format_specific, set_format_specific: Value;
    }

    /// A single metric such as `"Ascender"`.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.read(|m| m.metrics.get(name).copied()).flatten()
    }

    pub fn guides(&self) -> Vec<Guide> {
        let len = self.read(|m| m.guides.len()).unwrap_or_default();
        self.0.guides.get(len, self.0.doc.generation(), |guide| {
            Guide::new(
                self.0.doc.clone(),
                GuideAddr {
                    owner: GuideOwner::Master(self.0.index),
                    guide,
                },
            )
        })
    }
}

#[derive(Clone)]
pub struct Instance {
    doc: Document,
    index: usize,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("index", &self.index)
            .field("id", &self.id())
            .finish()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.doc.same_document(&other.doc) && self.index == other.index
    }
}

impl LiveSlot for Instance {
    type Record = InstanceData;

    fn document(&self) -> &Document {
        &self.doc
    }

    fn resolve<'a>(&self, font: &'a FontData) -> Option<&'a InstanceData> {
        font.instances.get(self.index)
    }

    fn resolve_mut<'a>(&self, font: &'a mut FontData) -> Option<&'a mut InstanceData> {
        font.instances.get_mut(self.index)
    }
}

impl Instance {
    pub(crate) fn new(doc: Document, index: usize) -> Instance {
        Instance { doc, index }
    }

    live_fields! {
        id, set_id: String;
        name, set_name: I18NDictionary;
        custom_names, set_custom_names: BTreeMap<String, Value>;
    }

    live_optional_fields! {
        location, set_location: Location;
        variable, set_variable: bool;
        linked_style, set_linked_style: String;
        format_specific, set_format_specific: Value;
    }
}
