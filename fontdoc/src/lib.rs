//! A live object model over babelfont-style JSON font documents.
//!
//! The [`Document`] owns the raw records ([`store`]); the wrappers in [`live`]
//! are cheap handles that read and write those records in place and flag the
//! [`EditContext`] dirty on every edit.

mod context;
mod document;
pub mod error;
pub mod live;
pub mod nodes;
pub mod store;
pub mod transform;
pub mod types;

pub use context::EditContext;
pub use document::Document;
pub use live::{
    Anchor, Axis, Component, Font, Glyph, Guide, Instance, Layer, LiveSlot, Master, Node, Path,
    Shape,
};
pub use nodes::{parse_nodes, serialize_nodes, NodeData, NodeStorage, NodeType};
pub use store::{
    AnchorData, AxisData, ComponentData, FontData, GlyphData, GuideData, InstanceData, LayerData,
    LayerMaster, MasterData, PathData, ShapeData, ShapeKind,
};
pub use transform::{DecomposedTransform, TransformData};
pub use types::GlyphName;

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use crate::{Document, EditContext};

    pub(crate) fn testdata_dir() -> PathBuf {
        let mut dir = Path::new("../resources/testdata");
        if !dir.is_dir() {
            dir = Path::new("./resources/testdata");
        }
        assert!(dir.is_dir());
        dir.to_path_buf()
    }

    pub(crate) fn load_test_document(name: &str) -> Document {
        let _ = env_logger::builder().is_test(true).try_init();
        let file = testdata_dir().join(name);
        Document::load(&file, EditContext::new())
            .unwrap_or_else(|e| panic!("Unable to read {file:?}: {e}"))
    }
}
