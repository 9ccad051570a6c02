//! The shared edit context.

use std::{cell::Cell, rc::Rc};

#[derive(Debug, Default)]
struct EditState {
    dirty: Cell<bool>,
    edits: Cell<u64>,
}

/// Tracks whether a document has been modified since it was last clean.
///
/// Clones share state, so a host can keep one and hand another to the
/// [`Document`](crate::Document) it is watching.
#[derive(Debug, Clone, Default)]
pub struct EditContext(Rc<EditState>);

impl EditContext {
    pub fn new() -> EditContext {
        Default::default()
    }

    /// Record one edit.
    pub fn mark_dirty(&self) {
        self.0.dirty.set(true);
        self.0.edits.set(self.0.edits.get() + 1);
    }

    pub fn is_dirty(&self) -> bool {
        self.0.dirty.get()
    }

    pub fn mark_clean(&self) {
        self.0.dirty.set(false);
    }

    /// Number of edits recorded so far; never reset.
    pub fn edit_count(&self) -> u64 {
        self.0.edits.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let host = EditContext::new();
        let doc_side = host.clone();
        assert!(!host.is_dirty());

        doc_side.mark_dirty();
        doc_side.mark_dirty();
        assert!(host.is_dirty());
        assert_eq!(2, host.edit_count());

        host.mark_clean();
        assert!(!doc_side.is_dirty());
        assert_eq!(2, doc_side.edit_count());
    }
}
