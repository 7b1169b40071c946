//! A live text view of a module.

use std::fmt;

use rustc_hash::FxHashMap;
use text_size::{TextRange, TextSize};

use crate::print::print;
use crate::text::{TextEdit, apply_text_edits, offset, offset_edit, text_change_to_edits};
use crate::update::{ModuleUpdate, Origin};
use crate::{Module, NodeId};

/// Receives each batch of edits. All ranges of a batch refer to the text as
/// it was before the batch.
pub type Observer = Box<dyn FnMut(&[TextEdit], Option<Origin>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u32);

/// The printed text of a module, kept current by feeding it the module's
/// updates, and the observers that want to follow it edit by edit.
#[derive(Default)]
pub struct SourceDocument {
    text: String,
    spans: FxHashMap<NodeId, TextRange>,
    observers: Vec<(ObserverHandle, Observer)>,
    next_handle: u32,
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("text", &self.text)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl SourceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The range of a node in the current text.
    pub fn get_span(&self, id: NodeId) -> Option<TextRange> {
        self.spans.get(&id).copied()
    }

    /// Registers `observer`. It is immediately told about the current text.
    pub fn observe(&mut self, mut observer: impl FnMut(&[TextEdit], Option<Origin>) + 'static) -> ObserverHandle {
        if !self.text.is_empty() {
            observer(&[TextEdit::insert(TextSize::from(0), self.text.clone())], None);
        }
        let handle = ObserverHandle(self.next_handle);
        self.next_handle += 1;
        self.observers.push((handle, Box::new(observer)));
        handle
    }

    /// Returns whether the observer was registered.
    pub fn unobserve(&mut self, handle: ObserverHandle) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != handle);
        self.observers.len() != before
    }

    pub fn clear(&mut self) {
        self.spans.clear();
        if self.text.is_empty() {
            return;
        }
        let edit = TextEdit::delete(TextRange::up_to(offset(self.text.len())));
        self.text.clear();
        self.notify(&[edit], None);
    }

    /// Brings the text up to date with `module`, which `update` describes
    /// relative to the version this document last saw.
    pub fn apply_update(&mut self, module: &Module, update: &ModuleUpdate) {
        for id in &update.nodes_deleted {
            self.spans.remove(id);
        }
        let Some(root) = module.root() else {
            self.clear();
            return;
        };
        let printed = print(module, root);
        let new_spans = printed.spans.by_node();

        let edits = self
            .subtree_edits(update, root, &printed.code, &new_spans)
            .filter(|edits| apply_text_edits(&self.text, edits) == printed.code)
            .unwrap_or_else(|| replace_all(&self.text, &printed.code));

        self.text = printed.code;
        self.spans = new_spans;
        if !edits.is_empty() {
            tracing::trace!(edits = edits.len(), origin = ?update.origin, "source document changed");
            self.notify(&edits, update.origin);
        }
    }

    /// Edits confined to the update roots; `None` when an update root was
    /// not part of the previous text.
    fn subtree_edits(
        &self,
        update: &ModuleUpdate,
        root: NodeId,
        code: &str,
        new_spans: &FxHashMap<NodeId, TextRange>,
    ) -> Option<Vec<TextEdit>> {
        if update.update_roots.contains(&root) {
            return None;
        }
        let mut edits = Vec::new();
        for id in &update.update_roots {
            let old = *self.spans.get(id)?;
            let new = *new_spans.get(id)?;
            let diff = text_change_to_edits(&self.text[old], &code[new]);
            edits.extend(diff.into_iter().map(|edit| offset_edit(edit, old.start())));
        }
        edits.sort_by_key(|edit| edit.range.start());
        Some(edits)
    }

    fn notify(&mut self, edits: &[TextEdit], origin: Option<Origin>) {
        for (_, observer) in &mut self.observers {
            observer(edits, origin);
        }
    }
}

fn replace_all(before: &str, after: &str) -> Vec<TextEdit> {
    if before == after {
        return Vec::new();
    }
    vec![TextEdit::new(TextRange::up_to(offset(before.len())), after)]
}
