//! The node store.
//!
//! A `Module` maps node ids to immutable node records. Forking a module is a
//! pointer copy: the map and every record are shared until one side writes,
//! at which point only the written map and record are cloned. A fork therefore
//! doubles as a snapshot; two modules can be compared record by record with
//! pointer equality.

use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use rustc_hash::FxHashMap;

use crate::id::next_raw;
use crate::node::{Metadata, Node, NodeData, NodeKind, Wildcard};
use crate::shared::SharedText;
use crate::{AstError, ExternalId, NodeId, print};

/// A node that is not attached to any parent. Attaching it consumes the
/// handle, so a node can only ever be placed in one slot.
#[must_use = "a detached node must be attached to a parent or become the root"]
#[derive(Debug, PartialEq, Eq)]
pub struct Owned(pub(crate) NodeId);

impl Owned {
    pub fn id(&self) -> NodeId {
        self.0
    }

    pub(crate) fn into_id(self) -> NodeId {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Module {
    nodes: Arc<FxHashMap<NodeId, triomphe::Arc<Node>>>,
    root: Option<NodeId>,
    next_id: Arc<AtomicU32>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy that shares all records with `self` until either side writes.
    /// Ids allocated by either fork never collide.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes `root` the root of the module and returns the previous root,
    /// now detached.
    pub fn replace_root(&mut self, root: Owned) -> Option<Owned> {
        let id = root.into_id();
        assert!(self.get(id).parent.is_none(), "{id:?} is attached and cannot become the root");
        self.root.replace(id).map(Owned)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[track_caller]
    pub fn get(&self, id: NodeId) -> &Node {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("{id:?} is not part of this module"),
        }
    }

    pub fn try_get(&self, id: NodeId) -> Result<&Node, AstError> {
        self.nodes.get(&id).map(|node| &**node).ok_or(AstError::UnknownNode(id))
    }

    pub(crate) fn record(&self, id: NodeId) -> Option<&triomphe::Arc<Node>> {
        self.nodes.get(&id)
    }

    #[track_caller]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match Arc::make_mut(&mut self.nodes).get_mut(&id) {
            Some(node) => triomphe::Arc::make_mut(node),
            None => panic!("{id:?} is not part of this module"),
        }
    }

    /// Stores a new node and claims its children, which must be detached.
    pub(crate) fn alloc(&mut self, data: NodeData) -> Owned {
        let id = NodeId::from_raw(next_raw(&self.next_id));
        for child in data.child_ids() {
            self.set_parent(child, id);
        }
        let node = Node { id, parent: None, metadata: Metadata::fresh(), data };
        Arc::make_mut(&mut self.nodes).insert(id, triomphe::Arc::new(node));
        Owned(id)
    }

    /// Drops a record nothing refers to anymore.
    pub(crate) fn discard(&mut self, id: NodeId) {
        Arc::make_mut(&mut self.nodes).remove(&id);
    }

    #[cfg(test)]
    pub(crate) fn stored_len(&self) -> usize {
        self.nodes.len()
    }

    #[track_caller]
    fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        let current = self.get(child).parent;
        assert!(current.is_none(), "{child:?} is already a child of {current:?}");
        self.node_mut(child).parent = Some(parent);
    }

    pub(crate) fn set_parent_if_changed(&mut self, child: NodeId, parent: NodeId) {
        if self.get(child).parent != Some(parent) {
            self.node_mut(child).parent = Some(parent);
        }
    }

    /// Puts `new` into the slot of `parent` that holds `old`, and returns
    /// `old`, now detached.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: Owned,
    ) -> Result<Owned, AstError> {
        let new_id = new.id();
        if !self.try_get(parent)?.data.child_ids().contains(&old) {
            return Err(AstError::NotAChild { parent, child: old });
        }
        if self.try_get(new_id)?.parent.is_some() {
            return Err(AstError::AlreadyParented(new_id));
        }

        self.node_mut(parent).data.rewrite_refs(|id| (id == old).then_some(new_id));
        self.node_mut(new_id).parent = Some(parent);
        self.node_mut(old).parent = None;
        Ok(Owned(old))
    }

    /// Puts `new` where `target` is, whether in a parent slot or at the root,
    /// and returns `target`, now detached.
    pub fn replace(&mut self, target: NodeId, new: Owned) -> Result<Owned, AstError> {
        match self.try_get(target)?.parent {
            Some(parent) => self.replace_child(parent, target, new),
            None if self.root == Some(target) => {
                if self.try_get(new.id())?.parent.is_some() {
                    return Err(AstError::AlreadyParented(new.id()));
                }
                Ok(self.replace_root(new).expect("the module has a root"))
            }
            None => Err(AstError::NoParent(target)),
        }
    }

    /// Detaches `id`, leaving a wildcard in its slot.
    pub fn take(&mut self, id: NodeId) -> Result<Owned, AstError> {
        let parent = self.try_get(id)?.parent.ok_or(AstError::NoParent(id))?;
        let placeholder = Wildcard::new(self);
        self.replace_child(parent, id, placeholder)
    }

    /// Replaces `id` with whatever `f` builds from it and returns the id of
    /// the node now in its place.
    pub fn update(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Self, Owned) -> Owned,
    ) -> Result<NodeId, AstError> {
        let placeholder = Wildcard::new(self);
        let placeholder_id = placeholder.id();
        let taken = self.replace(id, placeholder)?;
        let new = f(self, taken);
        let new_id = new.id();
        let _placeholder = self.replace(placeholder_id, new)?;
        Ok(new_id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).data.child_ids()
    }

    /// `root` and all its descendants, parents before children.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.visit_recursive(root, |node| {
            out.push(node.id);
            true
        });
        out
    }

    /// Visits the subtree in pre-order; returning `false` skips the children
    /// of the visited node.
    pub fn visit_recursive(&self, root: NodeId, mut f: impl FnMut(&Node) -> bool) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.get(id);
            if f(node) {
                stack.extend(node.data.child_ids().into_iter().rev());
            }
        }
    }

    pub fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.get(node).parent {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// The printed source of the subtree at `id`.
    pub fn code(&self, id: NodeId) -> String {
        print(self, id).code
    }

    pub fn external_id(&self, id: NodeId) -> ExternalId {
        self.get(id).metadata.external_id
    }

    pub fn set_external_id(&mut self, id: NodeId, external_id: ExternalId) {
        if self.get(id).metadata.external_id != external_id {
            self.node_mut(id).metadata.external_id = external_id;
        }
    }

    pub fn metadata(&self, id: NodeId) -> &Metadata {
        &self.get(id).metadata
    }

    pub fn metadata_mut(&mut self, id: NodeId) -> &mut Metadata {
        &mut self.node_mut(id).metadata
    }

    /// The documentation text of a statement; `None` for other kinds.
    pub fn documentation(&self, id: NodeId) -> Option<&str> {
        self.get(id).data.documentation().map(|doc| doc.text().as_str())
    }

    pub fn set_documentation(&mut self, id: NodeId, text: &str) -> Result<(), AstError> {
        self.edit_documentation(id, |doc| doc.set(text))
    }

    /// Edits the documentation text in place, for consumers that forward
    /// character-level edits.
    pub fn edit_documentation(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn SharedText),
    ) -> Result<(), AstError> {
        if self.try_get(id)?.data.documentation().is_none() {
            return Err(AstError::NotDocumentable(id));
        }
        let doc = self.node_mut(id).data.documentation_mut().expect("documentable node");
        f(doc.text_mut());
        Ok(())
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).data.kind()
    }
}
