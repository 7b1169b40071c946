//! Describing the difference between two versions of a module.

use rustc_hash::FxHashSet;

use crate::{Module, NodeId};

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    LocalUserAction,
    Remote,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleUpdate {
    pub nodes_added: FxHashSet<NodeId>,
    pub nodes_updated: FxHashSet<NodeId>,
    pub nodes_deleted: FxHashSet<NodeId>,
    pub metadata_updated: FxHashSet<NodeId>,
    /// Changed nodes with no changed ancestor in the new version.
    pub update_roots: FxHashSet<NodeId>,
    pub origin: Option<Origin>,
}

impl ModuleUpdate {
    /// Compares the trees reachable from the roots of `old` and `new`, two
    /// forks of one module. A node counts as changed when its record is no
    /// longer shared between the two.
    pub fn between(old: &Module, new: &Module, origin: Option<Origin>) -> Self {
        let reachable_old: FxHashSet<NodeId> =
            old.root().map(|root| old.descendants(root).into_iter().collect()).unwrap_or_default();

        let mut update = Self { origin, ..Self::default() };
        let Some(root) = new.root() else {
            update.nodes_deleted = reachable_old;
            return update;
        };

        let mut reachable_new = FxHashSet::default();
        let mut stack = vec![(root, false)];
        while let Some((id, ancestor_changed)) = stack.pop() {
            reachable_new.insert(id);
            let record = new.record(id).expect("reachable nodes are stored");
            let changed = match old.record(id) {
                Some(before) if reachable_old.contains(&id) => {
                    if triomphe::Arc::ptr_eq(before, record) {
                        false
                    } else {
                        if before.data != record.data || before.parent != record.parent {
                            update.nodes_updated.insert(id);
                        }
                        if before.metadata != record.metadata {
                            update.metadata_updated.insert(id);
                        }
                        true
                    }
                }
                _ => {
                    update.nodes_added.insert(id);
                    true
                }
            };
            if changed && !ancestor_changed {
                update.update_roots.insert(id);
            }
            for child in record.data.child_ids() {
                stack.push((child, ancestor_changed || changed));
            }
        }

        update.nodes_deleted = reachable_old.difference(&reachable_new).copied().collect();
        update
    }

    pub fn is_empty(&self) -> bool {
        self.update_roots.is_empty() && self.nodes_deleted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Ident;
    use crate::parse::parse_module;

    #[test]
    fn untouched_fork_has_no_changes() {
        let (module, _) = parse_module("x = 1\nf x");
        let update = ModuleUpdate::between(&module, &module.fork(), None);
        assert!(update.is_empty());
        assert!(update.nodes_added.is_empty());
    }

    #[test]
    fn replaced_child_is_an_update_root() {
        let (old, _) = parse_module("x = a + 1");
        let mut new = old.fork();
        let root = new.root().unwrap();
        let a = new.descendants(root).into_iter().find(|&id| new.code(id) == "a").unwrap();
        let sum = new.get(a).parent().unwrap();

        let b = Ident::new(&mut new, "b");
        let b_id = b.id();
        let _a = new.replace_child(sum, a, b).unwrap();

        let update = ModuleUpdate::between(&old, &new, Some(Origin::Local));
        assert_eq!(update.update_roots, FxHashSet::from_iter([sum]));
        assert!(update.nodes_added.contains(&b_id));
        assert!(update.nodes_updated.contains(&sum));
        assert_eq!(update.nodes_deleted, FxHashSet::from_iter([a]));
        assert_eq!(update.origin, Some(Origin::Local));
    }

    #[test]
    fn metadata_change_is_reported() {
        let (old, _) = parse_module("x");
        let mut new = old.fork();
        let root = new.root().unwrap();
        new.set_external_id(root, crate::ExternalId::new());

        let update = ModuleUpdate::between(&old, &new, None);
        assert_eq!(update.metadata_updated, FxHashSet::from_iter([root]));
        assert!(update.nodes_updated.is_empty());
        assert_eq!(update.update_roots, FxHashSet::from_iter([root]));
    }
}
