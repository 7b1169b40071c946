//! Fixing trees whose printed code would parse into a different structure.
//!
//! A direct tree edit can put an expression where the printed code makes the
//! parser group it differently, e.g. a sum as the right operand of a product.
//! Such a node has no counterpart in the reparsed code: its span is lost.
//! Lost spans within one line are fixed by parenthesizing the node; whatever
//! is still lost after the last pass is resynchronized from the printed code,
//! so the tree at least describes what its code says.

use rustc_hash::{FxHashMap, FxHashSet};
use text_size::TextRange;

use crate::node::{Group, NodeKind};
use crate::parse::parse_module_with_spans;
use crate::print::{SpanMap, print_with};
use crate::sync::sync_to_code;
use crate::{Module, NodeId, SyncConfig};

#[derive(Debug)]
pub struct Repair {
    pub code: String,
    /// The repaired module, when anything had to change.
    pub fixes: Option<Module>,
}

pub fn repair(module: &Module) -> Repair {
    repair_with(module, &SyncConfig::default())
}

pub fn repair_with(module: &Module, config: &SyncConfig) -> Repair {
    let passes = config.repair_passes.max(1);
    let mut fixes: Option<Module> = None;

    for pass in 1..=passes {
        let current = fixes.as_ref().unwrap_or(module);
        let Some(root) = current.root() else {
            return Repair { code: String::new(), fixes };
        };
        let printed = print_with(current, root, config);
        let mut reparsed = Module::new();
        let good = parse_module_with_spans(&printed.code, &mut reparsed);
        let lost = check_spans(current, &printed.spans, &good.spans, &printed.code);

        if lost.inline.is_empty() && lost.block.is_empty() {
            return Repair { code: printed.code, fixes };
        }
        if lost.inline.is_empty() || pass == passes {
            if lost.inline.is_empty() {
                tracing::warn!(lost = lost.block.len(), "multi-line nodes lost on reparse");
            }
            let mut edit = fixes.unwrap_or_else(|| module.fork());
            let bad = lost.inline.into_iter().chain(lost.block).collect();
            resync(&mut edit, bad, &printed.spans, &good.spans, &reparsed);
            let code = edit.root().map(|root| edit.code(root)).unwrap_or_default();
            return Repair { code, fixes: Some(edit) };
        }

        tracing::debug!(pass, lost = lost.inline.len(), "parenthesizing lost nodes");
        let edit = fixes.get_or_insert_with(|| module.fork());
        for id in lost.inline {
            if edit.kind(id) == NodeKind::Group {
                continue;
            }
            edit.update(id, Group::new).expect("lost nodes are below the root");
        }
    }
    unreachable!("the last pass always returns")
}

#[derive(Debug, Default)]
struct Lost {
    inline: Vec<NodeId>,
    block: Vec<NodeId>,
}

/// Nodes whose printed span has no node in the reparse, outermost per span.
fn check_spans(module: &Module, expected: &SpanMap, encountered: &SpanMap, code: &str) -> Lost {
    let mut lost = Lost::default();
    for (&range, ids) in &expected.nodes {
        let Some(&outermost) = ids.last() else { continue };
        if !range.is_empty() {
            for pair in ids.windows(2) {
                assert_eq!(module.get(pair[0]).parent(), Some(pair[1]), "nodes sharing a span are nested");
            }
        }
        if encountered.nodes.contains_key(&range) {
            continue;
        }
        if range.is_empty() && module.kind(outermost) == NodeKind::BodyBlock {
            continue;
        }
        if code[range].contains(['\r', '\n']) {
            lost.block.push(outermost);
        } else {
            lost.inline.push(outermost);
        }
    }
    lost
}

/// Resynchronizes the parents of the bad subtrees from code that reparses to
/// a good tree. A parent whose span the good tree lacks is replaced by its
/// nearest ancestor whose span it has.
fn resync(edit: &mut Module, bad: Vec<NodeId>, bad_spans: &SpanMap, good_spans: &SpanMap, good: &Module) {
    let bad: FxHashSet<NodeId> = bad.into_iter().collect();
    let bad_span_of: FxHashMap<NodeId, TextRange> = bad_spans.by_node();

    let mut targets: Vec<(NodeId, NodeId)> = Vec::new();
    for &id in &bad {
        if has_ancestor_in(edit, id, &bad) {
            continue;
        }
        let Some(mut parent) = edit.get(id).parent() else { continue };
        let good_node = loop {
            let found = bad_span_of.get(&parent).and_then(|span| good_spans.outermost(*span));
            match (found, edit.get(parent).parent()) {
                (Some(good_node), _) => break Some(good_node),
                (None, Some(grandparent)) => parent = grandparent,
                (None, None) => break None,
            }
        };
        match good_node {
            Some(good_node) => targets.push((parent, good_node)),
            None => tracing::warn!(?id, "no reparsed counterpart for any ancestor"),
        }
    }
    targets.sort();
    targets.dedup();
    let parents: FxHashSet<NodeId> = targets.iter().map(|(parent, _)| *parent).collect();
    targets.retain(|(parent, _)| !has_ancestor_in(edit, *parent, &parents));

    tracing::warn!(subtrees = targets.len(), "replacing subtrees with their reparsed equivalents");
    let metadata_source = edit.fork();
    for (parent, good_node) in targets {
        let code = good.code(good_node);
        if let Err(error) = sync_to_code(edit, parent, &code, &metadata_source) {
            tracing::warn!(?parent, %error, "failed to resynchronize subtree");
        }
    }
}

fn has_ancestor_in(module: &Module, id: NodeId, set: &FxHashSet<NodeId>) -> bool {
    let mut current = id;
    while let Some(parent) = module.get(current).parent() {
        if set.contains(&parent) {
            return true;
        }
        current = parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Ident, OprApp};
    use crate::parse::parse_module;

    /// `x = a * b` with `b` replaced by the tree of `b + c`.
    fn precedence_defect() -> Module {
        let (mut module, _) = parse_module("x = a * b");
        let root = module.root().unwrap();
        let b = module.descendants(root).into_iter().find(|&id| module.code(id) == "b").unwrap();
        module
            .update(b, |module, b| {
                let c = Ident::new(module, "c");
                OprApp::new(module, Some(b), "+", Some(c))
            })
            .unwrap();
        module
    }

    fn lost_after_reparse(module: &Module) -> usize {
        let root = module.root().unwrap();
        let printed = print_with(module, root, &SyncConfig::default());
        let mut reparsed = Module::new();
        let good = parse_module_with_spans(&printed.code, &mut reparsed);
        let lost = check_spans(module, &printed.spans, &good.spans, &printed.code);
        lost.inline.len() + lost.block.len()
    }

    #[test]
    fn sound_tree_needs_no_fixes() {
        let (module, _) = parse_module("main =\n    x = a * (b + c)\n    x");
        let repaired = repair(&module);
        assert_eq!(repaired.code, "main =\n    x = a * (b + c)\n    x");
        assert!(repaired.fixes.is_none());
    }

    #[test]
    fn lost_operand_is_parenthesized() {
        let module = precedence_defect();
        assert_eq!(module.code(module.root().unwrap()), "x = a * b + c");
        assert_eq!(lost_after_reparse(&module), 1);

        let repaired = repair(&module);
        assert_eq!(repaired.code, "x = a * (b + c)");
        let fixes = repaired.fixes.unwrap();
        assert_eq!(lost_after_reparse(&fixes), 0);
        assert_eq!(lost_after_reparse(&module), 1);
    }

    #[test]
    fn out_of_passes_resyncs() {
        let module = precedence_defect();
        let config = SyncConfig { repair_passes: 1, ..SyncConfig::default() };
        let repaired = repair_with(&module, &config);
        assert_eq!(repaired.code, "x = a * b + c");
        assert_eq!(lost_after_reparse(&repaired.fixes.unwrap()), 0);
    }
}
