//! Matching nodes of a tree before an edit with nodes of the tree parsed
//! after it.
//!
//! Matching runs in three phases. First, every old span that the edit did
//! not touch is projected into the new text; a new node of the same kind at
//! the projected span corresponds to the old node. Second, nodes that moved
//! are matched by a hash of their printed form. Last, old nodes whose
//! projected span is enclosed by a longer new node of the same kind are
//! matched with it, if neither was matched before.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use text_size::TextRange;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

use crate::concrete::{Element, PrintContext, concrete_children};
use crate::print::SpanMap;
use crate::text::{SpanTree, TextEdit, apply_text_edits_to_spans, enclosing_spans, trim_end};
use crate::{Module, NodeId, SyncConfig};

/// Old node to new node.
pub type Correspondence = IndexMap<NodeId, NodeId, FxBuildHasher>;

/// Both trees live in `module`: `old_root` as printed with `old_spans`, and
/// `new_root` as parsed from `new_code` with `new_spans`.
pub fn calculate_correspondence(
    module: &Module,
    old_root: NodeId,
    old_spans: &SpanMap,
    new_root: NodeId,
    new_spans: &SpanMap,
    edits: &[TextEdit],
    new_code: &str,
) -> Correspondence {
    let new_span_of = new_spans.by_node();

    let old_ranges: Vec<TextRange> = old_spans.nodes.keys().copied().collect();
    let mut part_to_old: FxHashMap<TextRange, &[NodeId]> = FxHashMap::default();
    let mut parts = Vec::new();
    for (before, after) in apply_text_edits_to_spans(edits, &old_ranges) {
        let after = trim_end(after, new_code);
        if let Some(old) = old_spans.nodes.get(&before) {
            part_to_old.insert(after, old);
            parts.push(after);
        }
    }

    let tree = SpannedNode { module, spans: &new_span_of, id: new_root };
    let mut to_sync = Correspondence::default();
    let mut candidates = Correspondence::default();
    for (new, parts) in enclosing_spans(&tree, parts) {
        let Some(new_span) = new_span_of.get(&new) else { continue };
        let new_chain = nested_at(new_spans, *new_span, new);
        for part in parts {
            let pairs = pair_by_kind(module, part_to_old[&part], new_chain);
            if pairs.is_empty() {
                continue;
            }
            let matched = if new_span.len() == part.len() { &mut to_sync } else { &mut candidates };
            matched.extend(pairs);
            break;
        }
    }

    let mut old_matched: FxHashSet<NodeId> = to_sync.keys().copied().collect();
    let mut new_matched: FxHashSet<NodeId> = to_sync.values().copied().collect();

    let config = SyncConfig::default();
    let new_hashes = syntax_hashes(module, new_root, &config);
    let old_hashes = syntax_hashes(module, old_root, &config);
    for (hash, new_ids) in &new_hashes {
        let Some(old_ids) = old_hashes.get(hash) else { continue };
        let unmatched_new = new_ids.iter().filter(|id| !new_matched.contains(id));
        let unmatched_old = old_ids.iter().filter(|id| !old_matched.contains(id));
        let pairs: Vec<_> = unmatched_old.copied().zip(unmatched_new.copied()).collect();
        for (old, new) in pairs {
            if module.kind(old) == module.kind(new) {
                to_sync.insert(old, new);
                old_matched.insert(old);
                new_matched.insert(new);
            }
        }
    }

    for (old, new) in candidates {
        if old_matched.contains(&old) || new_matched.contains(&new) {
            continue;
        }
        to_sync.insert(old, new);
        old_matched.insert(old);
        new_matched.insert(new);
    }

    tracing::trace!(matched = to_sync.len(), "calculated correspondence");
    to_sync
}

/// `id` and the nodes enclosing it with the same span, innermost first.
fn nested_at(spans: &SpanMap, span: TextRange, id: NodeId) -> &[NodeId] {
    let chain = spans.nodes.get(&span).map_or(&[][..], Vec::as_slice);
    let from = chain.iter().position(|&node| node == id).unwrap_or(chain.len());
    &chain[from..]
}

/// Pairs two chains of nested nodes level by level, skipping levels of one
/// side that have no node of the same kind on the other.
fn pair_by_kind(module: &Module, old: &[NodeId], new: &[NodeId]) -> Vec<(NodeId, NodeId)> {
    let mut pairs = Vec::new();
    let mut rest = old;
    for &new in new {
        let kind = module.kind(new);
        if let Some(at) = rest.iter().position(|&old| module.kind(old) == kind) {
            pairs.push((rest[at], new));
            rest = &rest[at + 1..];
        }
    }
    pairs
}

struct SpannedNode<'a> {
    module: &'a Module,
    spans: &'a FxHashMap<NodeId, TextRange>,
    id: NodeId,
}

impl SpanTree for SpannedNode<'_> {
    type Id = NodeId;

    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> TextRange {
        self.spans.get(&self.id).copied().unwrap_or_default()
    }

    fn children(&self) -> Vec<Self> {
        self.module
            .children(self.id)
            .into_iter()
            .filter(|id| self.spans.contains_key(id))
            .map(|id| SpannedNode { module: self.module, spans: self.spans, id })
            .collect()
    }
}

/// Groups the nodes of a subtree by a hash of their kind and normalized
/// printed form, in document order.
pub(crate) fn syntax_hashes(
    module: &Module,
    root: NodeId,
    config: &SyncConfig,
) -> IndexMap<u128, Vec<NodeId>, FxBuildHasher> {
    let mut out = IndexMap::default();
    hash_subtree(module, root, config, &mut out);
    out
}

fn hash_subtree(
    module: &Module,
    id: NodeId,
    config: &SyncConfig,
    out: &mut IndexMap<u128, Vec<NodeId>, FxBuildHasher>,
) -> u128 {
    let node = module.get(id);
    let mut hasher = Xxh3::new();
    hasher.update(node.kind().to_string().as_bytes());
    hasher.update(b":");

    let ctx = PrintContext { verbatim: false, indent: Some("") };
    for child in concrete_children(module, node.data(), ctx, config) {
        hasher.update(child.whitespace.as_bytes());
        match child.element {
            Element::Token(token) => {
                hasher.update(b"Token:");
                hasher.update(&xxh3_128(token.code().as_bytes()).to_le_bytes());
            }
            Element::Node(child) => {
                hasher.update(&hash_subtree(module, child, config, out).to_le_bytes());
            }
        }
    }

    let hash = hasher.digest128();
    out.entry(hash).or_default().push(id);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractor::abstract_tree;
    use crate::node::NodeKind;
    use crate::print::print;
    use crate::text::{apply_text_edits, text_change_to_edits};

    fn correspond(before: &str, edits: &[TextEdit]) -> (Module, Correspondence) {
        let (mut module, _) = crate::parse::parse_module(before);
        let old_root = module.root().unwrap();
        let printed = print(&module, old_root);
        let new_code = apply_text_edits(before, edits);

        let parse = graft_parse::parse_module(&new_code);
        let parsed = abstract_tree(&mut module, parse.tree(), parse.tree().root(), None);
        let correspondence = calculate_correspondence(
            &module,
            old_root,
            &printed.spans,
            parsed.root.id(),
            &parsed.spans,
            edits,
            &new_code,
        );
        (module, correspondence)
    }

    fn matched_code(module: &Module, correspondence: &Correspondence) -> Vec<(String, String)> {
        let mut out: Vec<_> = correspondence
            .iter()
            .map(|(old, new)| (module.code(*old), module.code(*new)))
            .collect();
        out.sort();
        out
    }

    fn pair(old: &str, new: &str) -> (String, String) {
        (old.to_owned(), new.to_owned())
    }

    #[test]
    fn untouched_nodes_correspond() {
        let before = "x = 1\ny = 2";
        let (module, correspondence) = correspond(before, &text_change_to_edits(before, "x = 1\ny = 3"));
        let matched = matched_code(&module, &correspondence);
        assert!(matched.contains(&pair("x = 1", "x = 1")));
        assert!(matched.contains(&pair("y", "y")));
        assert!(matched.contains(&pair("y = 2", "y = 3")));
        assert!(!matched.iter().any(|(old, _)| old == "2"));
    }

    #[test]
    fn moved_nodes_correspond() {
        let edits = [
            TextEdit::delete(TextRange::new(0.into(), 8.into())),
            TextEdit::insert(15.into(), "\na = f 1"),
        ];
        let (module, correspondence) = correspond("a = f 1\nb = g 2", &edits);
        let matched = matched_code(&module, &correspondence);
        assert!(matched.contains(&pair("a = f 1", "a = f 1")));
        assert!(matched.contains(&pair("f 1", "f 1")));
        assert!(matched.contains(&pair("b = g 2", "b = g 2")));
    }

    #[test]
    fn moved_subexpression_is_found_by_hash() {
        let (module, correspondence) = correspond("f x", &[TextEdit::insert(3.into(), " y")]);
        let matched = matched_code(&module, &correspondence);
        assert!(matched.contains(&pair("f x", "f x")));
        assert!(matched.contains(&pair("x", "x")));
    }

    #[test]
    fn enclosing_node_of_same_kind_is_a_candidate() {
        let (module, correspondence) = correspond("x = 1\ny = 2", &[TextEdit::insert(11.into(), "3")]);
        let matched = matched_code(&module, &correspondence);
        assert!(matched.contains(&pair("2", "23")));
        assert!(matched.contains(&pair("y = 2", "y = 23")));
        assert!(matched.contains(&pair("x = 1", "x = 1")));
    }

    #[test]
    fn nodes_sharing_a_span_correspond_level_by_level() {
        let (module, correspondence) = correspond("x = f 1", &[TextEdit::insert(7.into(), "0")]);
        let old_root = module.root().unwrap();
        let new_root = correspondence[&old_root];
        assert_eq!(module.kind(new_root), NodeKind::BodyBlock);
        assert_eq!(module.code(new_root), "x = f 10");

        let matched = matched_code(&module, &correspondence);
        let statements = matched.iter().filter(|matched| **matched == pair("x = f 1", "x = f 10")).count();
        assert_eq!(statements, 2);
        assert!(matched.contains(&pair("1", "10")));
    }
}
