//! Applying text edits to a tree while keeping the identity of the nodes the
//! edits did not replace.

use graft_syntax::RawNodeId;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::abstractor::abstract_tree;
use crate::correspondence::{Correspondence, calculate_correspondence};
use crate::node::{NodeData, NodeKind};
use crate::parse::{sole_statement, statement_expression};
use crate::print::print;
use crate::text::{TextEdit, apply_text_edits, text_change_to_edits};
use crate::{AstError, ExternalId, Module, NodeId, Owned};

/// Replaces the subtree at `target` with the result of parsing its printed
/// code with `edits` applied. Nodes that correspond to nodes of the new parse
/// are updated in place. `metadata_source` is the module as it was before
/// the edit and supplies metadata for nodes that are rebuilt.
pub fn apply_text_edits_to_ast(
    module: &mut Module,
    target: NodeId,
    edits: &[TextEdit],
    metadata_source: &Module,
) -> Result<(), AstError> {
    let kind = module.try_get(target)?.kind();
    let printed = print(module, target);
    let code = apply_text_edits(&printed.code, edits);

    let is_root = module.root() == Some(target);
    let parse = if is_root && kind == NodeKind::BodyBlock {
        graft_parse::parse_module(&code)
    } else {
        graft_parse::parse_block(&code)
    };
    let tree = parse.tree();
    let raw = parsed_unit(module, target, kind, tree);
    tracing::trace!(?target, ?kind, unit = ?tree.node(raw).kind, edits = edits.len(), "reparsed edited subtree");

    let parsed = abstract_tree(module, tree, raw, None);
    let correspondence = calculate_correspondence(
        module,
        target,
        &printed.spans,
        parsed.root.id(),
        &parsed.spans,
        edits,
        &code,
    );
    sync_tree(module, target, parsed.root, &correspondence, metadata_source)
}

/// The part of the parse that replaces `target`: the whole block for blocks,
/// the sole statement for statements, and the expression of the sole
/// statement for expressions.
fn parsed_unit(
    module: &Module,
    target: NodeId,
    kind: NodeKind,
    tree: &graft_syntax::RawTree,
) -> RawNodeId {
    if kind == NodeKind::BodyBlock {
        return tree.root();
    }
    let Some(statement) = sole_statement(tree) else { return tree.root() };
    if !is_expression(module, target) {
        return statement;
    }
    statement_expression(tree, statement).unwrap_or(statement)
}

fn is_expression(module: &Module, id: NodeId) -> bool {
    let node = module.get(id);
    match node.kind() {
        kind if kind.is_statement() => false,
        NodeKind::BodyBlock => false,
        NodeKind::Invalid | NodeKind::Generic => {
            node.parent().is_none_or(|parent| module.kind(parent) != NodeKind::BodyBlock)
        }
        _ => true,
    }
}

/// Replaces the subtree at `target` with `code`.
pub fn sync_to_code(
    module: &mut Module,
    target: NodeId,
    code: &str,
    metadata_source: &Module,
) -> Result<(), AstError> {
    let before = module.code(target);
    let edits = text_change_to_edits(&before, code);
    apply_text_edits_to_ast(module, target, &edits, metadata_source)
}

impl Module {
    /// Makes the module's code `code`, reusing nodes wherever possible. A
    /// module without a root is simply parsed.
    pub fn sync_to_code(&mut self, code: &str) -> Result<(), AstError> {
        match self.root() {
            Some(root) => {
                let before = self.fork();
                sync_to_code(self, root, code, &before)
            }
            None => {
                let parsed = crate::parse::parse_module_with_spans(code, self);
                let _previous = self.replace_root(parsed.root);
                Ok(())
            }
        }
    }
}

/// Grafts `new_content` over `target`. Nodes of the new tree listed in
/// `to_sync` are not inserted themselves: the old node they correspond to
/// takes their content and their place.
///
/// Records of the old subtree that end up outside the tree are released. An
/// unmatched `target` is the exception: it keeps its record, detached and
/// under a fresh external id, but its children may be gone.
pub fn sync_tree(
    module: &mut Module,
    target: NodeId,
    new_content: Owned,
    to_sync: &Correspondence,
    metadata_source: &Module,
) -> Result<(), AstError> {
    let new_to_old: FxHashMap<NodeId, NodeId> = to_sync.iter().map(|(&old, &new)| (new, old)).collect();
    let old_subtree = module.descendants(target);

    let new_root = if to_sync.get(&target) == Some(&new_content.id()) {
        target
    } else {
        let new_id = new_content.id();
        let metadata = module.try_get(target)?.metadata().clone();
        let _retired = module.replace(target, new_content)?;
        module.metadata_mut(new_id).clone_from(&metadata);
        module.set_external_id(target, ExternalId::new());
        new_id
    };

    let mut stack = vec![new_root];
    while let Some(id) = stack.pop() {
        match to_sync.get(&id) {
            Some(&new) => {
                let assigned = match &module.get(id).data {
                    NodeData::Assignment(assignment) => Some(assignment.expression.node),
                    _ => None,
                };
                let original = assigned
                    .and_then(|expression| metadata_source.try_get(expression).ok())
                    .map(|expression| expression.metadata().clone());

                sync_fields(module, id, new, &new_to_old);

                let expression = match &module.get(id).data {
                    NodeData::Assignment(assignment) => Some(assignment.expression.node),
                    _ => None,
                };
                if let (Some(original), Some(expression)) = (original, expression) {
                    module.set_external_id(expression, original.external_id);
                    if !module.metadata(expression).same_placement(&original) {
                        module.metadata_mut(expression).sync_from(&original);
                    }
                }
            }
            None => rewrite_refs(module, id, &new_to_old),
        }
        stack.extend(module.children(id).into_iter().rev());
    }

    // Every matched node of the new tree has been replaced by its old
    // counterpart.
    for &new in to_sync.values() {
        if new != new_root {
            module.discard(new);
        }
    }
    let reachable: FxHashSet<NodeId> = module.descendants(new_root).into_iter().collect();
    let retired: Vec<NodeId> =
        old_subtree.into_iter().filter(|id| *id != target && !reachable.contains(id)).collect();
    tracing::trace!(retired = retired.len(), "released replaced nodes");
    for id in retired {
        module.discard(id);
    }
    Ok(())
}

/// Gives `id` the content of the new node `from`, pointing at old nodes
/// wherever they stand in for new ones.
fn sync_fields(module: &mut Module, id: NodeId, from: NodeId, new_to_old: &FxHashMap<NodeId, NodeId>) {
    let mut data = module.get(from).data().clone();
    data.rewrite_refs(|child| new_to_old.get(&child).copied());
    for child in data.child_ids() {
        module.set_parent_if_changed(child, id);
    }
    if module.get(id).data() != &data {
        module.node_mut(id).data = data;
    }
}

fn rewrite_refs(module: &mut Module, id: NodeId, new_to_old: &FxHashMap<NodeId, NodeId>) {
    let children = module.children(id);
    if children.iter().any(|child| new_to_old.contains_key(child)) {
        module.node_mut(id).data.rewrite_refs(|child| new_to_old.get(&child).copied());
    }
    for child in module.children(id) {
        module.set_parent_if_changed(child, id);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parse::parse_module;
    use crate::shared::KeyValue as _;

    fn find(module: &Module, code: &str) -> NodeId {
        let root = module.root().unwrap();
        module
            .descendants(root)
            .into_iter()
            .rev()
            .find(|&id| module.code(id) == code)
            .unwrap_or_else(|| panic!("no node prints as {code:?}"))
    }

    #[test]
    fn untouched_statements_keep_identity() {
        let (mut module, _) = parse_module("x = 1\ny = 2");
        let root = module.root().unwrap();
        let x = find(&module, "x = 1");
        let y = find(&module, "y = 2");
        let x_id = module.external_id(x);
        let y_id = module.external_id(y);

        let before = module.fork();
        sync_to_code(&mut module, root, "x = 1\ny = 3", &before).unwrap();

        assert_eq!(module.code(root), "x = 1\ny = 3");
        assert_eq!(module.root(), Some(root));
        assert_eq!(module.external_id(find(&module, "x = 1")), x_id);
        assert_eq!(module.external_id(find(&module, "y = 3")), y_id);
    }

    #[test]
    fn moved_statement_keeps_identity() {
        let (mut module, _) = parse_module("a = f 1\nb = g 2");
        let a = module.external_id(find(&module, "a = f 1"));
        let b = module.external_id(find(&module, "b = g 2"));

        let edits = [
            TextEdit::delete(text_size::TextRange::new(0.into(), 8.into())),
            TextEdit::insert(15.into(), "\na = f 1"),
        ];
        let before = module.fork();
        let root = module.root().unwrap();
        apply_text_edits_to_ast(&mut module, root, &edits, &before).unwrap();

        let root = module.root().unwrap();
        assert_eq!(module.code(root), "b = g 2\na = f 1");
        assert_eq!(module.external_id(find(&module, "a = f 1")), a);
        assert_eq!(module.external_id(find(&module, "b = g 2")), b);
    }

    #[test]
    fn noop_edit_changes_nothing() {
        let (mut module, _) = parse_module("main =\n    x = f 1\n    x + 2");
        let root = module.root().unwrap();
        let before = module.fork();
        sync_to_code(&mut module, root, "main =\n    x = f 1\n    x + 2", &before).unwrap();

        for id in before.descendants(root) {
            assert!(triomphe::Arc::ptr_eq(
                module.record(id).unwrap(),
                before.record(id).unwrap()
            ));
        }
    }

    #[test]
    fn assigned_expression_keeps_metadata() {
        let (mut module, _) = parse_module("x = f 1");
        let expression = find(&module, "f 1");
        module.metadata_mut(expression).values.set("position", json!({ "x": 10, "y": 20 }));
        let expression_id = module.external_id(expression);

        let before = module.fork();
        let root = module.root().unwrap();
        sync_to_code(&mut module, root, "x = g 1", &before).unwrap();

        let expression = find(&module, "g 1");
        assert_eq!(module.external_id(expression), expression_id);
        assert_eq!(module.metadata(expression).position(), Some(&json!({ "x": 10, "y": 20 })));
    }

    #[test]
    fn editing_an_expression() {
        let (mut module, _) = parse_module("x = a + b");
        let sum = find(&module, "a + b");
        let a = module.external_id(find(&module, "a"));

        let before = module.fork();
        sync_to_code(&mut module, sum, "a * c", &before).unwrap();

        let root = module.root().unwrap();
        assert_eq!(module.code(root), "x = a * c");
        assert_eq!(module.external_id(find(&module, "a")), a);
    }

    #[test]
    fn module_sync_to_code() {
        let mut module = Module::new();
        module.sync_to_code("x = 1").unwrap();
        assert_eq!(module.code(module.root().unwrap()), "x = 1");
        module.sync_to_code("x = 1\nf x").unwrap();
        assert_eq!(module.code(module.root().unwrap()), "x = 1\nf x");
    }

    #[test]
    fn replaced_nodes_are_released() {
        let (mut module, _) = parse_module("main =\n    x = f 1\n    y = x + 2");
        let reachable = |module: &Module| module.descendants(module.root().unwrap()).len();
        assert_eq!(module.stored_len(), reachable(&module));

        for _ in 0..20 {
            module.sync_to_code("main =\n    x = f 10\n    y = [x] + 2").unwrap();
            module.sync_to_code("main =\n    x = f 1\n    y = x + 2").unwrap();
        }
        assert_eq!(module.stored_len(), reachable(&module));
    }

    #[test]
    fn unevenly_spaced_code_is_kept() {
        let (mut module, _) = parse_module("x = f 1");
        for code in ["x =zz f 1", "x = f 1", "x= f 1", "1=  all", "from.", "a .b", "x = f 1"] {
            module.sync_to_code(code).unwrap();
            assert_eq!(module.code(module.root().unwrap()), code);
        }
    }
}
