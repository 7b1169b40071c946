//! Parsing source text into module nodes.

use graft_syntax::SyntaxKind::{BODY_BLOCK, DOC_LINE, EXPRESSION_STATEMENT};
use graft_syntax::{RawElement, RawNodeId, RawTree};

use crate::abstractor::{Abstracted, abstract_tree};
use crate::print::SpanMap;
use crate::{Module, Owned};

/// Parses `code` into a fresh module whose root is the parsed block.
pub fn parse_module(code: &str) -> (Module, SpanMap) {
    let mut module = Module::new();
    let parsed = parse_module_with_spans(code, &mut module);
    let _previous = module.replace_root(parsed.root);
    (module, parsed.spans)
}

pub fn parse_module_with_spans(code: &str, module: &mut Module) -> Abstracted {
    let parse = graft_parse::parse_module(code);
    if !parse.diagnostics().is_empty() {
        tracing::debug!(errors = parse.diagnostics().len(), "parsed module with errors");
    }
    abstract_tree(module, parse.tree(), parse.tree().root(), None)
}

/// Parses `code` as the body of a block, detached.
pub fn parse_block(code: &str, module: &mut Module) -> Owned {
    let parse = graft_parse::parse_block(code);
    abstract_tree(module, parse.tree(), parse.tree().root(), None).root
}

/// Parses a single statement; `None` unless `code` holds exactly one.
pub fn parse_statement(code: &str, module: &mut Module) -> Option<Owned> {
    let parse = graft_parse::parse_block(code);
    let tree = parse.tree();
    let statement = sole_statement(tree)?;
    Some(abstract_tree(module, tree, statement, None).root)
}

/// Parses a single undocumented expression statement and returns its
/// expression.
pub fn parse_expression(code: &str, module: &mut Module) -> Option<Owned> {
    let parse = graft_parse::parse_block(code);
    let tree = parse.tree();
    let expression = statement_expression(tree, sole_statement(tree)?)?;
    Some(abstract_tree(module, tree, expression, None).root)
}

/// The only statement of the root block of `tree`.
pub(crate) fn sole_statement(tree: &RawTree) -> Option<RawNodeId> {
    let root = tree.node(tree.root());
    if root.kind != BODY_BLOCK {
        return None;
    }
    let mut statements = root.children().iter().filter_map(|child| match *child {
        RawElement::Node(node) => Some(node),
        RawElement::Token(_) => None,
    });
    match (statements.next(), statements.next()) {
        (Some(statement), None) => Some(statement),
        _ => None,
    }
}

pub(crate) fn statement_expression(tree: &RawTree, statement: RawNodeId) -> Option<RawNodeId> {
    let node = tree.node(statement);
    match (node.kind, node.children()) {
        (EXPRESSION_STATEMENT, &[RawElement::Node(expression)])
            if tree.node(expression).kind != DOC_LINE =>
        {
            Some(expression)
        }
        _ => None,
    }
}
