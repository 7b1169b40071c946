//! Printing a subtree back to source, recording where each node and token
//! ended up.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use text_size::TextRange;

use crate::concrete::{Element, PrintContext, concrete_children};
use crate::node::NodeKind;
use crate::text::offset;
use crate::{ExternalId, Module, NodeId, SyncConfig, Token, TokenId};

/// Source ranges of printed or parsed nodes and tokens.
///
/// Nodes sharing a range are listed innermost first, so the last entry is the
/// outermost node covering that range. Ranges of nodes exclude leading spaces.
#[derive(Debug, Clone, Default)]
pub struct SpanMap {
    pub nodes: IndexMap<TextRange, Vec<NodeId>, FxBuildHasher>,
    pub tokens: IndexMap<TextRange, Token, FxBuildHasher>,
}

impl SpanMap {
    pub(crate) fn add_node(&mut self, range: TextRange, id: NodeId) {
        self.nodes.entry(range).or_default().push(id);
    }

    /// The outermost node spanning exactly `range`.
    pub fn outermost(&self, range: TextRange) -> Option<NodeId> {
        self.nodes.get(&range).and_then(|ids| ids.last().copied())
    }

    /// Reverse lookup from nodes to their ranges.
    pub fn by_node(&self) -> FxHashMap<NodeId, TextRange> {
        self.nodes.iter().flat_map(|(range, ids)| ids.iter().map(|id| (*id, *range))).collect()
    }

    /// The identity a consumer knows each range by. Where tokens and nodes
    /// share a range the outermost node wins; a statement wrapping a bare
    /// expression never does.
    pub fn to_id_map(&self, module: &Module) -> IdMap {
        let mut out = IdMap::default();
        for (range, token) in &self.tokens {
            out.insert(*range, KnownId::Token(token.id()));
        }
        for (range, ids) in &self.nodes {
            for &id in ids {
                if ids.len() > 1 && module.kind(id) == NodeKind::ExpressionStatement {
                    continue;
                }
                out.insert(*range, KnownId::Node(module.external_id(id)));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownId {
    Node(ExternalId),
    Token(TokenId),
}

/// Source ranges to the ids of what was printed there.
pub type IdMap = IndexMap<TextRange, KnownId, FxBuildHasher>;

#[derive(Debug, Clone)]
pub struct Printed {
    pub code: String,
    pub spans: SpanMap,
}

pub fn print(module: &Module, id: NodeId) -> Printed {
    print_with(module, id, &SyncConfig::default())
}

pub fn print_with(module: &Module, id: NodeId, config: &SyncConfig) -> Printed {
    let mut printer = Printer { module, config, code: String::new(), spans: SpanMap::default() };
    printer.node(id, None, config.verbatim);
    Printed { code: printer.code, spans: printer.spans }
}

struct Printer<'a> {
    module: &'a Module,
    config: &'a SyncConfig,
    code: String,
    spans: SpanMap,
}

impl Printer<'_> {
    fn node(&mut self, id: NodeId, parent_indent: Option<&str>, verbatim: bool) {
        let module = self.module;
        let node = module.get(id);
        let verbatim = verbatim || node.kind() == NodeKind::Invalid;
        let start = self.code.len();
        let ctx = PrintContext { verbatim, indent: parent_indent };

        let mut line_indent = parent_indent.map(str::to_owned);
        let mut prev_is_newline = false;
        let mut is_first_token = start == 0;

        for child in concrete_children(module, &node.data, ctx, self.config) {
            if prev_is_newline {
                line_indent = Some(child.whitespace.clone());
            }
            match child.element {
                Element::Token(token) => {
                    // The newline opening the first line of a document is implicit.
                    if is_first_token && token.is_newline() && matches!(token.code(), "" | "\n") {
                        prev_is_newline = true;
                        is_first_token = false;
                        continue;
                    }
                    self.code.push_str(&child.whitespace);
                    let token_start = self.code.len();
                    let code = match token.code() {
                        "" if token.is_newline() => "\n",
                        code => code,
                    };
                    self.code.push_str(code);
                    prev_is_newline = token.is_newline();
                    self.spans.tokens.insert(self.range(token_start), token);
                }
                Element::Node(child_id) => {
                    self.code.push_str(&child.whitespace);
                    prev_is_newline = false;
                    self.node(child_id, line_indent.as_deref(), verbatim);
                    let parent = module.get(child_id).parent();
                    assert_eq!(parent, Some(id), "{child_id:?} is printed under {id:?}");
                }
            }
            is_first_token = false;
        }

        let leading = self.code[start..].bytes().take_while(|&b| b == b' ').count();
        let span = self.range(start + leading);
        self.spans.add_node(span, id);
    }

    fn range(&self, start: usize) -> TextRange {
        TextRange::new(offset(start), offset(self.code.len()))
    }
}

#[cfg(test)]
mod tests {
    use expect_test::{Expect, expect};

    use super::*;
    use crate::parse::parse_module;

    fn check_spans(code: &str, expect: Expect) {
        let (module, _) = parse_module(code);
        let printed = print(&module, module.root().unwrap());
        assert_eq!(printed.code, code);

        let mut out = String::new();
        for (range, ids) in &printed.spans.nodes {
            let kinds: Vec<_> = ids.iter().map(|id| module.get(*id).kind().to_string()).collect();
            out.push_str(&format!("{range:?} {:?} {}\n", &code[*range], kinds.join(" < ")));
        }
        expect.assert_eq(&out);
    }

    #[test]
    fn nested_spans() {
        check_spans(
            "x = f a\nf b",
            expect![[r#"
                0..1 "x" Ident
                4..5 "f" Ident
                6..7 "a" Ident
                4..7 "f a" App
                0..7 "x = f a" Assignment
                8..9 "f" Ident
                10..11 "b" Ident
                8..11 "f b" App < ExpressionStatement
                0..11 "x = f a\nf b" BodyBlock
            "#]],
        );
    }

    #[test]
    fn block_spans() {
        check_spans(
            "main =\n    1 + 2",
            expect![[r#"
                0..4 "main" Ident
                11..12 "1" NumericLiteral
                15..16 "2" NumericLiteral
                11..16 "1 + 2" OprApp < ExpressionStatement
                6..16 "\n    1 + 2" BodyBlock
                0..16 "main =\n    1 + 2" Assignment < BodyBlock
            "#]],
        );
    }

    #[test]
    fn spans_exclude_leading_spaces() {
        check_spans(
            "  x",
            expect![[r#"
                2..3 "x" Ident < ExpressionStatement < BodyBlock
            "#]],
        );
    }

    #[test]
    fn id_map_names_expressions_not_their_statements() {
        let (module, _) = parse_module("x = f a\nf b");
        let root = module.root().unwrap();
        let ids = print(&module, root).spans.to_id_map(&module);
        let at = |start: u32, end: u32| ids[&TextRange::new(start.into(), end.into())];

        let statement = module.children(root)[1];
        let call = module.children(statement)[0];
        assert_eq!(at(8, 11), KnownId::Node(module.external_id(call)));
        assert_eq!(at(0, 11), KnownId::Node(module.external_id(root)));
        assert!(matches!(at(2, 3), KnownId::Token(_)));
        assert!(matches!(at(8, 9), KnownId::Node(_)));
    }

    #[test]
    fn verbatim_printing_keeps_recorded_whitespace() {
        let (mut module, _) = parse_module("a + b");
        let root = module.root().unwrap();
        let sum = module.descendants(root).into_iter().find(|&id| module.kind(id) == NodeKind::OprApp).unwrap();
        if let crate::NodeData::OprApp(opr) = &mut module.node_mut(sum).data {
            opr.rhs.as_mut().unwrap().whitespace = Some(String::new());
        }

        assert_eq!(print(&module, root).code, "a + b");
        let config = SyncConfig { verbatim: true, ..SyncConfig::default() };
        assert_eq!(print_with(&module, root, &config).code, "a +b");
    }
}
