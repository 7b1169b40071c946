//! Turning the parser's raw tree into module nodes.
//!
//! A raw node whose children do not have the shape its kind calls for is kept
//! as a `Generic` node, so every input survives the conversion byte for byte.
//! The whitespace before a raw node is the whitespace before its first token;
//! the node's own slot carries it, and its first child gets none.

use graft_syntax::SyntaxKind::*;
use graft_syntax::{RawElement, RawNodeId, RawTokenId, RawTree, SyntaxKind};
use rustc_hash::FxHashMap;
use text_size::TextRange;

use crate::docs::{DocFormat, DocLine, Documentation};
use crate::node::{
    App, Assignment, BlockLine, BodyBlock, ExpressionStatement, FunctionDef, Generic, GenericChild,
    Group, Ident, Import, ImportSegment, Invalid, NegationApp, NodeChild, NodeData, NumericLiteral,
    OprApp, PropertyAccess, TextLiteral, UnaryOprApp, Vector, VectorElement, Wildcard,
};
use crate::print::SpanMap;
use crate::text::offset;
use crate::{Module, NodeId, Owned, Token};

/// Supplies an existing subtree for the node at a range instead of converting
/// the raw node there.
pub type Substitutor<'a> = &'a mut dyn FnMut(TextRange) -> Option<Owned>;

pub struct Abstracted {
    pub root: Owned,
    pub spans: SpanMap,
    /// The raw node each converted node came from.
    pub raw: FxHashMap<NodeId, RawNodeId>,
}

pub fn abstract_tree(
    module: &mut Module,
    tree: &RawTree,
    root: RawNodeId,
    substitutor: Option<Substitutor<'_>>,
) -> Abstracted {
    let mut abstractor = Abstractor {
        module,
        tree,
        substitutor,
        spans: SpanMap::default(),
        raw: FxHashMap::default(),
    };
    let root = abstractor.node(root);
    Abstracted { root, spans: abstractor.spans, raw: abstractor.raw }
}

struct Abstractor<'a, 's> {
    module: &'a mut Module,
    tree: &'a RawTree,
    substitutor: Option<Substitutor<'s>>,
    spans: SpanMap,
    raw: FxHashMap<NodeId, RawNodeId>,
}

use RawElement::{Node as N, Token as T};

impl Abstractor<'_, '_> {
    fn node(&mut self, raw: RawNodeId) -> Owned {
        let tree = self.tree;
        let node = tree.node(raw);
        let code = tree.slice(node.code);
        let leading = code.len() - code.trim_start_matches(' ').len();
        let span = TextRange::new(node.code.start() + offset(leading), node.code.end());

        if let Some(substitute) = self.substitutor.as_mut().and_then(|substitute| substitute(span)) {
            return substitute;
        }

        let data = if node.kind == INVALID {
            let generic = self.generic(node.children());
            let generic = self.alloc(generic, span, raw);
            NodeData::Invalid(Invalid { expression: NodeChild::unspaced(generic.into_id()) })
        } else {
            match self.structured(raw) {
                Some(data) => data,
                None => self.generic(node.children()),
            }
        };
        self.alloc(data, span, raw)
    }

    fn alloc(&mut self, data: NodeData, span: TextRange, raw: RawNodeId) -> Owned {
        let owned = self.module.alloc(data);
        self.spans.add_node(span, owned.id());
        self.raw.insert(owned.id(), raw);
        owned
    }

    fn whitespace(&self, element: RawElement, first: bool) -> String {
        if first { String::new() } else { self.tree.element_whitespace(element).to_owned() }
    }

    fn child(&mut self, raw: RawNodeId, first: bool) -> NodeChild<NodeId> {
        let whitespace = self.whitespace(N(raw), first);
        NodeChild::new(Some(whitespace), self.node(raw).into_id())
    }

    fn token(&mut self, raw: RawTokenId, first: bool) -> NodeChild<Token> {
        let tree = self.tree;
        let whitespace = self.whitespace(T(raw), first);
        let token = tree.token(raw);
        let kind = if token.kind == DOC_NEWLINE { NEWLINE } else { token.kind };
        let abstracted = Token::new(kind, tree.slice(token.code));
        self.spans.tokens.insert(token.code, abstracted.clone());
        NodeChild::new(Some(whitespace), abstracted)
    }

    fn tokens(&mut self, raw: &[RawTokenId], first: bool) -> Vec<NodeChild<Token>> {
        raw.iter().enumerate().map(|(i, &token)| self.token(token, first && i == 0)).collect()
    }

    fn kind(&self, element: RawElement) -> SyntaxKind {
        self.tree.element_kind(element)
    }

    fn is_token(&self, element: RawElement, kind: SyntaxKind) -> bool {
        matches!(element, T(_)) && self.kind(element) == kind
    }

    fn all_tokens(&self, elements: &[RawElement]) -> Option<Vec<RawTokenId>> {
        elements
            .iter()
            .map(|element| match *element {
                T(token) => Some(token),
                N(_) => None,
            })
            .collect()
    }

    fn generic(&mut self, children: &[RawElement]) -> NodeData {
        let children = children
            .iter()
            .enumerate()
            .map(|(i, &element)| match element {
                N(node) => GenericChild::Node(self.child(node, i == 0)),
                T(token) => GenericChild::Token(self.token(token, i == 0)),
            })
            .collect();
        NodeData::Generic(Generic { children })
    }

    /// Converts a raw node of a known shape. Shapes are checked before any
    /// child is converted.
    fn structured(&mut self, raw: RawNodeId) -> Option<NodeData> {
        let tree = self.tree;
        let node = tree.node(raw);
        let children = node.children();

        let data = match (node.kind, children) {
            (APP, &[N(function), N(argument)]) => NodeData::App(App {
                function: self.child(function, true),
                argument: self.child(argument, false),
            }),
            (OPR_APP, _) => return self.opr_app(children),
            (UNARY_OPR_APP, &[T(operator)]) => NodeData::UnaryOprApp(UnaryOprApp {
                operator: self.token(operator, true),
                argument: None,
            }),
            (UNARY_OPR_APP, &[T(operator), N(argument)]) => NodeData::UnaryOprApp(UnaryOprApp {
                operator: self.token(operator, true),
                argument: Some(self.child(argument, false)),
            }),
            (NEGATION_APP, &[T(operator), N(argument)]) => NodeData::NegationApp(NegationApp {
                operator: self.token(operator, true),
                argument: self.child(argument, false),
            }),
            (PROPERTY_ACCESS, &[N(lhs), T(operator), N(rhs)])
                if self.kind(N(rhs)) == IDENT && self.kind(T(operator)) == DOT =>
            {
                NodeData::PropertyAccess(PropertyAccess {
                    lhs: Some(self.child(lhs, true)),
                    operator: self.token(operator, false),
                    rhs: self.child(rhs, false),
                })
            }
            (IDENT, &[T(token)]) if self.kind(T(token)) == NAME => {
                NodeData::Ident(Ident { token: self.token(token, true) })
            }
            (WILDCARD, &[T(token)]) => NodeData::Wildcard(Wildcard { token: self.token(token, true) }),
            (NUMBER_LITERAL, [_, ..]) => {
                let tokens = self.all_tokens(children)?;
                NodeData::NumericLiteral(NumericLiteral { tokens: self.tokens(&tokens, true) })
            }
            (TEXT_LITERAL, &[T(open), ref rest @ ..]) if self.kind(T(open)) == TEXT_START => {
                let mut tokens = self.all_tokens(rest)?;
                let close = match tokens.last() {
                    Some(&last) if tree.token(last).kind == TEXT_END => tokens.pop(),
                    _ => None,
                };
                NodeData::TextLiteral(TextLiteral {
                    open: Some(self.token(open, true)),
                    elements: self.tokens(&tokens, false),
                    close: close.map(|close| self.token(close, false)),
                })
            }
            (GROUP, &[T(open), ref rest @ ..]) if self.kind(T(open)) == LEFT_PAREN => {
                let (expression, close) = match *rest {
                    [] => (None, None),
                    [N(expression)] => (Some(expression), None),
                    [T(close)] => (None, Some(close)),
                    [N(expression), T(close)] => (Some(expression), Some(close)),
                    _ => return None,
                };
                if close.is_some_and(|close| tree.token(close).kind != RIGHT_PAREN) {
                    return None;
                }
                NodeData::Group(Group {
                    open: Some(self.token(open, true)),
                    expression: expression.map(|expression| self.child(expression, false)),
                    close: close.map(|close| self.token(close, false)),
                })
            }
            (VECTOR, &[T(open), ref rest @ ..]) if self.kind(T(open)) == LEFT_BRACKET => {
                return self.vector(open, rest);
            }
            (BODY_BLOCK, _) => return self.body_block(children),
            (ASSIGNMENT | FUNCTION | EXPRESSION_STATEMENT, _) => {
                return self.statement(node.kind, children);
            }
            (IMPORT, _) => return self.import(children),
            _ => return None,
        };
        Some(data)
    }

    fn opr_app(&mut self, children: &[RawElement]) -> Option<NodeData> {
        let (lhs, rest) = match *children {
            [N(lhs), ref rest @ ..] => (Some(lhs), rest),
            _ => (None, children),
        };
        let (rhs, operators) = match *rest {
            [ref operators @ .., N(rhs)] => (Some(rhs), operators),
            _ => (None, rest),
        };
        let operators = self.all_tokens(operators)?;
        if operators.is_empty() {
            return None;
        }

        let lhs = lhs.map(|lhs| self.child(lhs, true));
        let operators = self.tokens(&operators, lhs.is_none());
        let rhs = rhs.map(|rhs| self.child(rhs, false));
        Some(NodeData::OprApp(OprApp { lhs, operators, rhs }))
    }

    fn vector(&mut self, open: RawTokenId, rest: &[RawElement]) -> Option<NodeData> {
        let (items, close) = match *rest {
            [ref items @ .., T(close)] if self.kind(T(close)) == RIGHT_BRACKET => (items, Some(close)),
            _ => (rest, None),
        };
        let valid = items.iter().all(|&item| matches!(item, N(_)) || self.is_token(item, COMMA))
            && !items.windows(2).any(|pair| matches!(pair, [N(_), N(_)]));
        if !valid {
            return None;
        }

        let open = self.token(open, true);
        let mut elements = Vec::new();
        let mut current = VectorElement { delimiter: None, value: None };
        for &item in items {
            match item {
                T(comma) => {
                    let next = VectorElement { delimiter: Some(self.token(comma, false)), value: None };
                    elements.push(std::mem::replace(&mut current, next));
                }
                N(value) => current.value = Some(self.child(value, false)),
            }
        }
        if current.delimiter.is_some() || current.value.is_some() {
            elements.push(current);
        }
        let close = close.map(|close| self.token(close, false));
        Some(NodeData::Vector(Vector { open, elements, close }))
    }

    fn body_block(&mut self, children: &[RawElement]) -> Option<NodeData> {
        let mut has_line = false;
        let mut has_statement = false;
        for &child in children {
            match child {
                T(_) if self.kind(child) == NEWLINE => {
                    has_line = true;
                    has_statement = false;
                }
                N(_) if has_line && !has_statement => has_statement = true,
                _ => return None,
            }
        }

        let mut lines: Vec<BlockLine> = Vec::new();
        for (i, &child) in children.iter().enumerate() {
            match child {
                T(newline) => {
                    let newline = self.token(newline, i == 0);
                    lines.push(BlockLine { newline, statement: None });
                }
                N(statement) => {
                    let statement = self.child(statement, false);
                    if let Some(line) = lines.last_mut() {
                        line.statement = Some(statement);
                    }
                }
            }
        }
        Some(NodeData::BodyBlock(BodyBlock { lines }))
    }

    fn statement(&mut self, kind: SyntaxKind, children: &[RawElement]) -> Option<NodeData> {
        let (doc, rest) = match *children {
            [N(doc), ref rest @ ..] if self.kind(N(doc)) == DOC_LINE => (Some(doc), rest),
            _ => (None, children),
        };
        let doc_tokens = match doc {
            Some(doc) => Some(self.doc_shape(doc)?),
            None => None,
        };
        let documented = doc.is_some();
        let format = if kind == FUNCTION { DocFormat::Markdown } else { DocFormat::Plain };
        let doc = |this: &mut Self| match &doc_tokens {
            Some(tokens) => Documentation::parsed(format, this.doc_line(tokens)),
            None => Documentation::empty(format),
        };

        let data = match (kind, rest) {
            (ASSIGNMENT, &[N(pattern), T(equals), N(expression)])
                if self.kind(T(equals)) == EQ =>
            {
                NodeData::Assignment(Assignment {
                    doc: doc(self),
                    pattern: self.child(pattern, !documented),
                    equals: self.token(equals, false),
                    expression: self.child(expression, false),
                })
            }
            (EXPRESSION_STATEMENT, &[N(expression)]) => {
                NodeData::ExpressionStatement(ExpressionStatement {
                    doc: doc(self),
                    expression: self.child(expression, !documented),
                })
            }
            (FUNCTION, &[N(name), ref rest @ ..]) if self.kind(N(name)) == IDENT => {
                let equals = rest.iter().position(|&element| self.is_token(element, EQ))?;
                let args = &rest[..equals];
                let body = match &rest[equals + 1..] {
                    [] => None,
                    [N(body)] => Some(*body),
                    _ => return None,
                };
                if !args.iter().all(|arg| matches!(arg, N(_))) {
                    return None;
                }
                let T(equals) = rest[equals] else { return None };

                NodeData::FunctionDef(FunctionDef {
                    doc: doc(self),
                    name: self.child(name, !documented),
                    args: args
                        .iter()
                        .filter_map(|&arg| match arg {
                            N(arg) => Some(self.child(arg, false)),
                            T(_) => None,
                        })
                        .collect(),
                    equals: self.token(equals, false),
                    body: body.map(|body| self.child(body, false)),
                })
            }
            _ => return None,
        };
        Some(data)
    }

    /// Splits a documentation line into its opener, text and trailing line
    /// breaks.
    fn doc_shape(&self, doc: RawNodeId) -> Option<DocTokens> {
        let tokens = self.all_tokens(self.tree.node(doc).children())?;
        let kind = |token: RawTokenId| self.tree.token(token).kind;
        let (&open, rest) = tokens.split_first()?;
        if kind(open) != DOC_START {
            return None;
        }
        let text_len = rest.iter().take_while(|&&t| matches!(kind(t), TEXT_SECTION | DOC_NEWLINE)).count();
        let (text, newlines) = rest.split_at(text_len);
        if !newlines.iter().all(|&t| kind(t) == NEWLINE) {
            return None;
        }
        Some(DocTokens { open, text: text.to_vec(), newlines: newlines.to_vec() })
    }

    fn doc_line(&mut self, tokens: &DocTokens) -> DocLine {
        DocLine {
            open: self.token(tokens.open, true),
            elements: self.tokens(&tokens.text, false),
            newlines: self.tokens(&tokens.newlines, false),
        }
    }

    fn import(&mut self, children: &[RawElement]) -> Option<NodeData> {
        let mut open_segment = false;
        let mut has_body = false;
        let mut has_all = false;
        for &child in children {
            match child {
                _ if has_all => return None,
                T(_) if matches!(self.kind(child), FROM_KW | IMPORT_KW | AS_KW) => {
                    open_segment = true;
                    has_body = false;
                }
                T(_) if self.kind(child) == ALL_KW && open_segment && !has_body => has_all = true,
                N(_) if open_segment && !has_body => has_body = true,
                _ => return None,
            }
        }

        let mut segments: Vec<ImportSegment> = Vec::new();
        let mut all = None;
        for (i, &child) in children.iter().enumerate() {
            match child {
                T(token) if self.kind(child) == ALL_KW => all = Some(self.token(token, false)),
                T(token) => {
                    let header = self.token(token, i == 0);
                    segments.push(ImportSegment { header, body: None });
                }
                N(node) => {
                    let body = self.child(node, false);
                    if let Some(segment) = segments.last_mut() {
                        segment.body = Some(body);
                    }
                }
            }
        }
        Some(NodeData::Import(Import { segments, all }))
    }
}

struct DocTokens {
    open: RawTokenId,
    text: Vec<RawTokenId>,
    newlines: Vec<RawTokenId>,
}
