//! Concrete children: each node kind lists its tokens and child nodes in print
//! order, resolving whitespace the node leaves unspecified.

use crate::node::{
    App, Assignment, BodyBlock, ExpressionStatement, FunctionDef, Generic, GenericChild, Group,
    Import, NegationApp, NodeChild, NodeData, NodeKind, NumericLiteral, OprApp, PropertyAccess,
    TextLiteral, UnaryOprApp, Vector,
};
use crate::{Module, NodeId, SyncConfig, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node(NodeId),
    Token(Token),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteChild {
    pub whitespace: String,
    pub element: Element,
}

impl ConcreteChild {
    pub(crate) fn new(whitespace: impl Into<String>, element: Element) -> Self {
        Self { whitespace: whitespace.into(), element }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PrintContext<'a> {
    /// Keep whitespace recorded in the tree even where the defaults would
    /// normalize it.
    pub verbatim: bool,
    /// Indentation of the line the node starts on; `None` at the top level.
    pub indent: Option<&'a str>,
}

pub(crate) trait AsElement {
    fn as_element(&self) -> Element;
}

impl AsElement for NodeId {
    fn as_element(&self) -> Element {
        Element::Node(*self)
    }
}

impl AsElement for Token {
    fn as_element(&self) -> Element {
        Element::Token(self.clone())
    }
}

fn resolved<T: AsElement>(whitespace: &str, child: &NodeChild<T>) -> ConcreteChild {
    ConcreteChild::new(whitespace, child.node.as_element())
}

pub(crate) fn first_child<T: AsElement>(child: &NodeChild<T>) -> ConcreteChild {
    resolved("", child)
}

pub(crate) fn ensure_spaced<T: AsElement>(child: &NodeChild<T>, verbatim: bool) -> ConcreteChild {
    match child.whitespace() {
        Some(ws) if verbatim || !ws.is_empty() => resolved(ws, child),
        _ => resolved(" ", child),
    }
}

pub(crate) fn ensure_unspaced<T: AsElement>(child: &NodeChild<T>, verbatim: bool) -> ConcreteChild {
    match child.whitespace() {
        Some(ws) if verbatim => resolved(ws, child),
        _ => resolved("", child),
    }
}

pub(crate) fn ensure_spaced_only_if<T: AsElement>(
    child: &NodeChild<T>,
    condition: bool,
    verbatim: bool,
) -> ConcreteChild {
    if condition { ensure_spaced(child, verbatim) } else { ensure_unspaced(child, verbatim) }
}

pub(crate) fn prefer_spaced<T: AsElement>(child: &NodeChild<T>) -> ConcreteChild {
    resolved(child.whitespace().unwrap_or(" "), child)
}

pub(crate) fn prefer_unspaced<T: AsElement>(child: &NodeChild<T>) -> ConcreteChild {
    resolved(child.whitespace().unwrap_or(""), child)
}

pub(crate) fn prefer_spaced_if<T: AsElement>(child: &NodeChild<T>, condition: bool) -> ConcreteChild {
    if condition { prefer_spaced(child) } else { prefer_unspaced(child) }
}

/// Lists the children of `data` in print order.
pub fn concrete_children(
    module: &Module,
    data: &NodeData,
    ctx: PrintContext<'_>,
    config: &SyncConfig,
) -> Vec<ConcreteChild> {
    let verbatim = ctx.verbatim;
    let mut out = Vec::new();

    match data {
        NodeData::App(App { function, argument }) => {
            out.push(first_child(function));
            out.push(ensure_spaced(argument, true));
        }
        NodeData::OprApp(opr) => opr_app(opr, verbatim, &mut out),
        NodeData::UnaryOprApp(UnaryOprApp { operator, argument }) => {
            out.push(first_child(operator));
            out.extend(argument.iter().map(|argument| ensure_unspaced(argument, verbatim)));
        }
        NodeData::NegationApp(NegationApp { operator, argument }) => {
            out.push(first_child(operator));
            out.push(ensure_unspaced(argument, verbatim));
        }
        NodeData::PropertyAccess(PropertyAccess { lhs, operator, rhs }) => {
            let spacing = match (lhs, operator.whitespace()) {
                (Some(_), Some(ws)) => Some(ws),
                _ => rhs.whitespace(),
            };
            let spaced = spacing.is_some_and(|ws| !ws.is_empty());
            match lhs {
                Some(lhs) => {
                    out.push(first_child(lhs));
                    out.push(ensure_spaced_only_if(operator, spaced, verbatim));
                }
                None => out.push(first_child(operator)),
            }
            out.push(ensure_spaced_only_if(rhs, spaced, verbatim));
        }
        NodeData::Ident(ident) => out.push(first_child(&ident.token)),
        NodeData::Wildcard(wildcard) => out.push(first_child(&wildcard.token)),
        NodeData::NumericLiteral(NumericLiteral { tokens }) => {
            for (i, token) in tokens.iter().enumerate() {
                out.push(if i == 0 { first_child(token) } else { ensure_unspaced(token, verbatim) });
            }
        }
        NodeData::TextLiteral(TextLiteral { open, elements, close }) => {
            for child in open.iter().chain(elements).chain(close) {
                out.push(if out.is_empty() {
                    first_child(child)
                } else {
                    ensure_unspaced(child, verbatim)
                });
            }
        }
        NodeData::Group(Group { open, expression, close }) => {
            let spaced = open.is_some()
                && expression.as_ref().and_then(NodeChild::whitespace).is_some_and(|ws| !ws.is_empty());
            out.extend(open.iter().map(first_child));
            if let Some(expression) = expression {
                out.push(if open.is_some() {
                    prefer_spaced_if(expression, spaced)
                } else {
                    first_child(expression)
                });
            }
            if let Some(close) = close {
                out.push(if out.is_empty() { first_child(close) } else { prefer_spaced_if(close, spaced) });
            }
        }
        NodeData::Vector(Vector { open, elements, close }) => {
            out.push(ensure_unspaced(open, verbatim));
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.extend(element.delimiter.iter().map(prefer_unspaced));
                    out.extend(element.value.iter().map(prefer_spaced));
                } else {
                    out.extend(element.value.iter().map(prefer_unspaced));
                }
            }
            out.extend(close.iter().map(prefer_unspaced));
        }
        NodeData::BodyBlock(block) => body_block(block, ctx, config, &mut out),
        NodeData::Assignment(Assignment { doc, pattern, equals, expression }) => {
            let documented = doc.push_concrete(ctx.indent, config, &mut out);
            out.push(if documented {
                resolved(ctx.indent.unwrap_or(""), pattern)
            } else {
                ensure_unspaced(pattern, verbatim)
            });
            let is_block = is_block(module, expression.node);
            let spaced = if is_block {
                equals.whitespace() != Some("")
            } else {
                expression.whitespace() != Some("")
            };
            out.push(ensure_spaced_only_if(equals, spaced, verbatim));
            out.push(prefer_spaced_if(expression, !is_block));
        }
        NodeData::FunctionDef(FunctionDef { doc, name, args, equals, body }) => {
            let documented = doc.push_concrete(ctx.indent, config, &mut out);
            out.push(if documented { resolved(ctx.indent.unwrap_or(""), name) } else { first_child(name) });
            out.extend(args.iter().map(|arg| ensure_spaced(arg, verbatim)));
            out.push(resolved(equals.whitespace().unwrap_or(" "), equals));
            if let Some(body) = body {
                let spaced = equals.whitespace().is_some_and(|ws| !ws.is_empty()) && !is_block(module, body.node);
                out.push(prefer_spaced_if(body, spaced));
            }
        }
        NodeData::ExpressionStatement(ExpressionStatement { doc, expression }) => {
            let documented = doc.push_concrete(ctx.indent, config, &mut out);
            out.push(if documented {
                resolved(ctx.indent.unwrap_or(""), expression)
            } else {
                ensure_unspaced(expression, verbatim)
            });
        }
        NodeData::Import(Import { segments, all }) => {
            for segment in segments {
                out.push(if out.is_empty() {
                    first_child(&segment.header)
                } else {
                    ensure_spaced(&segment.header, verbatim)
                });
                out.extend(segment.body.iter().map(|body| ensure_spaced(body, verbatim)));
            }
            out.extend(all.iter().map(|all| ensure_spaced(all, verbatim)));
        }
        NodeData::Invalid(invalid) => out.push(first_child(&invalid.expression)),
        NodeData::Generic(Generic { children }) => {
            for child in children {
                out.push(match child {
                    GenericChild::Node(node) => prefer_unspaced(node),
                    GenericChild::Token(token) => prefer_unspaced(token),
                });
            }
        }
    }

    out
}

fn is_block(module: &Module, id: NodeId) -> bool {
    module.try_get(id).is_ok_and(|node| node.kind() == NodeKind::BodyBlock)
}

fn opr_app(opr: &OprApp, verbatim: bool, out: &mut Vec<ConcreteChild>) {
    let OprApp { lhs, operators, rhs } = opr;
    let Some((first, extra)) = operators.split_first() else {
        out.extend(lhs.iter().chain(rhs).map(prefer_unspaced));
        return;
    };

    let spacing = match (lhs, first.whitespace()) {
        (Some(_), Some(ws)) => Some(ws),
        _ => rhs.as_ref().and_then(NodeChild::whitespace),
    };
    let spaced = spacing.unwrap_or(" ") != "";
    let asymmetric = matches!(first.node.code(), "->" | "=" | "," | ".");
    let apply = |child: &NodeChild<_>| {
        if asymmetric {
            prefer_spaced_if(child, spaced)
        } else {
            ensure_spaced_only_if(child, spaced, verbatim)
        }
    };

    match lhs {
        Some(lhs) => {
            out.push(first_child(lhs));
            out.push(apply_token(first, asymmetric, spaced, verbatim));
        }
        None => out.push(first_child(first)),
    }
    let extras_spaced = extra.first().and_then(NodeChild::whitespace).unwrap_or(" ") != "";
    out.extend(extra.iter().map(|op| ensure_spaced_only_if(op, extras_spaced, verbatim)));
    out.extend(rhs.iter().map(apply));
}

fn apply_token(op: &NodeChild<Token>, asymmetric: bool, spaced: bool, verbatim: bool) -> ConcreteChild {
    if asymmetric { prefer_spaced_if(op, spaced) } else { ensure_spaced_only_if(op, spaced, verbatim) }
}

/// Statements take the indentation of the first statement. Parsed whitespace
/// deeper than the enclosing line is kept; other statements are indented one
/// level deeper than the enclosing line.
fn body_block(
    block: &BodyBlock,
    ctx: PrintContext<'_>,
    config: &SyncConfig,
    out: &mut Vec<ConcreteChild>,
) {
    let mut lines_indent: Option<String> = None;
    for line in &block.lines {
        out.push(prefer_unspaced(&line.newline));
        let Some(statement) = &line.statement else { continue };

        let parsed = statement.whitespace().filter(|ws| match ctx.indent {
            Some(indent) => ws.len() > indent.len(),
            None => true,
        });
        let whitespace = match (parsed, &lines_indent) {
            (Some(ws), _) => ws.to_owned(),
            (None, Some(indent)) => indent.clone(),
            (None, None) => match ctx.indent {
                Some(indent) => format!("{indent}{}", config.block_indent),
                None => String::new(),
            },
        };
        lines_indent.get_or_insert_with(|| whitespace.clone());
        out.push(resolved(&whitespace, statement));
    }
}

#[cfg(test)]
mod tests {
    use graft_syntax::SyntaxKind::*;

    use super::*;

    fn token(whitespace: Option<&str>) -> NodeChild<Token> {
        NodeChild::new(whitespace.map(str::to_owned), Token::new(NAME, "x"))
    }

    #[test]
    fn whitespace_helpers() {
        let ws = |child: ConcreteChild| child.whitespace;

        assert_eq!(ws(ensure_spaced(&token(Some("")), false)), " ");
        assert_eq!(ws(ensure_spaced(&token(Some("")), true)), "");
        assert_eq!(ws(ensure_spaced(&token(Some("  ")), false)), "  ");
        assert_eq!(ws(ensure_spaced(&token(None), true)), " ");

        assert_eq!(ws(ensure_unspaced(&token(Some(" ")), false)), "");
        assert_eq!(ws(ensure_unspaced(&token(Some(" ")), true)), " ");
        assert_eq!(ws(ensure_unspaced(&token(None), true)), "");

        assert_eq!(ws(prefer_spaced(&token(None))), " ");
        assert_eq!(ws(prefer_spaced(&token(Some("")))), "");
        assert_eq!(ws(prefer_unspaced(&token(None))), "");
        assert_eq!(ws(prefer_unspaced(&token(Some("\t")))), "\t");
        assert_eq!(ws(first_child(&token(Some("   ")))), "");
    }
}
