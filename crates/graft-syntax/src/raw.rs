//! Raw concrete tree produced by the parser.
//!
//! Raw nodes carry nothing but a kind, byte ranges and their children. Every
//! byte of the input belongs to exactly one token, either as leading
//! whitespace or as code.

use std::fmt::{self, Write as _};

use la_arena::{Arena, Idx};
use text_size::{TextRange, TextSize};

use crate::SyntaxKind;

pub type RawNodeId = Idx<RawNode>;
pub type RawTokenId = Idx<RawToken>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawElement {
    Node(RawNodeId),
    Token(RawTokenId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub kind: SyntaxKind,
    /// Whitespace immediately preceding the token on its line.
    pub whitespace: TextRange,
    pub code: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    pub kind: SyntaxKind,
    /// Whitespace of the first token in the subtree.
    pub whitespace: TextRange,
    /// From the first code byte of the first token to the end of the last token.
    pub code: TextRange,
    pub(crate) children: Vec<RawElement>,
}

impl RawNode {
    pub fn children(&self) -> &[RawElement] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTree {
    pub(crate) nodes: Arena<RawNode>,
    pub(crate) tokens: Arena<RawToken>,
    pub(crate) root: RawNodeId,
    pub(crate) text: Box<str>,
}

impl RawTree {
    pub fn root(&self) -> RawNodeId {
        self.root
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[track_caller]
    pub fn node(&self, id: RawNodeId) -> &RawNode {
        &self.nodes[id]
    }

    #[track_caller]
    pub fn token(&self, id: RawTokenId) -> &RawToken {
        &self.tokens[id]
    }

    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[range]
    }

    pub fn token_code(&self, id: RawTokenId) -> &str {
        self.slice(self.tokens[id].code)
    }

    pub fn token_whitespace(&self, id: RawTokenId) -> &str {
        self.slice(self.tokens[id].whitespace)
    }

    pub fn node_whitespace(&self, id: RawNodeId) -> &str {
        self.slice(self.nodes[id].whitespace)
    }

    pub fn element_whitespace(&self, element: RawElement) -> &str {
        match element {
            RawElement::Node(node) => self.node_whitespace(node),
            RawElement::Token(token) => self.token_whitespace(token),
        }
    }

    pub fn element_kind(&self, element: RawElement) -> SyntaxKind {
        match element {
            RawElement::Node(node) => self.nodes[node].kind,
            RawElement::Token(token) => self.tokens[token].kind,
        }
    }

    pub fn element_code(&self, element: RawElement) -> TextRange {
        match element {
            RawElement::Node(node) => self.nodes[node].code,
            RawElement::Token(token) => self.tokens[token].code,
        }
    }

    /// Tokens of a subtree, in source order.
    pub fn tokens_of(&self, node: RawNodeId) -> Vec<RawTokenId> {
        let mut out = Vec::new();
        self.collect_tokens(node, &mut out);
        out
    }

    fn collect_tokens(&self, node: RawNodeId, out: &mut Vec<RawTokenId>) {
        for &child in &self.nodes[node].children {
            match child {
                RawElement::Node(node) => self.collect_tokens(node, out),
                RawElement::Token(token) => out.push(token),
            }
        }
    }

    /// Indented dump used by snapshot tests.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out).expect("writing to a String cannot fail");
        out
    }

    fn dump_node(&self, id: RawNodeId, depth: usize, out: &mut String) -> fmt::Result {
        let node = &self.nodes[id];
        writeln!(out, "{:indent$}{:?}@{:?}", "", node.kind, node.code, indent = depth * 2)?;
        for &child in &node.children {
            match child {
                RawElement::Node(child) => self.dump_node(child, depth + 1, out)?,
                RawElement::Token(token) => {
                    let token = &self.tokens[token];
                    writeln!(
                        out,
                        "{:indent$}{:?}@{:?} {:?}",
                        "",
                        token.kind,
                        token.code,
                        &self.text[token.code],
                        indent = (depth + 1) * 2
                    )?;
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn empty_at(offset: TextSize) -> TextRange {
    TextRange::empty(offset)
}
