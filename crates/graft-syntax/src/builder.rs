//! Incremental builder for the raw tree.

use la_arena::Arena;
use text_size::{TextRange, TextSize};

use crate::raw::{RawElement, RawNode, RawNodeId, RawToken, RawTree, empty_at};
use crate::SyntaxKind;

struct Opened {
    node: RawNodeId,
    /// Number of tokens pushed before the node was started.
    first_token: usize,
}

/// Builds a `RawTree` from parser events.
pub struct Builder {
    nodes: Arena<RawNode>,
    tokens: Arena<RawToken>,
    text: Box<str>,
    opened: Vec<Opened>,
    root: Option<RawNodeId>,
    token_count: usize,
    last_token_end: TextSize,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

impl Builder {
    /// Creates a new builder for `text`.
    pub fn new(text: &str) -> Self {
        Self {
            nodes: Arena::new(),
            tokens: Arena::new(),
            text: text.into(),
            opened: Vec::with_capacity(32),
            root: None,
            token_count: 0,
            last_token_end: TextSize::new(0),
        }
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        let at = empty_at(self.last_token_end);
        let node = self.nodes.alloc(RawNode { kind, whitespace: at, code: at, children: Vec::new() });
        match self.opened.last() {
            Some(parent) => self.nodes[parent.node].children.push(RawElement::Node(node)),
            None => {
                assert!(self.root.is_none(), "a raw tree has exactly one root");
                self.root = Some(node);
            }
        }
        self.opened.push(Opened { node, first_token: self.token_count });
    }

    /// Finishes the most recently started node.
    #[track_caller]
    pub fn finish_node(&mut self) {
        let opened = self.opened.pop().expect("no opened nodes?");
        if opened.first_token == self.token_count {
            let at = empty_at(self.last_token_end);
            let node = &mut self.nodes[opened.node];
            node.whitespace = at;
            node.code = at;
        } else {
            let node = &mut self.nodes[opened.node];
            node.code = TextRange::new(node.code.start(), self.last_token_end);
        }
    }

    /// Attaches a token to the current node.
    pub fn token(&mut self, whitespace: TextRange, kind: SyntaxKind, code: TextRange) {
        let token = self.tokens.alloc(RawToken { kind, whitespace, code });
        let parent = self.opened.last().expect("tokens must be inside a node").node;
        self.nodes[parent].children.push(RawElement::Token(token));

        for opened in self.opened.iter().rev() {
            if opened.first_token != self.token_count {
                break;
            }
            let node = &mut self.nodes[opened.node];
            node.whitespace = whitespace;
            node.code = TextRange::empty(code.start());
        }

        self.token_count += 1;
        self.last_token_end = code.end();
    }

    /// Completes the tree.
    #[track_caller]
    pub fn finish(mut self) -> RawTree {
        assert!(self.opened.is_empty(), "unfinished nodes");
        let root = self.root.take().expect("empty tree");
        RawTree {
            nodes: std::mem::take(&mut self.nodes),
            tokens: std::mem::take(&mut self.tokens),
            root,
            text: std::mem::take(&mut self.text),
        }
    }
}
