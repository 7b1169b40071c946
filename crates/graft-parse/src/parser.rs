use drop_bomb::DropBomb;
use graft_errors::Diagnostic;
use graft_syntax::{Builder, RawTree, SyntaxKind};
use graft_tokenizer::Token;
use text_size::TextSize;

pub(crate) struct Parser<'src> {
    text: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(text: &'src str) -> Self {
        Self {
            text,
            tokens: graft_tokenizer::tokenize(text),
            pos: 0,
            events: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[track_caller]
    pub(crate) fn nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    pub(crate) fn nth_kind(&self, n: usize) -> SyntaxKind {
        self.nth(n).kind
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.nth_kind(0)
    }

    pub(crate) fn peek_text(&self) -> &'src str {
        &self.text[self.nth(0).kind_range]
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_line_end(&self) -> bool {
        matches!(self.peek_kind(), SyntaxKind::NEWLINE | SyntaxKind::EOF)
    }

    /// A plain name used as a keyword in one position only, such as `as`.
    pub(crate) fn at_contextual_kw(&self, keyword: &str) -> bool {
        self.at(SyntaxKind::NAME) && self.peek_text() == keyword
    }

    pub(crate) fn is_spaced(&self) -> bool {
        self.nth(0).is_spaced()
    }

    /// First token of the next non-blank line, looking past the current
    /// newline token. `None` when only blank lines remain.
    pub(crate) fn next_line_start(&self) -> Option<&Token> {
        self.tokens[self.pos..]
            .iter()
            .find(|token| token.kind != SyntaxKind::NEWLINE)
            .filter(|token| token.kind != SyntaxKind::EOF)
    }

    pub(crate) fn next_line_indent(&self) -> Option<TextSize> {
        self.next_line_start().map(|token| token.leading.len())
    }

    pub(crate) fn advance(&mut self) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        let token = self.tokens[self.pos];
        self.pos += 1;
        self.events.push(Event::Token(token));
    }

    /// Consumes the current token under a different kind.
    pub(crate) fn bump_remap(&mut self, kind: SyntaxKind) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        let mut token = self.tokens[self.pos];
        token.kind = kind;
        self.pos += 1;
        self.events.push(Event::Token(token));
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind, message: &str) {
        if !self.eat(kind) {
            self.error(message);
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn error(&mut self, message: &str) {
        self.diagnostics.push(Diagnostic::error(message, self.nth(0).kind_range));
    }

    /// Scans the rest of the line for an `=` outside of brackets with the same
    /// spacing on both sides. An `=` at the end of the line counts as spaced
    /// either way.
    pub(crate) fn line_has_top_level_eq(&self) -> bool {
        let mut depth = 0u32;
        let rest = &self.tokens[self.pos..];
        for (i, token) in rest.iter().enumerate() {
            match token.kind {
                SyntaxKind::NEWLINE | SyntaxKind::EOF => return false,
                SyntaxKind::LEFT_PAREN | SyntaxKind::LEFT_BRACKET => depth += 1,
                SyntaxKind::RIGHT_PAREN | SyntaxKind::RIGHT_BRACKET => {
                    depth = depth.saturating_sub(1)
                }
                SyntaxKind::EQ if depth == 0 => {
                    return match rest.get(i + 1) {
                        Some(next) if !matches!(next.kind, SyntaxKind::NEWLINE | SyntaxKind::EOF) => {
                            next.is_spaced() == token.is_spaced()
                        }
                        _ => true,
                    };
                }
                _ => {}
            }
        }
        false
    }

    pub(crate) fn build_tree(self) -> (RawTree, Vec<Diagnostic>) {
        let Parser { text, tokens: _, pos: _, mut events, diagnostics } = self;
        let mut builder = Builder::new(text);
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == SyntaxKind::TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != SyntaxKind::TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => {
                    builder.finish_node();
                }
                Event::Token(Token { leading, kind, kind_range }) => {
                    builder.token(leading, kind, kind_range);
                }
            }
        }

        (builder.finish(), diagnostics)
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token(Token),
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Self::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position)
    }
}

pub(crate) struct CompletedMarker {
    pos: u32,
}

impl CompletedMarker {
    fn new(pos: u32) -> Self {
        Self { pos }
    }

    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
