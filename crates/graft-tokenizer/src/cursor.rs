use std::str::Chars;

use text_size::{TextLen, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

pub(crate) struct Cursor<'src> {
    chars: Chars<'src>,
    len: TextSize,
    previous: char,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(text: &'src str) -> Self {
        Self { chars: text.chars(), len: text.text_len(), previous: '\n' }
    }

    /// Bytes left to consume.
    pub(crate) fn remaining(&self) -> TextSize {
        self.chars.as_str().text_len()
    }

    pub(crate) fn offset(&self) -> TextSize {
        self.len - self.remaining()
    }

    pub(crate) fn previous(&self) -> char {
        self.previous
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn matches(&self, c: char) -> bool {
        !self.is_eof() && self.peek() == c
    }

    pub(crate) fn advance(&mut self) -> char {
        self.previous = self.chars.next().unwrap_or(EOF_CHAR);
        self.previous
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }

    /// Consumes input up to the absolute `offset`.
    pub(crate) fn advance_to(&mut self, offset: TextSize) {
        while self.offset() < offset && !self.is_eof() {
            self.advance();
        }
    }
}
