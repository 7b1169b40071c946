mod cursor;

use std::collections::VecDeque;

use cursor::Cursor;
pub use graft_syntax::SyntaxKind;
use graft_syntax::SyntaxKind::*;
use text_size::{TextLen, TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Spaces and tabs between the previous token and this one.
    pub leading: TextRange,
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
}

impl Token {
    fn new(leading: TextRange, kind: SyntaxKind, kind_range: TextRange) -> Self {
        Self { leading, kind, kind_range }
    }

    fn unspaced(kind: SyntaxKind, kind_range: TextRange) -> Self {
        Self::new(TextRange::empty(kind_range.start()), kind, kind_range)
    }

    pub fn is_spaced(&self) -> bool {
        !self.leading.is_empty()
    }
}

/// Lexes the whole input, ending with an `EOF` token.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        tokens.push(token);
        if token.kind == EOF {
            return tokens;
        }
    }
}

pub struct Tokenizer<'src> {
    text: &'src str,
    cursor: Cursor<'src>,
    pending: VecDeque<Token>,
    started: bool,
    line_start: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            cursor: Cursor::new(text),
            pending: VecDeque::new(),
            started: false,
            line_start: true,
        }
    }

    fn offset(&self) -> TextSize {
        self.cursor.offset()
    }

    fn line_end(&self, from: TextSize) -> TextSize {
        let rest = &self.text[usize::from(from)..];
        let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
        from + TextSize::new(len as u32)
    }

    fn line_break_len(&self, at: TextSize) -> TextSize {
        let rest = &self.text[usize::from(at)..];
        if rest.starts_with("\r\n") {
            TextSize::new(2)
        } else if rest.starts_with(['\n', '\r']) {
            TextSize::new(1)
        } else {
            TextSize::new(0)
        }
    }

    fn indentation(&self, from: TextSize) -> TextSize {
        let rest = &self.text[usize::from(from)..];
        let len = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        TextSize::new(len as u32)
    }

    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.pending.pop_front() {
            return token;
        }

        if !self.started {
            self.started = true;
            return Token::unspaced(NEWLINE, TextRange::empty(0.into()));
        }

        let whitespace_start = self.offset();
        self.cursor.advance_while(|c| c == ' ' || c == '\t');
        let leading = TextRange::new(whitespace_start, self.offset());
        let line_start = std::mem::replace(&mut self.line_start, false);

        if self.cursor.is_eof() {
            if !leading.is_empty() {
                // Trailing whitespace at the end of input ends the last line.
                return Token::unspaced(NEWLINE, leading);
            }
            return Token::unspaced(EOF, TextRange::empty(self.offset()));
        }

        let start = self.offset();
        let kind = match self.cursor.peek() {
            '\n' | '\r' => {
                self.line_break();
                NEWLINE
            }
            '#' if line_start && self.cursor.second() == '#' => return self.doc_comment(leading),
            '#' => {
                self.cursor.advance_while(|c| c != '\n' && c != '\r');
                self.line_break();
                NEWLINE
            }
            '\'' | '"' => return self.text_literal(leading),
            _ => self.syntax_kind(),
        };

        if kind == NEWLINE {
            self.line_start = true;
        }
        Token::new(leading, kind, TextRange::new(start, self.offset()))
    }

    fn line_break(&mut self) {
        if self.cursor.matches('\r') {
            self.cursor.advance();
        }
        if self.cursor.matches('\n') {
            self.cursor.advance();
        }
    }

    fn syntax_kind(&mut self) -> SyntaxKind {
        let previous = self.cursor.previous();
        let start = self.offset();

        match self.cursor.advance() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            ',' => COMMA,
            first_char @ '0'..='9' => self.number(first_char),
            'A'..='Z' | 'a'..='z' | '_' => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

                match &self.text[TextRange::new(start, self.offset())] {
                    "_" => UNDERSCORE,
                    "import" => IMPORT_KW,
                    "from" => FROM_KW,
                    _ => NAME,
                }
            }
            first_char if is_operator(first_char) => {
                self.cursor.advance_while(is_operator);

                let left_bound = match previous {
                    '(' | '[' | ',' => false,
                    prev => !prev.is_whitespace(),
                };

                let right_bound = match self.cursor.peek() {
                    ')' | ']' | ',' | '#' => false,
                    _ if self.cursor.is_eof() => false,
                    peeked => !peeked.is_whitespace(),
                };

                match &self.text[TextRange::new(start, self.offset())] {
                    "=" => EQ,
                    "." => DOT,
                    _ => {
                        if left_bound == right_bound {
                            BINARY_OPERATOR
                        } else if left_bound {
                            POSTFIX_OPERATOR
                        } else {
                            PREFIX_OPERATOR
                        }
                    }
                }
            }
            _ => UNKNOWN,
        }
    }

    fn number(&mut self, c: char) -> SyntaxKind {
        if c == '0' && matches!(self.cursor.peek(), 'b' | 'o' | 'x') {
            let allow_hex = self.cursor.advance() == 'x';
            self.digits(allow_hex);
            return NUMBER;
        }

        self.digits(false);

        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            self.digits(false);
        }

        if self.cursor.matches('e') || self.cursor.matches('E') {
            self.float_exponent();
        }

        NUMBER
    }

    fn digits(&mut self, allow_hex: bool) {
        loop {
            match self.cursor.peek() {
                '_' | '0'..='9' => {
                    self.cursor.advance();
                }
                'a'..='f' | 'A'..='F' if allow_hex => {
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    fn float_exponent(&mut self) {
        let exponent_digit = match self.cursor.second() {
            '-' | '+' => {
                let mut rest = self.text[usize::from(self.offset())..].chars().skip(2);
                rest.next().is_some_and(|c| c.is_ascii_digit())
            }
            c => c.is_ascii_digit(),
        };
        if !exponent_digit {
            return;
        }

        self.cursor.advance();
        if self.cursor.matches('-') || self.cursor.matches('+') {
            self.cursor.advance();
        }
        self.digits(false);
    }

    /// `'text'` and `"text"`: an opening quote, an optional section and a
    /// closing quote when one is found before the end of the line.
    fn text_literal(&mut self, leading: TextRange) -> Token {
        let start = self.offset();
        let quote = self.cursor.advance();
        let open = Token::new(leading, TEXT_START, TextRange::new(start, self.offset()));

        let section_start = self.offset();
        let mut escaped = false;
        while !self.cursor.is_eof() {
            let c = self.cursor.peek();
            if c == '\n' || c == '\r' || (c == quote && !escaped) {
                break;
            }
            escaped = c == '\\' && !escaped;
            self.cursor.advance();
        }
        let section = TextRange::new(section_start, self.offset());
        if !section.is_empty() {
            self.pending.push_back(Token::unspaced(TEXT_SECTION, section));
        }

        if self.cursor.matches(quote) {
            let close_start = self.offset();
            self.cursor.advance();
            self.pending
                .push_back(Token::unspaced(TEXT_END, TextRange::new(close_start, self.offset())));
        }

        open
    }

    /// `##` at the start of a line opens a documentation comment. Following
    /// lines indented deeper than the `##` continue it; blank lines are kept
    /// when another continuation line follows them.
    fn doc_comment(&mut self, leading: TextRange) -> Token {
        let indent = leading.len();
        let start = self.offset();
        self.cursor.advance();
        self.cursor.advance();
        let open = Token::new(leading, DOC_START, TextRange::new(start, self.offset()));

        let first_line = TextRange::new(self.offset(), self.line_end(self.offset()));
        let text_start = first_line.start() + self.indentation(first_line.start());
        if text_start < first_line.end() {
            self.pending.push_back(Token::new(
                TextRange::new(first_line.start(), text_start),
                TEXT_SECTION,
                TextRange::new(text_start, first_line.end()),
            ));
        } else if !first_line.is_empty() {
            self.pending.push_back(Token::unspaced(TEXT_SECTION, first_line));
        }

        let mut position = first_line.end();
        let mut continuation_indent = None;
        while let Some(next) = self.doc_continuation(position, indent, &mut continuation_indent) {
            position = next;
        }

        self.cursor.advance_to(position);
        open
    }

    /// Emits the tokens of the next continuation line after the line break at
    /// `position`, returning the new end of the comment.
    fn doc_continuation(
        &mut self,
        position: TextSize,
        indent: TextSize,
        continuation_indent: &mut Option<TextSize>,
    ) -> Option<TextSize> {
        let mut breaks = Vec::new();
        let mut blank_lines = Vec::new();
        let mut line_break = position;
        loop {
            let break_len = self.line_break_len(line_break);
            if break_len == 0.into() {
                return None;
            }
            breaks.push(TextRange::at(line_break, break_len));
            let line_start = line_break + break_len;
            let line_indent = self.indentation(line_start);
            let line_end = self.line_end(line_start);
            if line_start + line_indent == line_end {
                blank_lines.push(TextRange::new(line_start, line_end));
                if line_end == self.text.text_len() {
                    return None;
                }
                line_break = line_end;
                continue;
            }
            if line_indent <= indent {
                return None;
            }

            for (line_break, blank) in breaks.iter().zip(blank_lines.iter().map(Some).chain([None]))
            {
                self.pending.push_back(Token::unspaced(DOC_NEWLINE, *line_break));
                match blank {
                    Some(blank) if !blank.is_empty() => {
                        self.pending.push_back(Token::unspaced(TEXT_SECTION, *blank));
                    }
                    _ => {}
                }
            }

            let section_indent = *continuation_indent.get_or_insert(line_indent);
            let section_indent = section_indent.min(line_indent);
            let section_start = line_start + section_indent;
            self.pending.push_back(Token::new(
                TextRange::new(line_start, section_start),
                TEXT_SECTION,
                TextRange::new(section_start, line_end),
            ));
            return Some(line_end);
        }
    }
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '/' | '='
            | '-'
            | '+'
            | '*'
            | '%'
            | '<'
            | '>'
            | '!'
            | '&'
            | '|'
            | '^'
            | '~'
            | '.'
            | '?'
            | ':'
            | '@'
            | '$'
            | '\\'
    )
}

#[cfg(test)]
mod tests {
    use expect_test::{Expect, expect};

    use super::*;

    fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
        &text[token.kind_range]
    }

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokenize(text).into_iter().map(|token| token.kind).collect()
    }

    fn check(text: &str, expect: Expect) {
        let actual = tokenize(text)
            .iter()
            .map(|token| {
                format!(
                    "{:?} {:?} {:?}\n",
                    token.kind,
                    &text[token.leading],
                    token_text(token, text)
                )
            })
            .collect::<String>();
        expect.assert_eq(&actual);
    }

    #[test]
    fn test_number_literals() {
        let inputs = ["123", "0", "0b1010", "0o755", "0x1f", "123_456", "1.5", "1e10", "1.0e-5"];

        for input in inputs {
            let tokens = tokenize(input);
            assert_eq!(tokens[1].kind, NUMBER, "Input: '{}'", input);
            assert_eq!(token_text(&tokens[1], input), input, "Input: '{}'", input);
            assert_eq!(tokens[2].kind, EOF, "Input: '{}'", input);
        }
    }

    #[test]
    fn test_number_followed_by_property() {
        assert_eq!(kinds("1.foo"), [NEWLINE, NUMBER, DOT, NAME, EOF]);
    }

    #[test]
    fn test_eq_operator() {
        assert_eq!(kinds("x = y"), [NEWLINE, NAME, EQ, NAME, EOF]);
        assert_eq!(kinds("x=y"), [NEWLINE, NAME, EQ, NAME, EOF]);
        assert_eq!(kinds("x == y"), [NEWLINE, NAME, BINARY_OPERATOR, NAME, EOF]);
    }

    #[test]
    fn test_operator_boundedness() {
        let inputs = [
            ("a+b", BINARY_OPERATOR),
            ("a + b", BINARY_OPERATOR),
            ("f -a", PREFIX_OPERATOR),
            ("a++ b", POSTFIX_OPERATOR),
            ("(-a)", PREFIX_OPERATOR),
        ];

        for (input, expected) in inputs {
            let operator = tokenize(input)
                .into_iter()
                .find(|token| token.kind.is_operator())
                .unwrap_or_else(|| panic!("no operator in '{input}'"));
            assert_eq!(operator.kind, expected, "Input: '{}'", input);
        }
    }

    #[test]
    fn test_keywords_and_wildcard() {
        assert_eq!(kinds("from A import _"), [NEWLINE, FROM_KW, NAME, IMPORT_KW, UNDERSCORE, EOF]);
        assert_eq!(kinds("as all"), [NEWLINE, NAME, NAME, EOF]);
    }

    #[test]
    fn test_lines_and_comments() {
        check(
            "x\n  y # note\r\n",
            expect![[r###"
                NEWLINE "" ""
                NAME "" "x"
                NEWLINE "" "\n"
                NAME "  " "y"
                NEWLINE " " "# note\r\n"
                EOF "" ""
            "###]],
        );
    }

    #[test]
    fn test_trailing_whitespace_ends_last_line() {
        check(
            "x  ",
            expect![[r###"
                NEWLINE "" ""
                NAME "" "x"
                NEWLINE "" "  "
                EOF "" ""
            "###]],
        );
    }

    #[test]
    fn test_text_literals() {
        check(
            "'a\\'b' \"\"",
            expect![[r###"
                NEWLINE "" ""
                TEXT_START "" "'"
                TEXT_SECTION "" "a\\'b"
                TEXT_END "" "'"
                TEXT_START " " "\""
                TEXT_END "" "\""
                EOF "" ""
            "###]],
        );
        assert_eq!(kinds("'open"), [NEWLINE, TEXT_START, TEXT_SECTION, EOF]);
    }

    #[test]
    fn test_doc_comment_with_continuation() {
        check(
            "## A multiline\n       comment\n\n   Second\nfoo",
            expect![[r###"
                NEWLINE "" ""
                DOC_START "" "##"
                TEXT_SECTION " " "A multiline"
                DOC_NEWLINE "" "\n"
                TEXT_SECTION "       " "comment"
                DOC_NEWLINE "" "\n"
                DOC_NEWLINE "" "\n"
                TEXT_SECTION "   " "Second"
                NEWLINE "" "\n"
                NAME "" "foo"
                EOF "" ""
            "###]],
        );
    }

    #[test]
    fn test_doc_comment_keeps_deeper_indentation_in_text() {
        check(
            "## Doc\n   first\n     deeper\nx",
            expect![[r###"
                NEWLINE "" ""
                DOC_START "" "##"
                TEXT_SECTION " " "Doc"
                DOC_NEWLINE "" "\n"
                TEXT_SECTION "   " "first"
                DOC_NEWLINE "" "\n"
                TEXT_SECTION "   " "  deeper"
                NEWLINE "" "\n"
                NAME "" "x"
                EOF "" ""
            "###]],
        );
    }

    #[test]
    fn test_doc_comment_ends_before_blank_lines() {
        check(
            "## Doc\n\nx",
            expect![[r###"
                NEWLINE "" ""
                DOC_START "" "##"
                TEXT_SECTION " " "Doc"
                NEWLINE "" "\n"
                NEWLINE "" "\n"
                NAME "" "x"
                EOF "" ""
            "###]],
        );
    }

    #[test]
    fn test_double_hash_after_code_is_a_comment() {
        assert_eq!(kinds("x ## not docs\ny"), [NEWLINE, NAME, NEWLINE, NAME, EOF]);
    }
}
