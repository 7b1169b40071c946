use graft_syntax::SyntaxKind::{self, *};
use text_size::TextSize;

use super::{exprs, ident, single};
use crate::parser::Parser;

pub(crate) fn module(p: &mut Parser) {
    let m = p.start();
    lines(p, None);
    m.complete(p, BODY_BLOCK);
}

/// Indented lines following the line indented by `line_indent`.
pub(crate) fn block(p: &mut Parser, line_indent: TextSize) {
    let m = p.start();
    lines(p, Some(line_indent));
    m.complete(p, BODY_BLOCK);
}

/// Every line starts with a newline token; the one for the first line is
/// synthesized by the tokenizer. Inside a nested block, a line ends the block
/// unless it is indented deeper than `parent_indent`. Blank lines before such a
/// line belong to the enclosing block.
fn lines(p: &mut Parser, parent_indent: Option<TextSize>) {
    let mut block_indent = None;

    while !p.at(EOF) {
        if !p.at(NEWLINE) {
            let m = p.start();
            p.error("expected a new line");
            while !p.at_line_end() {
                p.advance();
            }
            m.complete(p, INVALID);
            continue;
        }

        if let Some(parent) = parent_indent {
            match p.next_line_indent() {
                Some(indent) if indent > parent => {}
                _ => break,
            }
        }

        p.advance();
        if p.at_line_end() {
            continue;
        }

        let indent = p.nth(0).leading.len();
        if *block_indent.get_or_insert(indent) != indent {
            p.error("inconsistent indentation");
        }
        statement(p, indent);
    }
}

fn statement(p: &mut Parser, indent: TextSize) {
    let m = p.start();

    if p.at(DOC_START) && !doc_line(p, indent) {
        p.error("documentation comment is not followed by a statement");
        m.complete(p, INVALID);
        return;
    }

    let kind = match p.peek_kind() {
        IMPORT_KW | FROM_KW => {
            if import(p) { IMPORT } else { INVALID }
        }
        _ if p.line_has_top_level_eq() => definition(p, indent),
        _ => {
            exprs::expr_with_block_argument(p, indent);
            EXPRESSION_STATEMENT
        }
    };

    let kind = if p.at_line_end() {
        kind
    } else {
        p.error("unexpected tokens at the end of the line");
        while !p.at_line_end() {
            p.advance();
        }
        INVALID
    };

    m.complete(p, kind);
}

/// Returns whether a statement at the same indentation follows; in that case
/// the newlines leading to it are part of the documentation line.
fn doc_line(p: &mut Parser, indent: TextSize) -> bool {
    let m = p.start();
    p.advance();

    while matches!(p.peek_kind(), TEXT_SECTION | DOC_NEWLINE) {
        p.advance();
    }

    let documents_next = p.at(NEWLINE)
        && p.next_line_start()
            .is_some_and(|next| next.leading.len() == indent && next.kind != DOC_START);
    if documents_next {
        while p.at(NEWLINE) {
            p.advance();
        }
    }

    m.complete(p, DOC_LINE);
    documents_next
}

/// Returns whether the import is well formed. Every part after the first
/// keyword is separated from the previous one by spaces.
fn import(p: &mut Parser) -> bool {
    if p.eat(FROM_KW) {
        if !import_path(p) || !spaced_keyword(p, IMPORT_KW, "expected 'import'") {
            return false;
        }
        if !p.is_spaced() {
            p.error("expected a space before the imported names");
            return false;
        }
        if p.at_contextual_kw("all") {
            p.bump_remap(ALL_KW);
        } else if exprs::expr(p).is_none() {
            p.error("expected imported names");
            return false;
        }
    } else {
        p.advance();
        if !import_path(p) {
            return false;
        }
        if p.at_contextual_kw("as") {
            if !p.is_spaced() {
                p.error("expected a space before 'as'");
                return false;
            }
            p.bump_remap(AS_KW);
            if !(p.at(NAME) && p.is_spaced()) {
                p.error("expected an alias");
                return false;
            }
            ident(p);
        }
    }
    true
}

fn import_path(p: &mut Parser) -> bool {
    if !(p.at(NAME) && p.is_spaced()) {
        p.error("expected a module path");
        return false;
    }
    exprs::tight(p, 0);
    true
}

fn spaced_keyword(p: &mut Parser, kind: SyntaxKind, message: &str) -> bool {
    if p.at(kind) && p.is_spaced() {
        p.advance();
        true
    } else {
        p.error(message);
        false
    }
}

fn definition(p: &mut Parser, indent: TextSize) -> SyntaxKind {
    if p.at(NAME) && is_function_head(p) {
        ident(p);
        while !p.at(EQ) {
            match p.peek_kind() {
                NAME => _ = ident(p),
                _ => _ = single(p, WILDCARD),
            }
        }
        p.advance();
        body(p, indent);
        return FUNCTION;
    }

    if exprs::pattern(p).is_none() {
        return INVALID;
    }
    if !p.eat(EQ) {
        p.error("expected '='");
        return INVALID;
    }

    if body(p, indent) {
        ASSIGNMENT
    } else {
        p.error("expected an expression after '='");
        INVALID
    }
}

/// `name arg1 _ arg3 =`: a name followed by at least one argument name.
fn is_function_head(p: &Parser) -> bool {
    let mut n = 1;
    while matches!(p.nth_kind(n), NAME | UNDERSCORE) {
        n += 1;
    }
    n > 1 && p.nth_kind(n) == EQ
}

fn body(p: &mut Parser, indent: TextSize) -> bool {
    if p.at(NEWLINE) {
        let nested = p.next_line_indent().is_some_and(|next| next > indent);
        if nested {
            block(p, indent);
        }
        return nested;
    }

    !p.at(EOF) && exprs::expr_with_block_argument(p, indent).is_some()
}
