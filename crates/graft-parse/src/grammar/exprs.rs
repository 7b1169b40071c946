use graft_syntax::SyntaxKind::*;
use graft_syntax::SyntaxSet;
use text_size::TextSize;

use super::{ident, items, single};
use crate::parser::{CompletedMarker, Parser};

const OPERAND_START: SyntaxSet = SyntaxSet::new([
    NAME,
    UNDERSCORE,
    NUMBER,
    TEXT_START,
    LEFT_PAREN,
    LEFT_BRACKET,
    PREFIX_OPERATOR,
]);

const PREFIX_BP: u8 = 12;

#[derive(Clone, Copy)]
struct Restrictions {
    comma: bool,
    eq: bool,
}

pub(crate) fn expr(p: &mut Parser) -> Option<CompletedMarker> {
    spaced(p, 0, Restrictions { comma: true, eq: true })
}

/// Left-hand side of an assignment.
pub(crate) fn pattern(p: &mut Parser) -> Option<CompletedMarker> {
    spaced(p, 0, Restrictions { comma: true, eq: false })
}

pub(crate) fn expr_with_block_argument(
    p: &mut Parser,
    indent: TextSize,
) -> Option<CompletedMarker> {
    let lhs = expr(p)?;

    if p.at(NEWLINE) && p.next_line_indent().is_some_and(|next| next > indent) {
        let m = lhs.precede(p);
        items::block(p, indent);
        return m.complete(p, APP).into();
    }

    lhs.into()
}

fn at_operand_start(p: &Parser) -> bool {
    OPERAND_START.contains(p.peek_kind())
}

/// Binding power and right associativity of an operator.
fn binding_power(operator: &str) -> (u8, bool) {
    match operator {
        "=" => (1, true),
        "," => (2, false),
        "->" => (3, true),
        ":" => (4, false),
        "||" | "|" => (5, false),
        "&&" => (6, false),
        "==" | "!=" | "<" | ">" | "<=" | ">=" => (7, false),
        "+" | "-" => (9, false),
        "*" | "/" | "%" => (10, false),
        "^" => (11, true),
        "." => (13, false),
        _ => (8, false),
    }
}

fn spaced_operator(p: &Parser, r: Restrictions) -> Option<(u8, bool)> {
    match p.peek_kind() {
        BINARY_OPERATOR | DOT => Some(binding_power(p.peek_text())),
        EQ if r.eq => Some(binding_power("=")),
        COMMA if r.comma => Some(binding_power(",")),
        _ => None,
    }
}

fn spaced(p: &mut Parser, min_bp: u8, r: Restrictions) -> Option<CompletedMarker> {
    let mut lhs = if matches!(p.peek_kind(), BINARY_OPERATOR | POSTFIX_OPERATOR) {
        let (bp, _) = binding_power(p.peek_text());
        let m = p.start();
        p.advance();
        if at_operand_start(p) {
            spaced(p, bp + 1, r);
        }
        m.complete(p, OPR_APP)
    } else {
        app(p)?
    };

    while let Some((bp, right_assoc)) = spaced_operator(p, r) {
        if bp < min_bp {
            break;
        }

        let m = lhs.precede(p);
        let symmetric = p.at(BINARY_OPERATOR) && p.peek_text() != "->";
        let operator_spaced = p.is_spaced();
        p.advance();
        if at_operand_start(p) && (!symmetric || p.is_spaced() == operator_spaced) {
            spaced(p, if right_assoc { bp } else { bp + 1 }, r);
        }
        lhs = m.complete(p, OPR_APP);
    }

    lhs.into()
}

fn app(p: &mut Parser) -> Option<CompletedMarker> {
    let mut lhs = tight(p, 0)?;

    while at_operand_start(p) {
        let m = lhs.precede(p);
        tight(p, 0);
        lhs = m.complete(p, APP);
    }

    lhs.into()
}

/// Operators written without surrounding spaces bind tighter than
/// application.
pub(crate) fn tight(p: &mut Parser, min_bp: u8) -> Option<CompletedMarker> {
    let mut lhs = prefix(p)?;

    loop {
        match p.peek_kind() {
            DOT if !p.is_spaced() => {
                let m = lhs.precede(p);
                p.advance();
                lhs = if p.at(NAME) && !p.is_spaced() {
                    ident(p);
                    m.complete(p, PROPERTY_ACCESS)
                } else {
                    m.complete(p, OPR_APP)
                };
            }
            BINARY_OPERATOR if !p.is_spaced() => {
                let (bp, right_assoc) = binding_power(p.peek_text());
                if bp < min_bp {
                    break;
                }

                let m = lhs.precede(p);
                p.advance();
                if at_operand_start(p) && !p.is_spaced() {
                    tight(p, if right_assoc { bp } else { bp + 1 });
                }
                lhs = m.complete(p, OPR_APP);
            }
            POSTFIX_OPERATOR => {
                let m = lhs.precede(p);
                p.advance();
                lhs = m.complete(p, OPR_APP);
            }
            _ => break,
        }
    }

    lhs.into()
}

fn prefix(p: &mut Parser) -> Option<CompletedMarker> {
    if !p.at(PREFIX_OPERATOR) {
        return primary(p);
    }

    let kind = if p.peek_text() == "-" { NEGATION_APP } else { UNARY_OPR_APP };
    let m = p.start();
    p.advance();
    tight(p, PREFIX_BP);
    m.complete(p, kind).into()
}

fn primary(p: &mut Parser) -> Option<CompletedMarker> {
    match p.peek_kind() {
        NAME => ident(p).into(),
        UNDERSCORE => single(p, WILDCARD).into(),
        NUMBER => single(p, NUMBER_LITERAL).into(),
        TEXT_START => text(p).into(),
        LEFT_PAREN => group(p).into(),
        LEFT_BRACKET => vector(p).into(),
        NEWLINE | EOF | RIGHT_PAREN | RIGHT_BRACKET | COMMA | EQ => {
            p.error("expected expression");
            None
        }
        _ => {
            let m = p.start();
            p.error("expected expression");
            p.advance();
            m.complete(p, INVALID).into()
        }
    }
}

fn text(p: &mut Parser) -> CompletedMarker {
    let m = p.start();
    p.advance();
    p.eat(TEXT_SECTION);
    if !p.eat(TEXT_END) {
        p.error("unterminated text literal");
    }
    m.complete(p, TEXT_LITERAL)
}

fn group(p: &mut Parser) -> CompletedMarker {
    let m = p.start();
    p.advance();
    if !p.at(RIGHT_PAREN) && !p.at_line_end() {
        expr(p);
    }
    p.expect(RIGHT_PAREN, "expected ')'");
    m.complete(p, GROUP)
}

fn vector(p: &mut Parser) -> CompletedMarker {
    let m = p.start();
    p.advance();

    while !p.at(RIGHT_BRACKET) && !p.at_line_end() {
        if p.eat(COMMA) {
            continue;
        }
        if spaced(p, 0, Restrictions { comma: false, eq: true }).is_none() || !p.at(COMMA) {
            break;
        }
    }

    p.expect(RIGHT_BRACKET, "expected ']'");
    m.complete(p, VECTOR)
}
