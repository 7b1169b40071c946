use graft_syntax::SyntaxKind::*;

use crate::parser::{CompletedMarker, Parser};

pub(crate) mod exprs;
pub(crate) mod items;

fn ident(p: &mut Parser) -> CompletedMarker {
    debug_assert_eq!(p.peek_kind(), NAME);

    let m = p.start();
    p.advance();
    m.complete(p, IDENT)
}

fn single(p: &mut Parser, kind: graft_syntax::SyntaxKind) -> CompletedMarker {
    let m = p.start();
    p.advance();
    m.complete(p, kind)
}
