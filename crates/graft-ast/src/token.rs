use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use graft_syntax::SyntaxKind;

use crate::TokenId;
use crate::id::next_raw;

static NEXT_TOKEN: AtomicU32 = AtomicU32::new(0);

/// A lexical token. Tokens are immutable values; their identity exists only
/// so that consumers can recognize a token across prints.
#[derive(Debug, Clone)]
pub struct Token {
    id: TokenId,
    kind: SyntaxKind,
    code: Arc<str>,
}

impl Token {
    pub fn new(kind: SyntaxKind, code: &str) -> Self {
        let id = TokenId::from_raw(next_raw(&NEXT_TOKEN));
        Self { id, kind, code: code.into() }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_newline(&self) -> bool {
        self.kind.is_newline()
    }
}

/// Tokens compare by content.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.code == other.code
    }
}

impl Eq for Token {}

#[cfg(test)]
mod tests {
    use graft_syntax::SyntaxKind::*;

    use super::Token;

    #[test]
    fn equality_ignores_identity() {
        let a = Token::new(NAME, "foo");
        let b = Token::new(NAME, "foo");
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
        assert_ne!(a, Token::new(NAME, "bar"));
        assert_ne!(a, Token::new(TEXT_SECTION, "foo"));
    }
}
