#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum SyntaxKind {
    NEWLINE,
    DOC_NEWLINE,
    NAME,
    UNDERSCORE,
    NUMBER,
    BINARY_OPERATOR,
    PREFIX_OPERATOR,
    POSTFIX_OPERATOR,
    EQ,
    DOT,
    COMMA,
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    TEXT_START,
    TEXT_SECTION,
    TEXT_END,
    DOC_START,

    IMPORT_KW,
    FROM_KW,
    AS_KW,
    ALL_KW,

    UNKNOWN,
    EOF,

    BODY_BLOCK,
    EXPRESSION_STATEMENT,
    ASSIGNMENT,
    FUNCTION,
    IMPORT,
    DOC_LINE,
    APP,
    OPR_APP,
    UNARY_OPR_APP,
    NEGATION_APP,
    PROPERTY_ACCESS,
    IDENT,
    WILDCARD,
    NUMBER_LITERAL,
    TEXT_LITERAL,
    GROUP,
    VECTOR,
    INVALID,
    TOMBSTONE,
}

impl SyntaxKind {
    pub const fn is_newline(self) -> bool {
        matches!(self, Self::NEWLINE | Self::DOC_NEWLINE)
    }

    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            Self::BINARY_OPERATOR
                | Self::PREFIX_OPERATOR
                | Self::POSTFIX_OPERATOR
                | Self::EQ
                | Self::DOT
                | Self::COMMA
        )
    }

    pub const fn is_keyword(self) -> bool {
        matches!(self, Self::IMPORT_KW | Self::FROM_KW | Self::AS_KW | Self::ALL_KW)
    }

    pub const fn is_token(self) -> bool {
        (self as u16) <= Self::EOF as u16
    }
}
