//! Raw concrete syntax shared by the tokenizer, the parser and the tree
//! abstraction.

mod builder;
mod raw;
mod syntax_kind;
mod syntax_set;

/// Incremental builder for constructing a `RawTree`.
pub use builder::Builder;
/// The raw concrete tree and its elements.
pub use raw::{RawElement, RawNode, RawNodeId, RawToken, RawTokenId, RawTree};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
