//! Identity-preserving synchronization between source text and a typed tree.
//!
//! A [`Module`] stores the tree. Text turns into nodes through the
//! abstractor ([`parse_module`]) and back through the printer ([`print`]).
//! When the text is edited, [`apply_text_edits_to_ast`] reparses the edited
//! part and grafts the result onto the tree, keeping every node the edit did
//! not really replace. [`repair`] fixes trees that print to code the parser
//! would read differently.

mod abstractor;
mod build;
mod concrete;
mod config;
mod correspondence;
mod docs;
mod error;
mod id;
mod module;
mod node;
mod parse;
mod print;
mod repair;
mod shared;
mod source_document;
mod sync;
mod text;
mod token;
mod update;

/// Raw tree to module nodes.
pub use abstractor::{Abstracted, Substitutor, abstract_tree};
pub use concrete::{ConcreteChild, Element, PrintContext, concrete_children};
pub use config::SyncConfig;
pub use correspondence::{Correspondence, calculate_correspondence};
pub use docs::{DocFormat, DocLine, Documentation};
pub use error::AstError;
pub use id::{ExternalId, NodeId, TokenId};
pub use module::{Module, Owned};
/// Node records and the kinds of node.
pub use node::{
    App, Assignment, BlockLine, BodyBlock, ExpressionStatement, FunctionDef, Generic,
    GenericChild, Group, Ident, Import, ImportSegment, Invalid, Metadata, NegationApp, Node,
    NodeChild, NodeData, NodeKind, NumericLiteral, OprApp, POSITION, PropertyAccess, TextLiteral,
    UnaryOprApp, VISUALIZATION, Vector, VectorElement, Wildcard,
};
pub use parse::{parse_block, parse_expression, parse_module, parse_module_with_spans, parse_statement};
pub use print::{IdMap, KnownId, Printed, SpanMap, print, print_with};
pub use repair::{Repair, repair, repair_with};
/// Storage boundary for metadata and documentation text.
pub use shared::{KeyValue, LocalMap, LocalText, SharedText};
pub use source_document::{Observer, ObserverHandle, SourceDocument};
pub use sync::{apply_text_edits_to_ast, sync_to_code, sync_tree};
/// Text edits and range arithmetic.
pub use text::{
    SpanTree, TextEdit, apply_text_edits, apply_text_edits_to_spans, enclosing_spans, offset_edit,
    range_encloses, range_intersects, text_change_to_edits, trim_end,
};
pub use text_size::{TextRange, TextSize};
pub use token::Token;
pub use update::{ModuleUpdate, Origin};
