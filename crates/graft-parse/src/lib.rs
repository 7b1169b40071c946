use graft_errors::Diagnostic;
use graft_syntax::RawTree;

mod grammar;
mod parser;

#[derive(Debug)]
pub struct Parse {
    tree: RawTree,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    pub fn tree(&self) -> &RawTree {
        &self.tree
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (RawTree, Vec<Diagnostic>) {
        (self.tree, self.diagnostics)
    }
}

/// Parses a whole source file. The root is always a `BODY_BLOCK`.
pub fn parse_module(text: &str) -> Parse {
    let mut parser = parser::Parser::new(text);
    grammar::items::module(&mut parser);
    let (tree, diagnostics) = parser.build_tree();
    Parse { tree, diagnostics }
}

/// Parses the text of a block on its own, as it would appear nested in a
/// module. Leading indentation of the first line sets the block's indentation.
pub fn parse_block(text: &str) -> Parse {
    let _span = tracing::trace_span!("parse_block", len = text.len()).entered();
    parse_module(text)
}
