//! Constructors for building trees in code. Whitespace is left to the printer
//! wherever the default layout is wanted.

use graft_syntax::SyntaxKind::{self, *};

use crate::docs::{DocFormat, Documentation};
use crate::node::{
    App, Assignment, BlockLine, BodyBlock, ExpressionStatement, FunctionDef, Group, Ident,
    NegationApp, NodeChild, NodeData, NumericLiteral, OprApp, PropertyAccess, TextLiteral, Vector,
    VectorElement, Wildcard,
};
use crate::{AstError, Module, NodeId, Owned, Token};

fn token(kind: SyntaxKind, code: &str) -> Token {
    Token::new(kind, code)
}

fn operator_kind(code: &str) -> SyntaxKind {
    match code {
        "=" => EQ,
        "." => DOT,
        "," => COMMA,
        _ => BINARY_OPERATOR,
    }
}

impl Ident {
    pub fn new(module: &mut Module, name: &str) -> Owned {
        let token = NodeChild::unspaced(token(NAME, name));
        module.alloc(NodeData::Ident(Ident { token }))
    }
}

impl Wildcard {
    pub fn new(module: &mut Module) -> Owned {
        let token = NodeChild::unspaced(token(UNDERSCORE, "_"));
        module.alloc(NodeData::Wildcard(Wildcard { token }))
    }
}

impl NumericLiteral {
    pub fn new(module: &mut Module, value: &str) -> Owned {
        let tokens = vec![NodeChild::unspaced(token(NUMBER, value))];
        module.alloc(NodeData::NumericLiteral(NumericLiteral { tokens }))
    }
}

impl TextLiteral {
    /// A single-line literal. Text containing a single quote is wrapped in
    /// double quotes instead.
    pub fn new(module: &mut Module, text: &str) -> Owned {
        let quote = if text.contains('\'') { "\"" } else { "'" };
        let elements = if text.is_empty() {
            Vec::new()
        } else {
            vec![NodeChild::unspaced(token(TEXT_SECTION, text))]
        };
        module.alloc(NodeData::TextLiteral(TextLiteral {
            open: Some(NodeChild::unspaced(token(TEXT_START, quote))),
            elements,
            close: Some(NodeChild::unspaced(token(TEXT_END, quote))),
        }))
    }
}

impl Group {
    pub fn new(module: &mut Module, expression: Owned) -> Owned {
        module.alloc(NodeData::Group(Group {
            open: Some(NodeChild::unspaced(token(LEFT_PAREN, "("))),
            expression: Some(NodeChild::unspaced(expression.into_id())),
            close: Some(NodeChild::unspaced(token(RIGHT_PAREN, ")"))),
        }))
    }
}

impl OprApp {
    pub fn new(module: &mut Module, lhs: Option<Owned>, operator: &str, rhs: Option<Owned>) -> Owned {
        module.alloc(NodeData::OprApp(OprApp {
            lhs: lhs.map(|lhs| NodeChild::unspaced(lhs.into_id())),
            operators: vec![NodeChild::autospaced(token(operator_kind(operator), operator))],
            rhs: rhs.map(|rhs| NodeChild::autospaced(rhs.into_id())),
        }))
    }
}

impl App {
    pub fn positional(module: &mut Module, function: Owned, argument: Owned) -> Owned {
        module.alloc(NodeData::App(App {
            function: NodeChild::autospaced(function.into_id()),
            argument: NodeChild::autospaced(argument.into_id()),
        }))
    }
}

impl NegationApp {
    pub fn new(module: &mut Module, argument: Owned) -> Owned {
        module.alloc(NodeData::NegationApp(NegationApp {
            operator: NodeChild::unspaced(token(PREFIX_OPERATOR, "-")),
            argument: NodeChild::unspaced(argument.into_id()),
        }))
    }
}

impl PropertyAccess {
    pub fn new(module: &mut Module, lhs: Owned, rhs: &str) -> Owned {
        let rhs = Ident::new(module, rhs);
        module.alloc(NodeData::PropertyAccess(PropertyAccess {
            lhs: Some(NodeChild::unspaced(lhs.into_id())),
            operator: NodeChild::unspaced(token(DOT, ".")),
            rhs: NodeChild::unspaced(rhs.into_id()),
        }))
    }
}

impl Vector {
    pub fn new(module: &mut Module, values: Vec<Owned>) -> Owned {
        let elements = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| VectorElement {
                delimiter: (i > 0).then(|| NodeChild::unspaced(token(COMMA, ","))),
                value: Some(NodeChild::autospaced(value.into_id())),
            })
            .collect();
        module.alloc(NodeData::Vector(Vector {
            open: NodeChild::unspaced(token(LEFT_BRACKET, "[")),
            elements,
            close: Some(NodeChild::unspaced(token(RIGHT_BRACKET, "]"))),
        }))
    }
}

impl Assignment {
    /// `name = expression`
    pub fn new(module: &mut Module, name: &str, expression: Owned) -> Owned {
        let pattern = Ident::new(module, name);
        module.alloc(NodeData::Assignment(Assignment {
            doc: Documentation::empty(DocFormat::Plain),
            pattern: NodeChild::autospaced(pattern.into_id()),
            equals: NodeChild::spaced(token(EQ, "=")),
            expression: NodeChild::spaced(expression.into_id()),
        }))
    }
}

impl ExpressionStatement {
    pub fn new(module: &mut Module, expression: Owned) -> Owned {
        module.alloc(NodeData::ExpressionStatement(ExpressionStatement {
            doc: Documentation::empty(DocFormat::Plain),
            expression: NodeChild::autospaced(expression.into_id()),
        }))
    }
}

impl FunctionDef {
    /// `name arg… = body`; a block body goes on the following lines.
    pub fn new(module: &mut Module, name: &str, args: &[&str], body: Owned) -> Owned {
        let name = Ident::new(module, name);
        let args = args.iter().map(|arg| NodeChild::spaced(Ident::new(module, arg).into_id())).collect();
        module.alloc(NodeData::FunctionDef(FunctionDef {
            doc: Documentation::empty(DocFormat::Markdown),
            name: NodeChild::unspaced(name.into_id()),
            args,
            equals: NodeChild::spaced(token(EQ, "=")),
            body: Some(NodeChild::autospaced(body.into_id())),
        }))
    }
}

fn block_line(statement: Owned) -> BlockLine {
    BlockLine {
        newline: NodeChild::unspaced(token(NEWLINE, "\n")),
        statement: Some(NodeChild::autospaced(statement.into_id())),
    }
}

impl BodyBlock {
    pub fn new(module: &mut Module, statements: Vec<Owned>) -> Owned {
        let lines = statements.into_iter().map(block_line).collect();
        module.alloc(NodeData::BodyBlock(BodyBlock { lines }))
    }

    pub fn push(module: &mut Module, block: NodeId, statement: Owned) -> Result<(), AstError> {
        let len = statement_lines(module, block)?.len();
        Self::insert(module, block, len, statement)
    }

    /// Inserts `statement` before the `index`th statement of `block`.
    pub fn insert(
        module: &mut Module,
        block: NodeId,
        index: usize,
        statement: Owned,
    ) -> Result<(), AstError> {
        let lines = statement_lines(module, block)?;
        if module.try_get(statement.id())?.parent().is_some() {
            return Err(AstError::AlreadyParented(statement.id()));
        }
        let position = lines.get(index).copied().unwrap_or_else(|| line_count(module, block));
        let statement_id = statement.id();

        let NodeData::BodyBlock(body) = &mut module.node_mut(block).data else { unreachable!() };
        body.lines.insert(position, block_line(statement));
        module.set_parent_if_changed(statement_id, block);
        Ok(())
    }

    /// Removes the line holding `statement` and returns the statement, now
    /// detached.
    pub fn remove_statement(
        module: &mut Module,
        block: NodeId,
        statement: NodeId,
    ) -> Result<Owned, AstError> {
        let NodeData::BodyBlock(body) = &module.try_get(block)?.data else {
            return Err(AstError::NotAChild { parent: block, child: statement });
        };
        let position = body
            .lines
            .iter()
            .position(|line| line.statement.as_ref().is_some_and(|s| s.node == statement))
            .ok_or(AstError::NotAChild { parent: block, child: statement })?;

        let NodeData::BodyBlock(body) = &mut module.node_mut(block).data else { unreachable!() };
        body.lines.remove(position);
        module.node_mut(statement).parent = None;
        Ok(Owned(statement))
    }
}

/// Line indices of the statements of `block`.
fn statement_lines(module: &Module, block: NodeId) -> Result<Vec<usize>, AstError> {
    match &module.try_get(block)?.data {
        NodeData::BodyBlock(body) => Ok(body
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.statement.is_some())
            .map(|(i, _)| i)
            .collect()),
        _ => Err(AstError::NotAChild { parent: block, child: block }),
    }
}

fn line_count(module: &Module, block: NodeId) -> usize {
    match &module.get(block).data {
        NodeData::BodyBlock(body) => body.lines.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print;

    #[test]
    fn expressions() {
        let mut module = Module::new();
        let a = Ident::new(&mut module, "a");
        let b = NumericLiteral::new(&mut module, "2");
        let sum = OprApp::new(&mut module, Some(a), "+", Some(b));
        let group = Group::new(&mut module, sum);
        let f = Ident::new(&mut module, "f");
        let app = App::positional(&mut module, f, group);
        assert_eq!(module.code(app.id()), "f (a + 2)");

        let items = vec![
            NumericLiteral::new(&mut module, "1"),
            TextLiteral::new(&mut module, "two"),
            TextLiteral::new(&mut module, "it's"),
        ];
        let vector = Vector::new(&mut module, items);
        assert_eq!(module.code(vector.id()), "[1, 'two', \"it's\"]");

        let x = Ident::new(&mut module, "x");
        let access = PropertyAccess::new(&mut module, x, "y");
        let neg = NegationApp::new(&mut module, access);
        assert_eq!(module.code(neg.id()), "-x.y");
    }

    #[test]
    fn statements_in_blocks() {
        let mut module = Module::new();
        let value = NumericLiteral::new(&mut module, "1");
        let assignment = Assignment::new(&mut module, "x", value);
        let root = BodyBlock::new(&mut module, vec![assignment]);
        let root_id = root.id();
        let _ = module.replace_root(root);

        let x = Ident::new(&mut module, "x");
        let body = ExpressionStatement::new(&mut module, x);
        let body = BodyBlock::new(&mut module, vec![body]);
        let function = FunctionDef::new(&mut module, "f", &["a", "b"], body);
        let function_id = function.id();
        BodyBlock::push(&mut module, root_id, function).unwrap();

        let printed = print(&module, root_id);
        assert_eq!(printed.code, "x = 1\nf a b =\n    x");

        let removed = BodyBlock::remove_statement(&mut module, root_id, function_id).unwrap();
        assert_eq!(removed.id(), function_id);
        assert_eq!(module.code(root_id), "x = 1");

        let y = Ident::new(&mut module, "y");
        let statement = ExpressionStatement::new(&mut module, y);
        BodyBlock::insert(&mut module, root_id, 0, statement).unwrap();
        assert_eq!(module.code(root_id), "y\nx = 1");
    }
}
