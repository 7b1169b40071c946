//! Node records and the closed set of node kinds.

use std::fmt;

use serde_json::Value;

use crate::docs::Documentation;
use crate::shared::{KeyValue as _, LocalMap};
use crate::{ExternalId, NodeId, Token};

/// A child slot: a node or token plus the whitespace preceding it. `None`
/// whitespace lets the printer pick a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeChild<T> {
    pub whitespace: Option<String>,
    pub node: T,
}

impl<T> NodeChild<T> {
    pub fn new(whitespace: Option<String>, node: T) -> Self {
        Self { whitespace, node }
    }

    pub fn spaced(node: T) -> Self {
        Self::new(Some(" ".to_owned()), node)
    }

    pub fn unspaced(node: T) -> Self {
        Self::new(Some(String::new()), node)
    }

    pub fn autospaced(node: T) -> Self {
        Self::new(None, node)
    }

    pub(crate) fn whitespace(&self) -> Option<&str> {
        self.whitespace.as_deref()
    }
}

pub const POSITION: &str = "position";
pub const VISUALIZATION: &str = "visualization";

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub external_id: ExternalId,
    pub values: LocalMap,
}

impl Metadata {
    pub(crate) fn fresh() -> Self {
        Self { external_id: ExternalId::new(), values: LocalMap::default() }
    }

    pub fn position(&self) -> Option<&Value> {
        self.values.get(POSITION)
    }

    pub(crate) fn same_placement(&self, other: &Self) -> bool {
        [POSITION, VISUALIZATION].into_iter().all(|key| self.values.get(key) == other.values.get(key))
    }

    /// Copies the placement of a node onto its successor.
    pub fn sync_from(&mut self, source: &Self) {
        for key in [POSITION, VISUALIZATION] {
            match source.values.get(key) {
                Some(value) if self.values.get(key) != Some(value) => {
                    self.values.set(key, value.clone());
                }
                None if self.values.get(key).is_some() => {
                    self.values.delete(key);
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) metadata: Metadata,
    pub(crate) data: NodeData,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn external_id(&self) -> ExternalId {
        self.metadata.external_id
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn children(&self) -> Vec<NodeId> {
        self.data.child_ids()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    App,
    OprApp,
    UnaryOprApp,
    NegationApp,
    PropertyAccess,
    Ident,
    Wildcard,
    NumericLiteral,
    TextLiteral,
    Group,
    Vector,
    BodyBlock,
    Assignment,
    FunctionDef,
    ExpressionStatement,
    Import,
    Invalid,
    Generic,
}

impl NodeKind {
    pub fn is_statement(self) -> bool {
        matches!(self, Self::Assignment | Self::FunctionDef | Self::ExpressionStatement | Self::Import)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub function: NodeChild<NodeId>,
    pub argument: NodeChild<NodeId>,
}

/// Binary operator application, or an operator section when an operand is
/// missing.
#[derive(Debug, Clone, PartialEq)]
pub struct OprApp {
    pub lhs: Option<NodeChild<NodeId>>,
    pub operators: Vec<NodeChild<Token>>,
    pub rhs: Option<NodeChild<NodeId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOprApp {
    pub operator: NodeChild<Token>,
    pub argument: Option<NodeChild<NodeId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NegationApp {
    pub operator: NodeChild<Token>,
    pub argument: NodeChild<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccess {
    pub lhs: Option<NodeChild<NodeId>>,
    pub operator: NodeChild<Token>,
    pub rhs: NodeChild<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub token: NodeChild<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wildcard {
    pub token: NodeChild<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericLiteral {
    pub tokens: Vec<NodeChild<Token>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLiteral {
    pub open: Option<NodeChild<Token>>,
    pub elements: Vec<NodeChild<Token>>,
    pub close: Option<NodeChild<Token>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub open: Option<NodeChild<Token>>,
    pub expression: Option<NodeChild<NodeId>>,
    pub close: Option<NodeChild<Token>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    pub open: NodeChild<Token>,
    pub elements: Vec<VectorElement>,
    pub close: Option<NodeChild<Token>>,
}

/// The first element never has a delimiter.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorElement {
    pub delimiter: Option<NodeChild<Token>>,
    pub value: Option<NodeChild<NodeId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyBlock {
    pub lines: Vec<BlockLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockLine {
    pub newline: NodeChild<Token>,
    pub statement: Option<NodeChild<NodeId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub doc: Documentation,
    pub pattern: NodeChild<NodeId>,
    pub equals: NodeChild<Token>,
    pub expression: NodeChild<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub doc: Documentation,
    pub name: NodeChild<NodeId>,
    pub args: Vec<NodeChild<NodeId>>,
    pub equals: NodeChild<Token>,
    pub body: Option<NodeChild<NodeId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub doc: Documentation,
    pub expression: NodeChild<NodeId>,
}

/// `import Path [as Name]` or `from Path import all|names`.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub segments: Vec<ImportSegment>,
    pub all: Option<NodeChild<Token>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSegment {
    pub header: NodeChild<Token>,
    pub body: Option<NodeChild<NodeId>>,
}

/// Code the parser rejected. The content is printed exactly as parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Invalid {
    pub expression: NodeChild<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generic {
    pub children: Vec<GenericChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenericChild {
    Node(NodeChild<NodeId>),
    Token(NodeChild<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    App(App),
    OprApp(OprApp),
    UnaryOprApp(UnaryOprApp),
    NegationApp(NegationApp),
    PropertyAccess(PropertyAccess),
    Ident(Ident),
    Wildcard(Wildcard),
    NumericLiteral(NumericLiteral),
    TextLiteral(TextLiteral),
    Group(Group),
    Vector(Vector),
    BodyBlock(BodyBlock),
    Assignment(Assignment),
    FunctionDef(FunctionDef),
    ExpressionStatement(ExpressionStatement),
    Import(Import),
    Invalid(Invalid),
    Generic(Generic),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::App(_) => NodeKind::App,
            Self::OprApp(_) => NodeKind::OprApp,
            Self::UnaryOprApp(_) => NodeKind::UnaryOprApp,
            Self::NegationApp(_) => NodeKind::NegationApp,
            Self::PropertyAccess(_) => NodeKind::PropertyAccess,
            Self::Ident(_) => NodeKind::Ident,
            Self::Wildcard(_) => NodeKind::Wildcard,
            Self::NumericLiteral(_) => NodeKind::NumericLiteral,
            Self::TextLiteral(_) => NodeKind::TextLiteral,
            Self::Group(_) => NodeKind::Group,
            Self::Vector(_) => NodeKind::Vector,
            Self::BodyBlock(_) => NodeKind::BodyBlock,
            Self::Assignment(_) => NodeKind::Assignment,
            Self::FunctionDef(_) => NodeKind::FunctionDef,
            Self::ExpressionStatement(_) => NodeKind::ExpressionStatement,
            Self::Import(_) => NodeKind::Import,
            Self::Invalid(_) => NodeKind::Invalid,
            Self::Generic(_) => NodeKind::Generic,
        }
    }

    /// Child nodes in print order.
    pub fn child_ids(&self) -> Vec<NodeId> {
        fn ids<'a>(children: impl IntoIterator<Item = &'a NodeChild<NodeId>>) -> Vec<NodeId> {
            children.into_iter().map(|child| child.node).collect()
        }

        match self {
            Self::App(app) => ids([&app.function, &app.argument]),
            Self::OprApp(opr) => ids(opr.lhs.iter().chain(&opr.rhs)),
            Self::UnaryOprApp(opr) => ids(&opr.argument),
            Self::NegationApp(neg) => ids([&neg.argument]),
            Self::PropertyAccess(access) => ids(access.lhs.iter().chain([&access.rhs])),
            Self::Ident(_) | Self::Wildcard(_) | Self::NumericLiteral(_) | Self::TextLiteral(_) => {
                Vec::new()
            }
            Self::Group(group) => ids(&group.expression),
            Self::Vector(vector) => ids(vector.elements.iter().filter_map(|e| e.value.as_ref())),
            Self::BodyBlock(block) => ids(block.lines.iter().filter_map(|l| l.statement.as_ref())),
            Self::Assignment(assignment) => ids([&assignment.pattern, &assignment.expression]),
            Self::FunctionDef(function) => {
                ids([&function.name].into_iter().chain(&function.args).chain(&function.body))
            }
            Self::ExpressionStatement(statement) => ids([&statement.expression]),
            Self::Import(import) => ids(import.segments.iter().filter_map(|s| s.body.as_ref())),
            Self::Invalid(invalid) => ids([&invalid.expression]),
            Self::Generic(generic) => generic
                .children
                .iter()
                .filter_map(|child| match child {
                    GenericChild::Node(node) => Some(node.node),
                    GenericChild::Token(_) => None,
                })
                .collect(),
        }
    }

    pub(crate) fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut NodeId)) {
        let mut visit = |child: &mut NodeChild<NodeId>| f(&mut child.node);

        match self {
            Self::App(app) => {
                visit(&mut app.function);
                visit(&mut app.argument);
            }
            Self::OprApp(opr) => opr.lhs.iter_mut().chain(&mut opr.rhs).for_each(visit),
            Self::UnaryOprApp(opr) => opr.argument.iter_mut().for_each(visit),
            Self::NegationApp(neg) => visit(&mut neg.argument),
            Self::PropertyAccess(access) => {
                access.lhs.iter_mut().for_each(&mut visit);
                visit(&mut access.rhs);
            }
            Self::Ident(_) | Self::Wildcard(_) | Self::NumericLiteral(_) | Self::TextLiteral(_) => {}
            Self::Group(group) => group.expression.iter_mut().for_each(visit),
            Self::Vector(vector) => {
                vector.elements.iter_mut().filter_map(|e| e.value.as_mut()).for_each(visit)
            }
            Self::BodyBlock(block) => {
                block.lines.iter_mut().filter_map(|l| l.statement.as_mut()).for_each(visit)
            }
            Self::Assignment(assignment) => {
                visit(&mut assignment.pattern);
                visit(&mut assignment.expression);
            }
            Self::FunctionDef(function) => {
                visit(&mut function.name);
                function.args.iter_mut().chain(&mut function.body).for_each(visit);
            }
            Self::ExpressionStatement(statement) => visit(&mut statement.expression),
            Self::Import(import) => {
                import.segments.iter_mut().filter_map(|s| s.body.as_mut()).for_each(visit)
            }
            Self::Invalid(invalid) => visit(&mut invalid.expression),
            Self::Generic(generic) => {
                for child in &mut generic.children {
                    if let GenericChild::Node(node) = child {
                        visit(node);
                    }
                }
            }
        }
    }

    /// Substitutes child references for which `f` returns a replacement and
    /// returns how many were replaced.
    pub(crate) fn rewrite_refs(&mut self, mut f: impl FnMut(NodeId) -> Option<NodeId>) -> usize {
        let mut rewritten = 0;
        self.for_each_child_mut(&mut |id| {
            if let Some(new) = f(*id) {
                *id = new;
                rewritten += 1;
            }
        });
        rewritten
    }

    pub fn documentation(&self) -> Option<&Documentation> {
        match self {
            Self::Assignment(assignment) => Some(&assignment.doc),
            Self::FunctionDef(function) => Some(&function.doc),
            Self::ExpressionStatement(statement) => Some(&statement.doc),
            _ => None,
        }
    }

    pub(crate) fn documentation_mut(&mut self) -> Option<&mut Documentation> {
        match self {
            Self::Assignment(assignment) => Some(&mut assignment.doc),
            Self::FunctionDef(function) => Some(&mut function.doc),
            Self::ExpressionStatement(statement) => Some(&mut statement.doc),
            _ => None,
        }
    }
}
