use crate::NodeId;

/// Misuse of the tree API that the caller can recover from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AstError {
    #[error("node {0:?} is not part of this module")]
    UnknownNode(NodeId),
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("node {0:?} cannot carry documentation")]
    NotDocumentable(NodeId),
    #[error("node {0:?} already has a parent")]
    AlreadyParented(NodeId),
    #[error("node {0:?} has no parent")]
    NoParent(NodeId),
}
