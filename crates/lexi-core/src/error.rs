use lexi_types::NodeId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} is not a text node")]
    NotText(NodeId),

    #[error("Node {0:?} has no parent")]
    Detached(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Inserting {child:?} under {parent:?} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
