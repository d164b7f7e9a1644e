//! Document error types

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised by document operations
///
/// Every variant is a broken caller contract (detaching an orphan, inserting
/// before a foreign anchor, ...). None of them describe a recoverable fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node was never created by this document
    #[error("node {0:?} does not exist in this document")]
    MissingNode(NodeId),

    /// Detach was requested for a node that is not attached anywhere
    #[error("node {0:?} has no parent to detach from")]
    NoParent(NodeId),

    /// Insertion anchor is not a child of the insertion parent
    #[error("anchor {anchor:?} is not a child of {parent:?}")]
    AnchorNotChild { parent: NodeId, anchor: NodeId },

    /// Operation requires an element node
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Node cannot hold children
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),

    /// `attach_shadow` called twice on the same host
    #[error("element {0:?} already hosts a shadow root")]
    ShadowRootExists(NodeId),

    /// Insertion would make a node its own ancestor
    #[error("inserting {child:?} into {parent:?} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Custom element names must be lowercase and contain a hyphen
    #[error("`{0}` is not a valid custom element name")]
    InvalidTagName(String),

    /// A tag can only be defined once per registry
    #[error("custom element `{0}` is already defined")]
    AlreadyDefined(String),

    /// No definition registered for the tag
    #[error("custom element `{0}` is not defined")]
    UndefinedElement(String),

    /// The element constructor reported a failure
    #[error("constructing `{tag}` failed: {reason}")]
    Construction { tag: String, reason: String },
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DomError>;
