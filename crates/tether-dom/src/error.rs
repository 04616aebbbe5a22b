//! Errors raised by the document model.

use crate::node::NodeId;

/// Error type returned by event listeners.
///
/// Listeners run user code (method tables, store writes), so their failures
/// are carried opaquely and surfaced unchanged through [`DomError::Listener`].
pub type ListenerError = Box<dyn std::error::Error + 'static>;

/// Errors from document operations.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// The node id does not belong to this document.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// The operation requires an element but the node is text, a comment, or
    /// a fragment.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    /// Appending would make a node its own ancestor.
    #[error("cannot append node {child} into its own subtree at {parent}")]
    Cycle { parent: NodeId, child: NodeId },
    /// Markup could not be tokenized.
    #[error("malformed markup at byte {position}")]
    Markup {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    /// A listener failed while an event was being dispatched.
    #[error("`{event}` listener on node {node} failed")]
    Listener {
        event: String,
        node: NodeId,
        #[source]
        source: ListenerError,
    },
}
