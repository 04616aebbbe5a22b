//! Events and listeners.

use std::rc::Rc;

use crate::error::ListenerError;
use crate::node::NodeId;

/// A listener callback attached to a node for one event type.
///
/// Listeners are reference-counted so dispatch can snapshot them and release
/// the document borrow before any user code runs.
pub type Listener = Rc<dyn Fn(&Event) -> Result<(), ListenerError>>;

/// An event travelling from its target up through the target's ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    kind: String,
    target: NodeId,
    current_target: NodeId,
}

impl Event {
    /// Create an event of type `kind` aimed at `target`.
    #[must_use]
    pub fn new(kind: impl Into<String>, target: NodeId) -> Self {
        Self {
            kind: kind.into(),
            target,
            current_target: target,
        }
    }

    /// Event type, e.g. `"click"` or `"change"`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched on.
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listener is currently running.
    #[must_use]
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub(crate) fn at(&self, node: NodeId) -> Self {
        Self {
            current_target: node,
            ..self.clone()
        }
    }
}
