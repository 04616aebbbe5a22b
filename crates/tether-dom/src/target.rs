//! The render-target capability driven by the template compiler.
//!
//! The compiler never talks to [`Document`] directly. It walks and mutates
//! the tree through [`RenderTarget`], which keeps directive recognition and
//! binding registration testable against any host that can answer these
//! questions (a recording double, a browser bridge, the in-memory document).

use crate::document::{Document, WeakDocument};
use crate::error::DomError;
use crate::event::Listener;
use crate::node::{Attribute, NodeId, NodeKind};

/// Tree-walk and paint operations a template host must provide.
///
/// Implementations are handles: cloning must yield a handle to the same
/// underlying tree, since paint callbacks capture their own clone.
pub trait RenderTarget: Clone + 'static {
    /// Non-owning handle, held by listeners the target itself stores.
    type Weak: Clone + 'static;

    fn downgrade(&self) -> Self::Weak;

    fn upgrade(weak: &Self::Weak) -> Option<Self>;

    /// Resolve a mount selector.
    fn query(&self, selector: &str) -> Option<NodeId>;

    fn kind(&self, node: NodeId) -> Result<NodeKind, DomError>;

    /// Snapshot of `node`'s children.
    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError>;

    /// Snapshot of an element's attributes.
    fn attributes(&self, node: NodeId) -> Result<Vec<Attribute>, DomError>;

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError>;

    fn text(&self, node: NodeId) -> Result<String, DomError>;

    /// Replace the text content of `node`.
    fn set_text(&self, node: NodeId, text: &str) -> Result<(), DomError>;

    /// Read the live `value` of a form element.
    fn value(&self, node: NodeId) -> Result<String, DomError>;

    fn set_value(&self, node: NodeId, value: &str) -> Result<(), DomError>;

    /// Attach a native listener for events of type `event`.
    fn listen(&self, node: NodeId, event: &str, listener: Listener) -> Result<(), DomError>;

    /// Move all children of `node` into a detached container and return it.
    fn detach_children(&self, node: NodeId) -> Result<NodeId, DomError>;

    /// Append `child` under `parent`; a detached container contributes its
    /// children.
    fn append(&self, parent: NodeId, child: NodeId) -> Result<(), DomError>;
}

impl RenderTarget for Document {
    type Weak = WeakDocument;

    fn downgrade(&self) -> WeakDocument {
        Document::downgrade(self)
    }

    fn upgrade(weak: &WeakDocument) -> Option<Self> {
        weak.upgrade()
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_selector(selector)
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind, DomError> {
        Document::kind(self, node)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        self.child_nodes(node)
    }

    fn attributes(&self, node: NodeId) -> Result<Vec<Attribute>, DomError> {
        Document::attributes(self, node)
    }

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError> {
        Document::remove_attribute(self, node, name)
    }

    fn text(&self, node: NodeId) -> Result<String, DomError> {
        self.text_content(node)
    }

    fn set_text(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.set_text_content(node, text)
    }

    fn value(&self, node: NodeId) -> Result<String, DomError> {
        Document::value(self, node)
    }

    fn set_value(&self, node: NodeId, value: &str) -> Result<(), DomError> {
        Document::set_value(self, node, value)
    }

    fn listen(&self, node: NodeId, event: &str, listener: Listener) -> Result<(), DomError> {
        self.add_event_listener(node, event, listener)
    }

    fn detach_children(&self, node: NodeId) -> Result<NodeId, DomError> {
        Document::detach_children(self, node)
    }

    fn append(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.append_child(parent, child)
    }
}
