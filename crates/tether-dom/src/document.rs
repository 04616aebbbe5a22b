#![forbid(unsafe_code)]

//! Arena-backed document tree.
//!
//! # Architecture
//!
//! [`Document`] is a cheap, clonable handle (`Rc<RefCell<Tree>>`). Every
//! method borrows the tree only for the duration of the call, so callbacks
//! captured by bindings and listeners may hold their own handle and mutate
//! the tree while another part of the program is iterating a snapshot.
//!
//! # Invariants
//!
//! 1. A node has at most one parent, and appears exactly once in that
//!    parent's child list.
//! 2. Appending an attached node moves it (it is removed from its old parent
//!    first); appending a fragment moves the fragment's children instead.
//! 3. Event listeners are snapshotted before they run; no tree borrow is held
//!    while user code executes.
//! 4. The first listener error stops dispatch and is returned to the caller.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown node | Id from another document | `DomError::UnknownNode` |
//! | Element-only op on text | `set_value` on a text node | `DomError::NotAnElement` |
//! | Self-append | Appending an ancestor into a descendant | `DomError::Cycle` |
//! | Listener error | User callback failed | `DomError::Listener`, later listeners skipped |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::error::DomError;
use crate::event::{Event, Listener};
use crate::node::{Attribute, ElementData, NodeData, NodeId, NodeKind};

struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<(String, Listener)>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match &self.node(id)?.data {
            NodeData::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn insert(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    fn detach(&mut self, child: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node_mut(child)?.parent.take() {
            self.node_mut(parent)?.children.retain(|&c| c != child);
        }
        Ok(())
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> Result<bool, DomError> {
        loop {
            if node == ancestor {
                return Ok(true);
            }
            match self.node(node)?.parent {
                Some(parent) => node = parent,
                None => return Ok(false),
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.is_inclusive_ancestor(child, parent)? {
            return Err(DomError::Cycle { parent, child });
        }
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn collect_text(&self, id: NodeId, out: &mut String) -> Result<(), DomError> {
        let node = self.node(id)?;
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(_) => {}
            NodeData::Element(_) | NodeData::Fragment => {
                for &child in &node.children {
                    self.collect_text(child, out)?;
                }
            }
        }
        Ok(())
    }

    fn matches(&self, id: NodeId, selector: &Selector<'_>) -> bool {
        let Ok(el) = self.element(id) else {
            return false;
        };
        let attr = |name: &str| {
            el.attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str())
        };
        match selector {
            Selector::Id(id) => attr("id") == Some(*id),
            Selector::Class(class) => attr("class")
                .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == *class)),
            Selector::Tag(tag) => el.tag.eq_ignore_ascii_case(tag),
        }
    }

    fn find(&self, from: NodeId, selector: &Selector<'_>) -> Option<NodeId> {
        let node = self.node(from).ok()?;
        node.children.iter().find_map(|&child| {
            if self.matches(child, selector) {
                Some(child)
            } else {
                self.find(child, selector)
            }
        })
    }
}

enum Selector<'a> {
    Id(&'a str),
    Class(&'a str),
    Tag(&'a str),
}

impl<'a> Selector<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(id) = raw.strip_prefix('#') {
            (!id.is_empty()).then_some(Self::Id(id))
        } else if let Some(class) = raw.strip_prefix('.') {
            (!class.is_empty()).then_some(Self::Class(class))
        } else {
            (!raw.is_empty()).then_some(Self::Tag(raw))
        }
    }
}

/// Shared handle to an in-memory document.
///
/// Cloning a `Document` creates a new handle to the **same** tree.
///
/// # Example
///
/// ```
/// use tether_dom::Document;
///
/// let doc = Document::parse(r#"<div id="app"><p>hello</p></div>"#)?;
/// let app = doc.query_selector("#app").expect("mounted");
/// assert_eq!(doc.text_content(app)?, "hello");
/// # Ok::<(), tether_dom::DomError>(())
/// ```
#[derive(Clone)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

/// A non-owning handle to a [`Document`].
///
/// Listeners stored inside a document hold this instead of a [`Document`] so
/// the tree does not keep itself alive.
#[derive(Clone, Default)]
pub struct WeakDocument {
    tree: Weak<RefCell<Tree>>,
}

impl WeakDocument {
    #[must_use]
    pub fn upgrade(&self) -> Option<Document> {
        self.tree.upgrade().map(|tree| Document { tree })
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDocument")
            .field("live", &(self.tree.strong_count() > 0))
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.borrow().nodes.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document containing only its root container.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree::default();
        tree.insert(NodeData::Fragment);
        Self {
            tree: Rc::new(RefCell::new(tree)),
        }
    }

    /// The document root. Selector lookups search beneath it.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Whether two handles point at the same tree.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            tree: Rc::downgrade(&self.tree),
        }
    }

    // ---- construction ----------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&self, tag: impl Into<String>) -> NodeId {
        self.tree.borrow_mut().insert(NodeData::Element(ElementData {
            tag: tag.into(),
            attributes: Vec::new(),
            value: String::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.tree.borrow_mut().insert(NodeData::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&self, text: impl Into<String>) -> NodeId {
        self.tree.borrow_mut().insert(NodeData::Comment(text.into()))
    }

    /// Create an empty, detached fragment.
    pub fn create_fragment(&self) -> NodeId {
        self.tree.borrow_mut().insert(NodeData::Fragment)
    }

    // ---- structure -------------------------------------------------------

    /// Classify a node.
    pub fn kind(&self, node: NodeId) -> Result<NodeKind, DomError> {
        Ok(self.tree.borrow().node(node)?.data.kind())
    }

    /// Element tag name.
    pub fn tag(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.tree.borrow().element(node)?.tag.clone())
    }

    /// Parent of `node`, if attached.
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.tree.borrow().node(node)?.parent)
    }

    /// Snapshot of `node`'s children in document order.
    pub fn child_nodes(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.tree.borrow().node(node)?.children.clone())
    }

    /// First child of `node`.
    pub fn first_child(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.tree.borrow().node(node)?.children.first().copied())
    }

    /// Append `child` to `parent`.
    ///
    /// An attached child is moved. Appending a fragment moves its children,
    /// in order, and leaves the fragment empty.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        tree.node(parent)?;
        if matches!(tree.node(child)?.data, NodeData::Fragment) {
            let moved = std::mem::take(&mut tree.node_mut(child)?.children);
            for grandchild in moved {
                tree.node_mut(grandchild)?.parent = None;
                tree.attach(parent, grandchild)?;
            }
            return Ok(());
        }
        tree.attach(parent, child)
    }

    /// Remove `child` from `parent`. The node stays valid and may be
    /// re-attached.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        if tree.node(child)?.parent == Some(parent) {
            tree.detach(child)?;
        }
        Ok(())
    }

    /// Move every child of `node` into a new fragment, in order.
    ///
    /// Equivalent to repeatedly appending `node`'s first child to the
    /// fragment until `node` is empty.
    pub fn detach_children(&self, node: NodeId) -> Result<NodeId, DomError> {
        let fragment = self.create_fragment();
        while let Some(child) = self.first_child(node)? {
            self.append_child(fragment, child)?;
        }
        Ok(fragment)
    }

    // ---- attributes ------------------------------------------------------

    /// Snapshot of an element's attributes in source order.
    pub fn attributes(&self, node: NodeId) -> Result<Vec<Attribute>, DomError> {
        Ok(self.tree.borrow().element(node)?.attributes.clone())
    }

    /// Value of a single attribute.
    pub fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self
            .tree
            .borrow()
            .element(node)?
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.clone()))
    }

    /// Set or replace an attribute.
    pub fn set_attribute(
        &self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        let name = name.into();
        let value = value.into();
        let mut tree = self.tree.borrow_mut();
        let el = tree.element_mut(node)?;
        match el.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => el.attributes.push(Attribute { name, value }),
        }
        Ok(())
    }

    /// Remove an attribute. Removing a missing attribute is a no-op.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<(), DomError> {
        self.tree
            .borrow_mut()
            .element_mut(node)?
            .attributes
            .retain(|a| a.name != name);
        Ok(())
    }

    // ---- content ---------------------------------------------------------

    /// Text of a text/comment node, or the concatenated descendant text of
    /// an element or fragment.
    pub fn text_content(&self, node: NodeId) -> Result<String, DomError> {
        let tree = self.tree.borrow();
        if let NodeData::Comment(text) = &tree.node(node)?.data {
            return Ok(text.clone());
        }
        let mut out = String::new();
        tree.collect_text(node, &mut out)?;
        Ok(out)
    }

    /// Replace a node's text.
    ///
    /// Text and comment nodes change their data in place. Elements and
    /// fragments lose all children and gain a single text child (none when
    /// `text` is empty).
    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        {
            let mut tree = self.tree.borrow_mut();
            match &mut tree.node_mut(node)?.data {
                NodeData::Text(data) | NodeData::Comment(data) => {
                    text.clone_into(data);
                    return Ok(());
                }
                NodeData::Element(_) | NodeData::Fragment => {}
            }
            for child in std::mem::take(&mut tree.node_mut(node)?.children) {
                tree.node_mut(child)?.parent = None;
            }
        }
        if !text.is_empty() {
            let child = self.create_text(text);
            self.append_child(node, child)?;
        }
        Ok(())
    }

    /// Current `value` property of an element.
    pub fn value(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.tree.borrow().element(node)?.value.clone())
    }

    /// Set the `value` property of an element. Attributes are untouched.
    pub fn set_value(&self, node: NodeId, value: &str) -> Result<(), DomError> {
        value.clone_into(&mut self.tree.borrow_mut().element_mut(node)?.value);
        Ok(())
    }

    // ---- lookup ----------------------------------------------------------

    /// First element beneath the root matching `selector`.
    ///
    /// Supported selectors: `#id`, `.class`, and a bare tag name.
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector)?;
        self.tree.borrow().find(self.root(), &selector)
    }

    // ---- events ----------------------------------------------------------

    /// Register `listener` for events of type `kind` on `node`.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        kind: impl Into<String>,
        listener: Listener,
    ) -> Result<(), DomError> {
        self.tree
            .borrow_mut()
            .node_mut(node)?
            .listeners
            .push((kind.into(), listener));
        Ok(())
    }

    /// Number of listeners attached to `node` (all event types).
    pub fn listener_count(&self, node: NodeId) -> Result<usize, DomError> {
        Ok(self.tree.borrow().node(node)?.listeners.len())
    }

    /// Dispatch an event of type `kind` at `target`.
    ///
    /// Listeners on the target run first, then listeners on each ancestor,
    /// each group in registration order. Returns the number of listeners
    /// invoked.
    pub fn dispatch(&self, target: NodeId, kind: &str) -> Result<usize, DomError> {
        let path: SmallVec<[NodeId; 8]> = {
            let tree = self.tree.borrow();
            let mut path = SmallVec::new();
            let mut cursor = Some(target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = tree.node(node)?.parent;
            }
            path
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(event = kind, %target, depth = path.len(), "dispatch");

        let event = Event::new(kind, target);
        let mut invoked = 0;
        for node in path {
            let listeners: SmallVec<[Listener; 2]> = self
                .tree
                .borrow()
                .node(node)?
                .listeners
                .iter()
                .filter(|(k, _)| k == kind)
                .map(|(_, l)| Rc::clone(l))
                .collect();
            let event = event.at(node);
            for listener in listeners {
                listener(&event).map_err(|source| DomError::Listener {
                    event: kind.to_owned(),
                    node,
                    source,
                })?;
                invoked += 1;
            }
        }
        Ok(invoked)
    }
}
