//! Paint functions: how a value reaches the render target.

use tether_dom::{DomError, NodeId, RenderTarget};
use tether_reactive::Value;

/// The kind of update a binding site performs.
///
/// Both the initial paint at compile time and every later update go through
/// [`Paint::apply`], so the two can never disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Paint {
    /// `{{ expr }}`: replace the text node's text.
    Text,
    /// `x-html`: replace the element's content with the value as text.
    /// Markup in the value is not parsed.
    Html,
    /// `x-model`: set the element's value.
    Model,
}

impl Paint {
    pub fn apply<R: RenderTarget>(
        self,
        target: &R,
        node: NodeId,
        value: &Value,
    ) -> Result<(), DomError> {
        let text = value.to_string();
        match self {
            Self::Text | Self::Html => target.set_text(node, &text),
            Self::Model => target.set_value(node, &text),
        }
    }
}
