//! Directive recognition.
//!
//! Recognition is an exact match on the attribute name; values are not
//! inspected here.

use crate::paint::Paint;

/// Attribute rendering a property as the element's text.
pub const HTML: &str = "x-html";
/// Attribute binding a form element's value to a property, both ways.
pub const MODEL: &str = "x-model";
/// Prefix of event-handler attributes (`@click`).
pub const EVENT_PREFIX: char = '@';

/// A recognized directive attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `x-html="key"`
    Html,
    /// `x-model="key"`
    Model,
    /// `@<event>="method"`, carrying the event type.
    Event(&'a str),
}

impl<'a> Directive<'a> {
    /// Classify an attribute name. `None` for ordinary attributes and for a
    /// bare `@`.
    #[must_use]
    pub fn parse(name: &'a str) -> Option<Self> {
        match name {
            HTML => Some(Self::Html),
            MODEL => Some(Self::Model),
            _ => name
                .strip_prefix(EVENT_PREFIX)
                .filter(|event| !event.is_empty())
                .map(Self::Event),
        }
    }

    /// How a bound value is painted, if this directive creates a binding.
    #[must_use]
    pub fn paint(self) -> Option<Paint> {
        match self {
            Self::Html => Some(Paint::Html),
            Self::Model => Some(Paint::Model),
            Self::Event(_) => None,
        }
    }
}
