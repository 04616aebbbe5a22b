#![forbid(unsafe_code)]

//! In-memory document model for Tether.
//!
//! This crate provides:
//! - [`Document`], a shared handle to an arena-backed node tree with
//!   DOM-like mutation, selector lookup, and event dispatch
//! - [`RenderTarget`], the narrow capability the template compiler drives,
//!   so compilation never depends on a concrete document implementation
//! - markup loading ([`Document::parse`]) and serialization
//!   ([`Document::to_html`])

pub mod document;
pub mod error;
pub mod event;
pub mod markup;
pub mod node;
pub mod target;

pub use document::{Document, WeakDocument};
pub use error::{DomError, ListenerError};
pub use event::{Event, Listener};
pub use node::{Attribute, NodeId, NodeKind};
pub use target::RenderTarget;
