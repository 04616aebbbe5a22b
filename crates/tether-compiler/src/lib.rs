#![forbid(unsafe_code)]

//! Template compiler for Tether.
//!
//! Turns a mounted subtree of HTML-like markup into live bindings:
//!
//! | Syntax | Effect |
//! |--------|--------|
//! | `{{ key }}` in a text node | text follows `key` |
//! | `x-html="key"` | element content follows `key`, rendered as text |
//! | `x-model="key"` | element value follows `key`; `change` writes it back |
//! | `@event="method"` | `event` invokes `method` on the context |
//!
//! The compiler only talks to a [`RenderTarget`](tether_dom::RenderTarget)
//! and a [`CompileContext`], so it runs unchanged against the in-memory
//! [`Document`](tether_dom::Document) or any other host.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Mount selector matches nothing | [`CompileError::MountNotFound`] |
//! | Unknown expression | Renders `undefined`, registers nothing |
//! | Unknown method | Error from the listener when the event fires |

pub mod compiler;
pub mod context;
pub mod directive;
pub mod error;
pub mod interpolation;
pub mod paint;

pub use compiler::{Compiled, TemplateCompiler};
pub use context::CompileContext;
pub use directive::Directive;
pub use error::CompileError;
pub use paint::Paint;
