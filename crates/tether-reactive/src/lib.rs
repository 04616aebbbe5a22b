#![forbid(unsafe_code)]

//! Reactive data store and dependency tracking for Tether.
//!
//! This crate provides the change-tracking half of the binding engine:
//!
//! - [`ReactiveCell`]: an owned value plus the [`DependencyRegistry`] of the
//!   subscribers that read it.
//! - [`ReactiveObject`] / [`ReactiveStore`]: a key-value tree of cells built
//!   from plain JSON data, recursive into nested objects.
//! - [`Collector`]: the explicit dependency-collection context passed into
//!   tracked reads.
//! - [`Binding`]: one "this piece of UI depends on property P" relationship,
//!   and [`BindingScope`] to own and release a group of them.
//!
//! # Architecture
//!
//! Everything is single-threaded shared state (`Rc<RefCell<..>>`). A binding
//! registers itself by performing exactly one tracked read through its own
//! collector; there is no ambient "current subscriber" slot, so constructing
//! a binding from inside another binding's callback attributes dependencies
//! correctly.
//!
//! # Invariants
//!
//! 1. Exactly one registry per property for the property's lifetime.
//! 2. Subscribers are notified synchronously, in registration order.
//! 3. Writing a value strictly equal to the current value is a no-op (no
//!    notifications).
//! 4. A constructed binding appears exactly once in exactly one registry:
//!    the one of the property it tracks.
//! 5. After [`Binding::dispose`], the binding is in no registry and its
//!    callback never runs again.
//!
//! # Failure Modes
//!
//! - Callback error: propagates out of the write that triggered it; later
//!   subscribers for that write are not notified.
//! - Tracked read of a missing key: yields [`Value::Undefined`] and registers
//!   nothing.

pub mod binding;
pub mod cell;
pub mod collector;
pub mod error;
pub mod registry;
pub mod store;
pub mod value;

pub use binding::{Binding, BindingScope};
pub use cell::ReactiveCell;
pub use collector::{Collector, Registration};
pub use error::{CallbackError, ReactiveError};
pub use registry::{DependencyRegistry, RegistrationId, Subscriber};
pub use store::{ReactiveObject, ReactiveStore, WeakObject};
pub use value::Value;
