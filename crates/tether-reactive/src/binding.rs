//! Bindings: "this piece of UI depends on that property".
//!
//! A [`Binding`] tracks one key of one [`ReactiveObject`]. Construction runs
//! the collection protocol (one tracked read through a fresh [`Collector`]),
//! which leaves the binding registered in exactly that property's registry.
//! Later writes to the property call [`Binding::update`], which re-reads the
//! value and hands it to the callback.
//!
//! # Usage
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tether_reactive::{Binding, ReactiveStore, Value};
//!
//! let store = ReactiveStore::new(serde_json::json!({"count": 1}));
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let binding = Binding::new(store.root(), "count", move |v: &Value| {
//!     sink.borrow_mut().push(v.to_string());
//!     Ok(())
//! });
//!
//! store.set("count", 2).unwrap();
//! binding.dispose();
//! store.set("count", 3).unwrap();
//! assert_eq!(*seen.borrow(), ["2"]);
//! ```
//!
//! # Invariants
//!
//! 1. Construction does not invoke the callback; callers paint once
//!    themselves before or after.
//! 2. A binding holds its object weakly. Once the object is gone, updates are
//!    no-ops.
//! 3. `dispose` is idempotent and removes exactly the registrations the
//!    binding made.
//! 4. Dropping a [`Binding`] handle does not dispose it; the registry keeps it
//!    alive. Use [`BindingScope`] to tie bindings to an owner.
//!
//! # Failure Modes
//!
//! - Callback error: wrapped in [`ReactiveError::Update`] with the tracked key
//!   and returned from the write that triggered it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::collector::{Collector, Registration};
use crate::error::{CallbackError, ReactiveError};
use crate::registry::Subscriber;
use crate::store::{ReactiveObject, WeakObject};
use crate::value::Value;

type Callback = Box<dyn Fn(&Value) -> Result<(), CallbackError>>;

struct BindingInner {
    object: WeakObject,
    key: String,
    callback: Callback,
    registrations: RefCell<SmallVec<[Registration; 1]>>,
    disposed: Cell<bool>,
}

impl Subscriber for BindingInner {
    fn update(&self) -> Result<(), ReactiveError> {
        if self.disposed.get() {
            return Ok(());
        }
        let Some(object) = self.object.upgrade() else {
            return Ok(());
        };
        let value = object.get(&self.key);
        (self.callback)(&value).map_err(|source| ReactiveError::Update {
            key: self.key.clone(),
            source,
        })
    }
}

/// A live dependency of a callback on one property.
///
/// Cloning yields another handle to the same binding.
#[derive(Clone)]
pub struct Binding {
    inner: Rc<BindingInner>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.inner.key)
            .field("dependencies", &self.dependency_count())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl Binding {
    /// Bind `callback` to `key` on `object`.
    ///
    /// If `key` is not defined yet the binding registers nothing and stays
    /// silent, even if the key is defined later.
    pub fn new(
        object: &ReactiveObject,
        key: impl Into<String>,
        callback: impl Fn(&Value) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        let inner = Rc::new(BindingInner {
            object: object.downgrade(),
            key: key.into(),
            callback: Box::new(callback),
            registrations: RefCell::new(SmallVec::new()),
            disposed: Cell::new(false),
        });
        let collector = Collector::new(Rc::clone(&inner) as Rc<dyn Subscriber>);
        object.track(&inner.key, &collector);
        *inner.registrations.borrow_mut() = collector.finish();
        tracing::trace!(key = %inner.key, "binding constructed");
        Self { inner }
    }

    /// The property key this binding tracks.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Re-read the property and run the callback.
    pub fn update(&self) -> Result<(), ReactiveError> {
        self.inner.update()
    }

    /// Remove the binding from every registry it joined.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let registrations = std::mem::take(&mut *self.inner.registrations.borrow_mut());
        for registration in &registrations {
            registration.release();
        }
        tracing::trace!(key = %self.inner.key, "binding disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Registrations still held in a live registry.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.inner
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.is_live())
            .count()
    }
}

// ---------------------------------------------------------------------------
// BindingScope: lifecycle management
// ---------------------------------------------------------------------------

/// Owns the bindings of one logical scope (e.g., a mounted app).
///
/// When the scope is dropped, every held binding is disposed, disconnecting
/// it from the store.
///
/// # Invariants
///
/// 1. Bindings are disposed in reverse registration order.
/// 2. After drop or `clear()`, no callback from this scope will fire.
/// 3. `clear()` leaves the scope empty but reusable.
#[derive(Default)]
pub struct BindingScope {
    bindings: Vec<Binding>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a binding until the scope is cleared or dropped.
    pub fn hold(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Construct a binding and hold it in this scope.
    pub fn bind(
        &mut self,
        object: &ReactiveObject,
        key: impl Into<String>,
        callback: impl Fn(&Value) -> Result<(), CallbackError> + 'static,
    ) -> Binding {
        let binding = Binding::new(object, key, callback);
        self.bindings.push(binding.clone());
        binding
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The held bindings, in registration order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Dispose every held binding now.
    pub fn clear(&mut self) {
        while let Some(binding) = self.bindings.pop() {
            binding.dispose();
        }
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.bindings.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
