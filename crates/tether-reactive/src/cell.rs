//! The reactive cell: one value plus the registry of its readers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::collector::Collector;
use crate::error::ReactiveError;
use crate::registry::DependencyRegistry;

/// An owned, observable value.
///
/// Reads through a [`Collector`] register the collecting subscriber; writes
/// that change the value notify every registered subscriber synchronously.
/// Equality is whatever `T: PartialEq` says; for [`Value`](crate::Value)
/// that is strict (identity for objects and arrays).
pub struct ReactiveCell<T> {
    value: RefCell<T>,
    registry: Rc<DependencyRegistry>,
}

impl<T: fmt::Debug> fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveCell")
            .field("value", &self.value.borrow())
            .field("subscribers", &self.registry.len())
            .finish()
    }
}

impl<T: Clone + PartialEq> ReactiveCell<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            registry: Rc::new(DependencyRegistry::new()),
        }
    }

    /// Read the value, registering `collector`'s subscriber if one is given.
    pub fn read(&self, collector: Option<&Collector>) -> T {
        if let Some(collector) = collector {
            collector.register(&self.registry);
        }
        self.value.borrow().clone()
    }

    /// Borrow the value without cloning or tracking.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store `value` and notify subscribers.
    ///
    /// Returns `Ok(false)` without notifying when `value` equals the current
    /// value. The value is already stored when a subscriber error is
    /// returned.
    pub fn write(&self, value: T) -> Result<bool, ReactiveError> {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return Ok(false);
            }
            *current = value;
        }
        self.registry.notify()?;
        Ok(true)
    }

    /// The registry of this cell's readers.
    #[must_use]
    pub fn registry(&self) -> &Rc<DependencyRegistry> {
        &self.registry
    }
}
