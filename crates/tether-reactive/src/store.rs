//! Reactive objects and the store root.
//!
//! A [`ReactiveObject`] is an ordered map from key to
//! [`ReactiveCell<Value>`]. Every property owns exactly one cell (and so
//! exactly one registry) for as long as the object lives: writes replace the
//! value inside the cell, never the cell itself.
//!
//! # Invariants
//!
//! 1. Key order follows the source JSON (insertion order), then first-write
//!    order for keys defined later.
//! 2. `set` never holds a borrow of the property table while subscribers
//!    run, so a subscriber may read or write any property, including the one
//!    being written.
//! 3. Nested JSON objects are wrapped recursively at observe time and on
//!    every write.
//!
//! # Failure Modes
//!
//! - Non-object root passed to [`ReactiveStore::new`]: the store is empty and
//!   a debug event is logged.
//! - Subscriber error during `set`: the new value is already stored; the
//!   error is returned to the writer.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use tracing::debug;

use crate::cell::ReactiveCell;
use crate::collector::Collector;
use crate::error::ReactiveError;
use crate::value::Value;

#[derive(Default)]
struct Properties {
    order: Vec<(String, Rc<ReactiveCell<Value>>)>,
    index: AHashMap<String, usize>,
}

impl Properties {
    fn cell(&self, key: &str) -> Option<Rc<ReactiveCell<Value>>> {
        self.index
            .get(key)
            .map(|&pos| Rc::clone(&self.order[pos].1))
    }

    fn insert(&mut self, key: String, value: Value) -> Rc<ReactiveCell<Value>> {
        let cell = Rc::new(ReactiveCell::new(value));
        self.index.insert(key.clone(), self.order.len());
        self.order.push((key, Rc::clone(&cell)));
        cell
    }
}

/// A shared handle to an observed key-value object.
///
/// Cloning yields another handle to the same object.
#[derive(Clone, Default)]
pub struct ReactiveObject {
    inner: Rc<RefCell<Properties>>,
}

/// A non-owning handle to a [`ReactiveObject`].
#[derive(Clone, Default)]
pub struct WeakObject {
    inner: Weak<RefCell<Properties>>,
}

impl WeakObject {
    #[must_use]
    pub fn upgrade(&self) -> Option<ReactiveObject> {
        self.inner.upgrade().map(|inner| ReactiveObject { inner })
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObject")
            .field("live", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: values may contain this object again.
        f.debug_set().entries(self.keys()).finish()
    }
}

impl ReactiveObject {
    /// An object with no properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap every key of `map` into its own cell, recursing into nested
    /// objects.
    #[must_use]
    pub fn observe(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut properties = Properties::default();
        for (key, raw) in map {
            properties.insert(key, Value::from_json(raw));
        }
        Self {
            inner: Rc::new(RefCell::new(properties)),
        }
    }

    /// Keys in definition order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .borrow()
            .order
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().index.contains_key(key)
    }

    /// Current value of `key`, untracked. Missing keys read as
    /// [`Value::Undefined`].
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        self.cell(key)
            .map_or(Value::Undefined, |cell| cell.read(None))
    }

    /// Read `key` and register `collector`'s subscriber on it.
    ///
    /// A missing key yields [`Value::Undefined`] and registers nothing.
    pub fn track(&self, key: &str, collector: &Collector) -> Value {
        match self.cell(key) {
            Some(cell) => cell.read(Some(collector)),
            None => {
                debug!(key, "tracked read of undefined property");
                Value::Undefined
            }
        }
    }

    /// Write `key`, notifying its subscribers when the value changes.
    ///
    /// Returns `Ok(false)` for a strictly equal write. An unknown key is
    /// defined as a new property and `Ok(true)` is returned; nothing was
    /// subscribed to it yet, so nothing is notified.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool, ReactiveError> {
        let value = value.into();
        let existing = self.cell(key);
        match existing {
            Some(cell) => {
                let changed = cell.write(value)?;
                if changed {
                    tracing::trace!(key, "property written");
                }
                Ok(changed)
            }
            None => {
                self.inner.borrow_mut().insert(key.to_owned(), value);
                debug!(key, "property defined");
                Ok(true)
            }
        }
    }

    /// The cell behind `key`, if defined.
    #[must_use]
    pub fn cell(&self, key: &str) -> Option<Rc<ReactiveCell<Value>>> {
        self.inner.borrow().cell(key)
    }

    /// Number of live registrations on `key` (zero for missing keys).
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.cell(key).map_or(0, |cell| cell.registry().len())
    }

    /// Whether both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Plain JSON snapshot of the whole object tree.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let entries: Vec<(String, Rc<ReactiveCell<Value>>)> = self
            .inner
            .borrow()
            .order
            .iter()
            .map(|(key, cell)| (key.clone(), Rc::clone(cell)))
            .collect();
        let map = entries
            .into_iter()
            .map(|(key, cell)| (key, cell.with(Value::to_json)))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// The root of an application's observed data.
#[derive(Clone, Debug, Default)]
pub struct ReactiveStore {
    root: ReactiveObject,
}

impl ReactiveStore {
    /// Observe `raw`. Anything other than a JSON object yields an empty
    /// store.
    #[must_use]
    pub fn new(raw: serde_json::Value) -> Self {
        let root = match raw {
            serde_json::Value::Object(map) => ReactiveObject::observe(map),
            other => {
                debug!(kind = json_kind(&other), "data is not an object; store left empty");
                ReactiveObject::new()
            }
        };
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &ReactiveObject {
        &self.root
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        self.root.get(key)
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool, ReactiveError> {
        self.root.set(key, value)
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Subscriber;
    use serde_json::json;
    use std::cell::Cell;
    use tracing_test::traced_test;

    struct Counter(Cell<u32>);

    impl Subscriber for Counter {
        fn update(&self) -> Result<(), ReactiveError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    fn watch(object: &ReactiveObject, key: &str) -> Rc<Counter> {
        let counter = Rc::new(Counter(Cell::new(0)));
        let collector = Collector::new(counter.clone());
        object.track(key, &collector);
        let _ = collector.finish();
        counter
    }

    #[test]
    fn keys_keep_source_order() {
        let store = ReactiveStore::new(json!({"z": 1, "a": 2, "m": 3}));
        assert_eq!(store.root().keys(), vec!["z", "a", "m"]);
    }

    #[test]
    fn nested_objects_are_observed() {
        let store = ReactiveStore::new(json!({"foo": {"bar": "bar"}}));
        let foo = store.get("foo");
        let foo = foo.as_object().unwrap();
        assert_eq!(foo.get("bar"), Value::from("bar"));

        let counter = watch(foo, "bar");
        assert!(foo.set("bar", "baz").unwrap());
        assert_eq!(counter.0.get(), 1);
    }

    #[traced_test]
    #[test]
    fn non_object_root_yields_empty_store() {
        for raw in [json!(null), json!(3), json!("text"), json!([1, 2])] {
            let store = ReactiveStore::new(raw);
            assert!(store.root().is_empty());
            assert!(store.get("anything").is_undefined());
        }
        assert!(logs_contain("data is not an object"));
    }

    #[test]
    fn equal_write_does_not_notify() {
        let store = ReactiveStore::new(json!({"test": "hi"}));
        let counter = watch(store.root(), "test");
        assert!(!store.set("test", "hi").unwrap());
        assert_eq!(counter.0.get(), 0);
        assert!(store.set("test", "bye").unwrap());
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn object_write_compares_by_identity() {
        let store = ReactiveStore::new(json!({"o": {"a": 1}}));
        let counter = watch(store.root(), "o");
        let same = store.get("o");
        assert!(!store.set("o", same).unwrap());
        assert!(store.set("o", json!({"a": 1})).unwrap());
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn tracked_read_of_missing_key_registers_nothing() {
        let object = ReactiveObject::new();
        let counter = Rc::new(Counter(Cell::new(0)));
        let collector = Collector::new(counter);
        assert!(object.track("missing", &collector).is_undefined());
        assert!(collector.is_empty());
    }

    #[test]
    fn unknown_key_write_defines_property() {
        let object = ReactiveObject::new();
        assert!(object.set("fresh", 1).unwrap());
        assert!(object.contains_key("fresh"));
        assert_eq!(object.get("fresh"), Value::from(1));
        assert_eq!(object.subscriber_count("fresh"), 0);
    }

    #[test]
    fn cell_identity_survives_writes() {
        let object = ReactiveObject::observe(json!({"k": 0}).as_object().unwrap().clone());
        let before = object.cell("k").unwrap();
        object.set("k", 1).unwrap();
        let after = object.cell("k").unwrap();
        assert!(Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn weak_handle_does_not_keep_object_alive() {
        let object = ReactiveObject::new();
        let weak = object.downgrade();
        assert!(weak.upgrade().unwrap().ptr_eq(&object));
        drop(object);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn to_json_reflects_writes() {
        let store = ReactiveStore::new(json!({"test": "hi", "foo": {"bar": 1}}));
        store.set("test", "bye").unwrap();
        store.set("extra", true).unwrap();
        assert_eq!(
            store.root().to_json(),
            json!({"test": "bye", "foo": {"bar": 1}, "extra": true})
        );
    }
}
