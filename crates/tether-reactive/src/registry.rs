#![forbid(unsafe_code)]

//! Per-property subscriber registry.
//!
//! # Design
//!
//! Subscribers live in a slot vector (registration order) with a hash index
//! from [`RegistrationId`] to slot, so removal is O(1): the slot is cleared
//! and the vector is compacted lazily once tombstones dominate.
//!
//! # Invariants
//!
//! 1. `add` never deduplicates; every call yields a fresh id.
//! 2. `notify` visits live subscribers in registration order.
//! 3. No borrow of the registry is held while a subscriber runs, so a
//!    subscriber may add, remove, or write through to other properties.
//! 4. The first subscriber error aborts the pass and is returned.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::error::ReactiveError;

/// Something that re-renders when a property it read changes.
pub trait Subscriber {
    /// Re-read the tracked state and apply it.
    fn update(&self) -> Result<(), ReactiveError>;
}

/// Handle to one registry entry, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

/// Compaction only kicks in past this many slots.
const COMPACT_MIN_SLOTS: usize = 16;

#[derive(Default)]
struct RegistryState {
    slots: Vec<Option<(RegistrationId, Rc<dyn Subscriber>)>>,
    index: AHashMap<RegistrationId, usize>,
    next_id: u64,
}

impl RegistryState {
    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        self.index.clear();
        for (pos, slot) in self.slots.iter().enumerate() {
            if let Some((id, _)) = slot {
                self.index.insert(*id, pos);
            }
        }
    }
}

/// The ordered set of subscribers of one observable property.
#[derive(Default)]
pub struct DependencyRegistry {
    state: RefCell<RegistryState>,
}

impl fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DependencyRegistry")
            .field("subscribers", &state.index.len())
            .field("slots", &state.slots.len())
            .finish()
    }
}

impl DependencyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber. No uniqueness check is made.
    pub fn add(&self, subscriber: Rc<dyn Subscriber>) -> RegistrationId {
        let mut state = self.state.borrow_mut();
        let id = RegistrationId(state.next_id);
        state.next_id += 1;
        let pos = state.slots.len();
        state.slots.push(Some((id, subscriber)));
        state.index.insert(id, pos);
        id
    }

    /// Remove one registration. Returns `false` if it was already gone.
    pub fn remove(&self, id: RegistrationId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(pos) = state.index.remove(&id) else {
            return false;
        };
        state.slots[pos] = None;
        if state.slots.len() >= COMPACT_MIN_SLOTS && state.index.len() * 2 < state.slots.len() {
            state.compact();
        }
        true
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is still registered.
    #[must_use]
    pub fn contains(&self, id: RegistrationId) -> bool {
        self.state.borrow().index.contains_key(&id)
    }

    /// Call [`Subscriber::update`] on every subscriber in registration order.
    ///
    /// Subscribers added during the pass are not visited until the next one.
    pub fn notify(&self) -> Result<(), ReactiveError> {
        let snapshot: SmallVec<[Rc<dyn Subscriber>; 4]> = self
            .state
            .borrow()
            .slots
            .iter()
            .flatten()
            .map(|(_, sub)| Rc::clone(sub))
            .collect();
        tracing::trace!(subscribers = snapshot.len(), "notify");
        for subscriber in snapshot {
            subscriber.update()?;
        }
        Ok(())
    }
}
