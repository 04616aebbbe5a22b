//! Explicit dependency-collection context.
//!
//! A [`Collector`] stands in for "the subscriber currently being built". It
//! is created for one construction, handed to every tracked read that
//! construction performs, and then consumed. Because the context is a value
//! rather than shared global state, nested constructions each collect into
//! their own collector and cannot steal each other's dependencies.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::registry::{DependencyRegistry, RegistrationId, Subscriber};

/// One entry a subscriber holds in one registry.
#[derive(Clone, Debug)]
pub struct Registration {
    registry: Weak<DependencyRegistry>,
    id: RegistrationId,
}

impl Registration {
    #[must_use]
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Whether the registry still exists and still holds this entry.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }

    /// Remove the entry from its registry. Returns `false` if the entry or
    /// the registry was already gone.
    pub fn release(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}

/// Records the registrations made by tracked reads on behalf of one
/// subscriber.
pub struct Collector {
    subscriber: Rc<dyn Subscriber>,
    registrations: RefCell<SmallVec<[Registration; 1]>>,
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("registrations", &self.registrations.borrow().len())
            .finish()
    }
}

impl Collector {
    #[must_use]
    pub fn new(subscriber: Rc<dyn Subscriber>) -> Self {
        Self {
            subscriber,
            registrations: RefCell::new(SmallVec::new()),
        }
    }

    /// Add the collecting subscriber to `registry`.
    pub fn register(&self, registry: &Rc<DependencyRegistry>) {
        let id = registry.add(Rc::clone(&self.subscriber));
        tracing::trace!(?id, "dependency collected");
        self.registrations.borrow_mut().push(Registration {
            registry: Rc::downgrade(registry),
            id,
        });
    }

    /// Number of registrations collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// End collection and hand over the registrations.
    #[must_use]
    pub fn finish(self) -> SmallVec<[Registration; 1]> {
        self.registrations.into_inner()
    }
}
