//! The application facade.
//!
//! # Mount order
//!
//! [`App::mount`] runs three steps, in this order:
//!
//! 1. observe `data` into a [`ReactiveStore`],
//! 2. compile the `el` subtree with the app as the compile context,
//! 3. run the `created` hook.
//!
//! So `created` sees a fully painted template and its writes propagate.
//!
//! # Invariants
//!
//! 1. `app.get(k)` and `app.data().get(k)` read the same cell.
//! 2. Listeners in the document hold the app weakly; dropping every [`App`]
//!    handle makes events on the mounted tree no-ops.
//! 3. The app owns the template's bindings. [`App::unmount`] (or dropping the
//!    last handle) disconnects them.
//!
//! # Failure Modes
//!
//! | Failure | Surfaces as |
//! |---------|-------------|
//! | Missing mount element | `AppError::Compile(CompileError::MountNotFound)` from `mount` |
//! | Unknown method on event | `AppError::MethodNotFound` inside `DomError::Listener` from `dispatch` |
//! | Paint failure on write | `ReactiveError::Update` from `set` |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use tether_compiler::{CompileContext, TemplateCompiler};
use tether_dom::{Document, Event, ListenerError, NodeId, RenderTarget};
use tether_reactive::{BindingScope, ReactiveError, ReactiveObject, ReactiveStore, Value};
use tracing::{debug, debug_span};

use crate::error::AppError;
use crate::options::{Method, Options};

struct AppInner<R: RenderTarget> {
    this: Weak<AppInner<R>>,
    el: String,
    target: R,
    store: ReactiveStore,
    methods: AHashMap<String, Method<R>>,
    root: Cell<Option<NodeId>>,
    scope: RefCell<BindingScope>,
}

impl<R: RenderTarget> CompileContext for AppInner<R> {
    fn data(&self) -> ReactiveObject {
        self.store.root().clone()
    }

    fn invoke(&self, method: &str, event: &Event) -> Result<(), ListenerError> {
        let Some(inner) = self.this.upgrade() else {
            return Ok(());
        };
        App { inner }.call(method, event)?;
        Ok(())
    }
}

/// A mounted application: observed data bound to a template.
///
/// Cloning yields another handle to the same app.
pub struct App<R: RenderTarget = Document> {
    inner: Rc<AppInner<R>>,
}

impl<R: RenderTarget> Clone for App<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: RenderTarget> fmt::Debug for App<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("el", &self.inner.el)
            .field("data", self.inner.store.root())
            .field("bindings", &self.binding_count())
            .finish_non_exhaustive()
    }
}

impl<R: RenderTarget> App<R> {
    /// Observe the data, compile the template under `options.el` on
    /// `target`, then run `created`.
    pub fn mount(target: R, options: Options<R>) -> Result<Self, AppError> {
        let Options {
            el,
            data,
            methods,
            created,
        } = options;
        let _span = debug_span!("mount", el = %el).entered();

        let store = ReactiveStore::new(data);
        let inner = Rc::new_cyclic(|this| AppInner {
            this: Weak::clone(this),
            el,
            target,
            store,
            methods,
            root: Cell::new(None),
            scope: RefCell::new(BindingScope::new()),
        });

        let compiled = TemplateCompiler::compile(&inner.target, &inner.el, &inner)?;
        inner.root.set(Some(compiled.root()));
        *inner.scope.borrow_mut() = compiled.into_scope();

        let app = Self { inner };
        if let Some(created) = created {
            created(&app).map_err(|source| AppError::Created { source })?;
        }
        debug!(bindings = app.binding_count(), "mounted");
        Ok(app)
    }

    /// Current value of a root property (untracked).
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        self.inner.store.get(key)
    }

    /// Write a root property, repainting everything bound to it.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<bool, ReactiveError> {
        self.inner.store.set(key, value)
    }

    /// The observed root object.
    #[must_use]
    pub fn data(&self) -> &ReactiveObject {
        self.inner.store.root()
    }

    #[must_use]
    pub fn store(&self) -> &ReactiveStore {
        &self.inner.store
    }

    /// Invoke the method registered as `method`.
    pub fn call(&self, method: &str, event: &Event) -> Result<(), AppError> {
        let Some(f) = self.inner.methods.get(method).map(Rc::clone) else {
            return Err(AppError::MethodNotFound {
                name: method.to_owned(),
            });
        };
        debug!(method, event = event.kind(), "invoking method");
        f(self, event).map_err(|source| AppError::Method {
            name: method.to_owned(),
            source,
        })
    }

    /// The mount selector.
    #[must_use]
    pub fn el(&self) -> &str {
        &self.inner.el
    }

    /// The mount element.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.inner.root.get()
    }

    #[must_use]
    pub fn target(&self) -> &R {
        &self.inner.target
    }

    /// Live bindings owned by the app.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.inner.scope.borrow().binding_count()
    }

    /// Disconnect the template from the store. The rendered tree stays as it
    /// is; later writes no longer repaint it.
    pub fn unmount(&self) {
        let mut scope = std::mem::take(&mut *self.inner.scope.borrow_mut());
        scope.clear();
        debug!("unmounted");
    }
}
