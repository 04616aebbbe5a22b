//! Mount configuration.
//!
//! [`Options`] is built in code, or its serializable subset (`el`, `data`)
//! is read from JSON and completed with methods afterwards:
//!
//! ```
//! use tether::Options;
//!
//! let options: Options = Options::from_json(r##"{"el": "#demo", "data": {"test": "hi"}}"##)?
//!     .method("onConfirm", |app, _event| {
//!         app.set("test", "11")?;
//!         Ok(())
//!     });
//! assert_eq!(options.el(), "#demo");
//! # Ok::<(), tether::AppError>(())
//! ```

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use serde::Deserialize;
use tether_dom::{Document, Event, RenderTarget};

use crate::app::App;
use crate::error::{AppError, MethodError};

/// A named method, invoked by `@<event>` listeners and [`App::call`].
pub type Method<R = Document> = Rc<dyn Fn(&App<R>, &Event) -> Result<(), MethodError>>;

/// Hook run once after the template is compiled.
pub type Hook<R = Document> = Rc<dyn Fn(&App<R>) -> Result<(), MethodError>>;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionsFile {
    el: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Everything [`App::mount`] needs.
pub struct Options<R: RenderTarget = Document> {
    pub(crate) el: String,
    pub(crate) data: serde_json::Value,
    pub(crate) methods: AHashMap<String, Method<R>>,
    pub(crate) created: Option<Hook<R>>,
}

impl<R: RenderTarget> fmt::Debug for Options<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Options")
            .field("el", &self.el)
            .field("data", &self.data)
            .field("methods", &methods)
            .field("created", &self.created.is_some())
            .finish()
    }
}

impl<R: RenderTarget> Options<R> {
    /// Options mounting at `el` (`#id`, `.class`, or a tag name) with no
    /// data.
    #[must_use]
    pub fn new(el: impl Into<String>) -> Self {
        Self {
            el: el.into(),
            data: serde_json::Value::Null,
            methods: AHashMap::new(),
            created: None,
        }
    }

    /// Read `el` and `data` from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let file: OptionsFile = serde_json::from_str(json)?;
        Ok(Self::new(file.el).data(file.data))
    }

    /// The data to observe. Anything but a JSON object mounts an empty
    /// store.
    #[must_use]
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Register `f` under `name`, replacing any previous method of that name.
    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&App<R>, &Event) -> Result<(), MethodError> + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Rc::new(f));
        self
    }

    #[must_use]
    pub fn created(mut self, f: impl Fn(&App<R>) -> Result<(), MethodError> + 'static) -> Self {
        self.created = Some(Rc::new(f));
        self
    }

    /// The mount selector.
    #[must_use]
    pub fn el(&self) -> &str {
        &self.el
    }

    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}
