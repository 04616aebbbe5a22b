//! The owner a template is compiled against.

use tether_dom::{Event, ListenerError};
use tether_reactive::ReactiveObject;

/// What compiled templates need from their application.
///
/// Listeners hold the context weakly; once it is dropped, events on the
/// compiled tree are ignored.
pub trait CompileContext: 'static {
    /// The object expressions are resolved against.
    fn data(&self) -> ReactiveObject;

    /// Run the method registered as `method` for `event`.
    ///
    /// Called when an `@<event>` listener fires. Unknown methods are an
    /// error at this point, not at compile time.
    fn invoke(&self, method: &str, event: &Event) -> Result<(), ListenerError>;
}
