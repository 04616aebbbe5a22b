//! Everything an application typically needs.

pub use crate::app::App;
pub use crate::error::{AppError, MethodError};
pub use crate::options::Options;
pub use tether_dom::{Document, Event, NodeId, RenderTarget};
pub use tether_reactive::{Binding, ReactiveObject, ReactiveStore, Value};
