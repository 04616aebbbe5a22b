#![forbid(unsafe_code)]

//! Tether: a minimal reactive binding engine.
//!
//! Observed data, a template with `{{ }}` placeholders and `x-html`,
//! `x-model`, and `@event` directives, and a document that repaints itself
//! when the data changes.
//!
//! ```
//! use serde_json::json;
//! use tether::prelude::*;
//!
//! let doc = Document::parse(
//!     r#"<div id="demo"><p>{{ test }}</p><button @click="onConfirm">ok</button></div>"#,
//! )?;
//! let app = App::mount(
//!     doc.clone(),
//!     Options::new("#demo")
//!         .data(json!({"test": "hi"}))
//!         .method("onConfirm", |app, _| {
//!             app.set("test", "11")?;
//!             Ok(())
//!         }),
//! )?;
//!
//! let button = doc.query_selector("button").expect("rendered");
//! doc.dispatch(button, "click")?;
//! assert_eq!(app.get("test"), Value::from("11"));
//! assert_eq!(doc.inner_html(app.root().expect("mounted"))?, "<p>11</p><button>ok</button>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Crates
//!
//! | Crate | Role |
//! |-------|------|
//! | `tether-reactive` | store, dependency registries, bindings |
//! | `tether-dom` | in-memory document, markup loading, `RenderTarget` |
//! | `tether-compiler` | directive and placeholder compilation |
//! | `tether` | [`App`], [`Options`], logging |

pub mod app;
pub mod error;
pub mod logging;
pub mod options;
pub mod prelude;

pub use app::App;
pub use error::{AppError, MethodError};
pub use options::{Hook, Method, Options};

pub use tether_compiler as compiler;
pub use tether_dom as dom;
pub use tether_reactive as reactive;
