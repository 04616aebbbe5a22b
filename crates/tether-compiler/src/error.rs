//! Compilation errors.

use tether_dom::DomError;

/// Errors from [`TemplateCompiler::compile`](crate::TemplateCompiler::compile).
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The mount selector matched nothing.
    #[error("mount element `{selector}` not found")]
    MountNotFound { selector: String },
    /// The render target rejected an operation.
    #[error(transparent)]
    Dom(#[from] DomError),
}
