//! Application errors.

use tether_compiler::CompileError;
use tether_reactive::ReactiveError;

/// Error type returned by methods and the `created` hook.
pub type MethodError = Box<dyn std::error::Error + 'static>;

/// Errors from mounting and driving an [`App`](crate::App).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Compiling the mount point failed (including a missing mount element).
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// A write propagated a binding failure.
    #[error(transparent)]
    Reactive(#[from] ReactiveError),
    /// An event named a method that was never registered.
    #[error("method `{name}` is not defined")]
    MethodNotFound { name: String },
    /// A registered method returned an error.
    #[error("method `{name}` failed")]
    Method {
        name: String,
        #[source]
        source: MethodError,
    },
    /// The `created` hook returned an error.
    #[error("`created` hook failed")]
    Created {
        #[source]
        source: MethodError,
    },
    /// Options could not be deserialized.
    #[error("invalid options")]
    Options(#[from] serde_json::Error),
}
