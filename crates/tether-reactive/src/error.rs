//! Errors raised while propagating changes.

/// Error type returned by binding callbacks.
///
/// Callbacks paint into a host (a document, a test recorder), so their
/// failures are carried opaquely.
pub type CallbackError = Box<dyn std::error::Error + 'static>;

/// Errors from reactive propagation.
#[derive(Debug, thiserror::Error)]
pub enum ReactiveError {
    /// A subscriber's callback failed during notification.
    #[error("binding on `{key}` failed to update")]
    Update {
        key: String,
        #[source]
        source: CallbackError,
    },
}
