use thiserror::Error;

/// Errors a host world reports when a read or write against one of its
/// objects cannot be carried out
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// Object was not found during lookup
    #[error("Object not found: {context}")]
    ObjectNotFound { context: String },

    /// Marker exists, but holds a value of an unexpected type
    #[error("Marker `{key}` holds a {found} value, expected {expected}")]
    MarkerTypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Host cannot answer right now (object unloading, data not attached...)
    #[error("Host data unavailable: {reason}")]
    Unavailable { reason: String },

    /// Host refused to remove an object
    #[error("Failed to discard object: {reason}")]
    DiscardFailed { reason: String },
}
