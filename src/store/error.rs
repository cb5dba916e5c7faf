//! Signal store error types.

use thiserror::Error;

/// Errors raised by a [`SignalStore`](super::SignalStore) call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Signal store unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the write timeout
    #[error("Signal store call to '{path}' timed out after {timeout_ms} ms")]
    Timeout { path: String, timeout_ms: u64 },

    /// The value could not be encoded for the store
    #[error("Serialization failed for '{path}': {reason}")]
    Serialization { path: String, reason: String },

    /// The subscription stream ended
    #[error("Subscription closed")]
    SubscriptionClosed,
}
