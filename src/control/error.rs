//! Controller error types.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControlError {
    /// A caller passed an argument no valid command can carry
    #[error("Programming error: {0}")]
    Programming(String),

    /// The controller task has stopped
    #[error("Vehicle controller is no longer running")]
    ControllerClosed,
}

/// Build a [`ControlError::Programming`], panicking in debug builds.
pub fn programming_error(message: impl Into<String>) -> ControlError {
    let message = message.into();
    debug_assert!(false, "programming error: {message}");
    ControlError::Programming(message)
}
