//! Error taxonomy for callable wrapping and timed invocation
//!
//! Three failure classes originate here (label grammar, callable resolution,
//! label dispatch). The fourth is whatever the wrapped callable itself
//! returned, carried through untouched.

use thiserror::Error;

/// Errors produced while binding or invoking a callable
#[derive(Error, Debug)]
pub enum TimerError {
    /// Label does not match `[A-Za-z_\x80-..][A-Za-z0-9_\x80-..]*`
    #[error(
        "Invalid label `{0}`: must start with a letter or underscore, followed by letters, digits, or underscores"
    )]
    InvalidLabel(String),

    /// Value could not be normalized into something invocable
    #[error("Unresolvable callable: {0}")]
    UnresolvableCallable(String),

    /// Label-based dispatch asked for a label this unit is not registered under
    #[error("Method `{requested}` not found (unit is registered as `{registered}`)")]
    UnregisteredLabel {
        requested: String,
        registered: String,
    },

    /// Failure raised by the wrapped callable, propagated unchanged
    #[error(transparent)]
    Callee(anyhow::Error),
}

impl TimerError {
    /// The callee's own error, if this failure came from the wrapped callable
    pub fn callee_error(&self) -> Option<&anyhow::Error> {
        match self {
            TimerError::Callee(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for callable-timer operations
pub type Result<T> = std::result::Result<T, TimerError>;
