//! Kernel error types.

use thiserror::Error;

/// Errors surfaced by the menu pipeline.
///
/// Cache store failures are deliberately absent: a failed store read is a
/// cache miss and a failed store write loses only the caching optimization,
/// so both are logged and absorbed rather than propagated.
#[derive(Debug, Error)]
pub enum MenuError {
    /// An action source declared options the kernel cannot interpret.
    #[error("invalid menu options for source `{name}`: {reason}")]
    InvalidSource { name: String, reason: String },

    /// A manually registered entry carried neither an id nor a target to
    /// derive one from.
    #[error("invalid menu entry: {0}")]
    InvalidEntry(String),

    /// The authorization predicate itself failed (as opposed to denying).
    #[error("access check failed")]
    Access(#[from] anyhow::Error),
}

/// Result type alias using MenuError.
pub type MenuResult<T> = Result<T, MenuError>;
