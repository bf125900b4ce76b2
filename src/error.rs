//! # Error Types
//!
//! Every fallible operation in the crate returns [`Result<T>`](Result), i.e.
//! `std::result::Result<T, RecoveryError>`. Lower-level I/O, argument and
//! cipher failures are normalised into this taxonomy at the component boundary.
//!
//! Per-page integrity failures are **not** errors: they are reported through
//! [`crate::page::DecryptReport`] and logged, and decryption continues.

use thiserror::Error;

/// The error type for all recovery operations.
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// A caller-supplied key has the wrong length or encoding.
    ///
    /// Raised before any file is opened.
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// The derived key failed the database header integrity check.
    ///
    /// Terminal: nothing has been written to the output path.
    #[error("Key validation error: {0}")]
    KeyValidation(String),

    /// I/O error while reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The target process could not be opened or read.
    #[error("Process access error (pid {pid}): {reason}")]
    ProcessAccess {
        /// Target process id.
        pid: u32,
        /// Operating-system or platform reason.
        reason: String,
    },

    /// An exhaustive search or scan found nothing verifiable.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A media or template container is malformed.
    #[error("Format error: {0}")]
    Format(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RecoveryError>;
