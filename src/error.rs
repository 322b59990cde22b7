//! Crate-wide error taxonomy.

use thiserror::Error;

/// The five error categories surfaced by the engine.
///
/// Kernels never panic; every fallible path returns one of these, wrapped
/// in [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input violates a kernel precondition (unequal-length Hamming strings,
    /// input exceeding `max_string_length`, ...).
    InvalidInput,
    /// A required configuration parameter is missing or out of range.
    InvalidConfiguration,
    /// An internal invariant was violated during computation.
    ComputationOverflow,
    /// Async submission was attempted after the worker pool shut down.
    ThreadingError,
    /// Catch-all for unexpected conditions.
    Unknown,
}

impl ErrorKind {
    /// Canonical lowercase-with-underscore code, used at the host boundary (§6).
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InvalidConfiguration => "invalid_configuration",
            ErrorKind::ComputationOverflow => "computation_overflow",
            ErrorKind::ThreadingError => "threading_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// Crate error type. Every variant carries a short, human-readable message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidConfiguration(String),

    #[error("{0}")]
    ComputationOverflow(String),

    #[error("{0}")]
    ThreadingError(String),

    #[error("{0}")]
    Unknown(String),
}

impl Error {
    /// Construct an [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Construct an [`Error::InvalidConfiguration`].
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }

    /// Construct an [`Error::ComputationOverflow`].
    pub fn computation_overflow(msg: impl Into<String>) -> Self {
        Error::ComputationOverflow(msg.into())
    }

    /// Construct an [`Error::ThreadingError`].
    pub fn threading_error(msg: impl Into<String>) -> Self {
        Error::ThreadingError(msg.into())
    }

    /// The bare tag, for host-boundary mapping and log fields.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            Error::ComputationOverflow(_) => ErrorKind::ComputationOverflow,
            Error::ThreadingError(_) => ErrorKind::ThreadingError,
            Error::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// The message carried by this error, independent of variant.
    pub fn message(&self) -> &str {
        match self {
            Error::InvalidInput(m)
            | Error::InvalidConfiguration(m)
            | Error::ComputationOverflow(m)
            | Error::ThreadingError(m)
            | Error::Unknown(m) => m,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
