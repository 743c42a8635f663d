//! Core error type for APDU operations
//!
//! Everything the executor can fail with funnels into [`Error`], so callers
//! above it only ever match on one type.

use crate::length::LengthError;
use crate::response::error::ResponseError;
use crate::transport::TransportError;

/// Result type for APDU operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The link to the card failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card answered with something that is not a response
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// A length field could not be encoded or decoded
    #[error(transparent)]
    Length(#[from] LengthError),

    /// Invalid command length
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// The card kept answering 61xx past the configured limit
    #[error("Chain limit exceeded after {0} GET RESPONSE exchanges")]
    ChainLimitExceeded(usize),

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether the underlying cause is a failed link rather than a card answer
    ///
    /// Transport faults are fatal for the session: nothing is retried.
    pub fn is_transport_fault(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Response(_) => true,
            Self::Context { source, .. } => source.is_transport_fault(),
            _ => false,
        }
    }
}

/// Extension trait for Result with APDU Errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
