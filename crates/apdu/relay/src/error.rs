//! Error types for the relay transport

use std::io;
use std::net::SocketAddr;

use pgpcard_apdu_core::TransportError;

/// Relay-specific errors
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying failure
        source: io::Error,
    },

    /// The worker thread could not be started
    #[error("Failed to start relay worker: {0}")]
    Spawn(#[source] io::Error),

    /// Exchange with the bridge failed
    #[error("Bridge I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bridge closed the connection without answering
    #[error("Bridge hung up without a response")]
    HungUp,

    /// The worker thread is gone
    #[error("Relay worker stopped")]
    WorkerStopped,
}

impl From<RelayError> for TransportError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Io(e) => e.into(),
            RelayError::HungUp | RelayError::WorkerStopped => Self::Disconnected,
            RelayError::Bind { .. } => Self::Connection,
            RelayError::Spawn(e) => Self::other(e.to_string()),
        }
    }
}

impl From<RelayError> for pgpcard_apdu_core::Error {
    fn from(err: RelayError) -> Self {
        Self::Transport(err.into())
    }
}
