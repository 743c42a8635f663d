//! TCP relay transport for APDU operations
//!
//! The card sits behind a small bridge device that connects to this process
//! over TCP. Every exchange is one connection: the bridge dials in, receives
//! one command APDU, answers with one response APDU and hangs up.
//!
//! A single worker thread owns the listener. The caller side and the worker
//! hand commands and responses to each other over two bounded channels, so
//! at most one exchange is ever in flight.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

mod config;
mod error;
mod transport;

pub use config::{DEFAULT_MAX_RESPONSE_LEN, DEFAULT_PORT, RelayConfig};
pub use error::RelayError;
pub use transport::RelayTransport;
