//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits for talking to an
//! ISO/IEC 7816-4 smart card application:
//!
//! - The BER-style length codec used for Lc ([`length`])
//! - Building and serializing commands ([`Command`])
//! - Parsing responses and interpreting status words ([`Response`], [`StatusWord`])
//! - Raw byte transports ([`CardTransport`])
//! - An executor that hides command chaining and `61 XX` continuation ([`CardExecutor`])
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod card;
pub mod command;
pub mod error;
pub mod executor;
pub mod length;
pub mod response;
pub mod transport;

pub use card::{CardExecutor, ExecutorConfig};
pub use command::Command;
pub use error::{Error, Result, ResultExt};
pub use executor::Executor;
pub use length::{LengthError, MAX_LENGTH, decode_length, encode_length};
pub use response::Response;
pub use response::status::StatusWord;
pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    // Core types
    pub use crate::{Bytes, BytesMut, Error, Result, ResultExt};

    // Command related
    pub use crate::Command;
    pub use crate::length::{decode_length, encode_length};

    // Response related
    pub use crate::Response;
    pub use crate::response::status::{StatusWord, common as status};

    // Transport layer
    pub use crate::{CardTransport, TransportError};

    // Executor layer
    pub use crate::card::{CardExecutor, ExecutorConfig};
    pub use crate::executor::Executor;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x00);
        assert_eq!(cmd.header(), [0x00, 0xA4, 0x04, 0x00]);

        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let resp = Response::success(data.clone());
        assert!(resp.is_success());
        assert_eq!(resp.payload(), data.as_ref());
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
    }
}
