//! Fixed-layout TLV decoding
//!
//! The card's metadata records have a constant shape, so they are not parsed
//! as generic BER-TLV. Each record is described by a [`Layout`]: an ordered
//! table of fields, each with a number of bytes to skip (tags that carry no
//! payload) and a width. A single cursor walk then pulls every field out of
//! the flat response buffer.

mod layout;
mod reader;

pub use layout::{FieldSpec, Layout, Width};
pub use reader::{Cursor, Record, read_layout, strip_template};

use pgpcard_apdu_core::LengthError;

/// Errors raised while decoding a response buffer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A read would run past the end of the buffer
    #[error("{layout}: need {needed} bytes at offset {offset}, only {available} left")]
    Truncated {
        /// Record being decoded
        layout: &'static str,
        /// Cursor position at the failed read
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// A length prefix could not be decoded
    #[error("{layout}: bad length prefix at offset {offset}: {source}")]
    Length {
        /// Record being decoded
        layout: &'static str,
        /// Cursor position of the prefix
        offset: usize,
        /// Underlying failure
        source: LengthError,
    },

    /// A decoded record lacks a field its layout promises
    #[error("{layout}: field {field} missing")]
    MissingField {
        /// Record being decoded
        layout: &'static str,
        /// Debug name of the field
        field: String,
    },

    /// Generic BER-TLV parsing failed
    #[error("Malformed TLV: {0}")]
    Tlv(String),

    /// A value was read but makes no sense
    #[error("Invalid {what}: {reason}")]
    InvalidValue {
        /// What was being decoded
        what: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl From<iso7816_tlv::TlvError> for DecodeError {
    fn from(err: iso7816_tlv::TlvError) -> Self {
        Self::Tlv(err.to_string())
    }
}
