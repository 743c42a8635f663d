//! VERIFY, CHANGE REFERENCE DATA and RESET RETRY COUNTER

use bytes::BytesMut;
use derive_more::Display;
use pgpcard_apdu_core::Command;

use crate::constants::{CLA, ins, params};

/// Password references accepted by VERIFY
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PinReference {
    /// PW1 for signing
    #[display("PW1 (signing)")]
    Pw1Sign = 0x81,
    /// PW1 for decryption and authentication
    #[display("PW1 (other)")]
    Pw1Other = 0x82,
    /// PW3, the admin password
    #[display("PW3")]
    Pw3 = 0x83,
}

/// Passwords that CHANGE REFERENCE DATA can replace
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Password {
    /// User password
    #[display("PW1")]
    Pw1 = 0x81,
    /// Admin password
    #[display("PW3")]
    Pw3 = 0x83,
}

/// How RESET RETRY COUNTER is authorised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetMode<'a> {
    /// Resetting code sent in front of the new PW1
    ResettingCode(&'a [u8]),
    /// PW3 already verified in this session
    Admin,
}

/// VERIFY a password
pub fn verify(reference: PinReference, pin: &[u8]) -> Command {
    Command::new_with_data(CLA, ins::VERIFY, 0x00, reference as u8, pin.to_vec())
}

/// CHANGE REFERENCE DATA: body is the old password followed by the new one
pub fn change_reference_data(password: Password, old: &[u8], new: &[u8]) -> Command {
    let mut body = BytesMut::with_capacity(old.len() + new.len());
    body.extend_from_slice(old);
    body.extend_from_slice(new);
    Command::new_with_data(
        CLA,
        ins::CHANGE_REFERENCE_DATA,
        0x00,
        password as u8,
        body.freeze(),
    )
}

/// RESET RETRY COUNTER of PW1
pub fn reset_retry_counter(mode: ResetMode<'_>, new_pin: &[u8]) -> Command {
    let (p1, body) = match mode {
        ResetMode::ResettingCode(code) => {
            let mut body = BytesMut::with_capacity(code.len() + new_pin.len());
            body.extend_from_slice(code);
            body.extend_from_slice(new_pin);
            (params::RESET_WITH_CODE, body.freeze())
        }
        ResetMode::Admin => (
            params::RESET_WITH_ADMIN,
            bytes::Bytes::copy_from_slice(new_pin),
        ),
    };
    Command::new_with_data(CLA, ins::RESET_RETRY_COUNTER, p1, params::RESET_PW1, body)
}
