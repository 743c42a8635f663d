//! GENERATE ASYMMETRIC KEY PAIR and key import

use bytes::Bytes;
use pgpcard_apdu_core::Command;

use crate::constants::{CLA, ins, params};
use crate::key_slot::KeySlot;

fn key_pair_command((p1, p2): (u8, u8), slot: KeySlot) -> Command {
    Command::new_with_data(
        CLA,
        ins::GENERATE_ASYMMETRIC_KEY_PAIR,
        p1,
        p2,
        vec![slot.crt_tag(), 0x00],
    )
    .with_le(0x00)
}

/// Generate a new key pair in `slot`; the card answers with the public key template
pub fn generate_key(slot: KeySlot) -> Command {
    key_pair_command(params::GENERATE, slot)
}

/// Read the public key of `slot` without touching the private key
pub fn read_public_key(slot: KeySlot) -> Command {
    key_pair_command(params::READ_PUBLIC_KEY, slot)
}

/// PUT DATA (odd INS) carrying an extended header list
///
/// The list is usually well over one link long; the executor chains it.
pub fn import_key(extended_header_list: impl Into<Bytes>) -> Command {
    let (p1, p2) = params::EXTENDED_HEADER_LIST;
    Command::new_with_data(CLA, ins::PUT_DATA_ODD, p1, p2, extended_header_list)
}
