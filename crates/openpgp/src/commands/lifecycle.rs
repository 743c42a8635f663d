//! Card lifecycle and vendor commands

use pgpcard_apdu_core::Command;

use crate::constants::{CLA, ins};
use crate::error::{Error, Result};

/// TERMINATE DF; the application stays unusable until ACTIVATE FILE
pub const fn terminate() -> Command {
    Command::new_with_le(CLA, ins::TERMINATE_DF, 0x00, 0x00, 0x00)
}

/// ACTIVATE FILE, resetting the application to factory state
pub const fn activate() -> Command {
    Command::new_with_le(CLA, ins::ACTIVATE_FILE, 0x00, 0x00, 0x00)
}

/// GET VERSION
pub const fn get_version() -> Command {
    Command::new_with_le(CLA, ins::GET_VERSION, 0x00, 0x00, 0x00)
}

/// SET PIN RETRIES for PW1, RC and PW3
pub fn set_pin_retries(pw1: u8, rc: u8, pw3: u8) -> Result<Command> {
    if [pw1, rc, pw3].contains(&0) {
        return Err(Error::invalid_input("retry counts must be 1 to 255"));
    }
    Ok(Command::new_with_data(
        CLA,
        ins::SET_PIN_RETRIES,
        0x00,
        0x00,
        vec![pw1, rc, pw3],
    ))
}
