//! GET DATA, PUT DATA and GET CHALLENGE

use pgpcard_apdu_core::Command;

use super::tag_params;
use crate::constants::{CLA, ins};
use crate::data_object::DataObject;
use crate::error::{Error, Result};

/// GET DATA for any tag
pub fn get_data(tag: u16) -> Command {
    let (p1, p2) = tag_params(tag);
    Command::new_with_le(CLA, ins::GET_DATA, p1, p2, 0x00)
}

/// GET DATA for a known object
pub fn get_object(object: DataObject) -> Result<Command> {
    if !object.is_readable() {
        return Err(Error::invalid_input(format!("{object} cannot be read")));
    }
    Ok(get_data(object.tag()))
}

/// PUT DATA, after checking the value against the object's bounds
pub fn put_data(object: DataObject, value: &[u8]) -> Result<Command> {
    object.validate(value)?;
    let (p1, p2) = tag_params(object.tag());
    Ok(Command::new_with_data(CLA, ins::PUT_DATA, p1, p2, value.to_vec()))
}

/// GET CHALLENGE for `len` random bytes
pub fn get_challenge(len: usize) -> Result<Command> {
    let le = u8::try_from(len)
        .ok()
        .filter(|&le| le != 0)
        .ok_or_else(|| Error::invalid_input(format!("challenge length must be 1 to 255, got {len}")))?;
    Ok(Command::new_with_le(CLA, ins::GET_CHALLENGE, 0x00, 0x00, le))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_slot::KeySlot;

    #[test]
    fn test_get_data_tags() {
        assert_eq!(hex::encode(get_data(0x006E).to_bytes().unwrap()), "00ca006e00");
        assert_eq!(hex::encode(get_data(0x7F21).to_bytes().unwrap()), "00ca7f2100");
        assert!(get_object(DataObject::ResettingCode).is_err());
    }

    #[test]
    fn test_put_data() {
        let cmd = put_data(DataObject::Name, b"Doe<<John").unwrap();
        assert_eq!(hex::encode(cmd.to_bytes().unwrap()), "00da005b09446f653c3c4a6f686e");

        let cmd = put_data(DataObject::Fingerprint(KeySlot::Authentication), &[0xAB; 20]).unwrap();
        assert_eq!(cmd.header(), [0x00, 0xDA, 0x00, 0xC9]);

        assert!(put_data(DataObject::Name, &[b'x'; 40]).is_err());
        assert!(put_data(DataObject::ApplicationRelatedData, &[]).is_err());
    }

    #[test]
    fn test_get_challenge_range() {
        assert_eq!(hex::encode(get_challenge(8).unwrap().to_bytes().unwrap()), "0084000008");
        assert!(get_challenge(255).is_ok());
        assert!(get_challenge(0).is_err());
        assert!(get_challenge(256).is_err());
    }
}
