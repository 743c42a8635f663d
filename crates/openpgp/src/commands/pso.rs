//! PERFORM SECURITY OPERATION and INTERNAL AUTHENTICATE

use bytes::BytesMut;
use pgpcard_apdu_core::Command;

use crate::constants::{CLA, MAX_AUTH_INPUT_LEN, ins, params};
use crate::error::{Error, Result};

fn check_auth_input(what: &'static str, data: &[u8]) -> Result<()> {
    if data.len() > MAX_AUTH_INPUT_LEN {
        return Err(Error::InputTooLong {
            what,
            len: data.len(),
            max: MAX_AUTH_INPUT_LEN,
        });
    }
    Ok(())
}

/// PSO: COMPUTE DIGITAL SIGNATURE over a DigestInfo or raw hash
pub fn compute_digital_signature(data: &[u8]) -> Result<Command> {
    check_auth_input("signature input", data)?;
    let (p1, p2) = params::PSO_CDS;
    Ok(Command::new_with_data(CLA, ins::PSO, p1, p2, data.to_vec()).with_le(0x00))
}

/// PSO: DECIPHER; the padding indicator byte `00` is prepended
pub fn decipher(ciphertext: &[u8]) -> Command {
    let mut body = BytesMut::with_capacity(ciphertext.len() + 1);
    body.extend_from_slice(&[0x00]);
    body.extend_from_slice(ciphertext);
    let (p1, p2) = params::PSO_DECIPHER;
    Command::new_with_data(CLA, ins::PSO, p1, p2, body.freeze()).with_le(0x00)
}

/// INTERNAL AUTHENTICATE with the authentication key
pub fn internal_authenticate(data: &[u8]) -> Result<Command> {
    check_auth_input("authentication input", data)?;
    Ok(Command::new_with_data(CLA, ins::INTERNAL_AUTHENTICATE, 0x00, 0x00, data.to_vec())
        .with_le(0x00))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_bound() {
        let cmd = compute_digital_signature(&[0xAA; 245]).unwrap();
        assert_eq!(cmd.header(), [0x00, 0x2A, 0x9E, 0x9A]);
        assert_eq!(cmd.payload().len(), 245);

        assert!(matches!(
            compute_digital_signature(&[0xAA; 246]),
            Err(Error::InputTooLong { len: 246, max: 245, .. })
        ));
        assert!(internal_authenticate(&[0; 246]).is_err());
    }

    #[test]
    fn test_decipher_padding_indicator() {
        let cmd = decipher(&[0x11; 256]);
        assert_eq!(cmd.header(), [0x00, 0x2A, 0x80, 0x86]);
        assert_eq!(cmd.payload().len(), 257);
        assert_eq!(cmd.payload()[0], 0x00);
        assert_eq!(cmd.payload()[1], 0x11);
    }

    #[test]
    fn test_internal_authenticate() {
        let cmd = internal_authenticate(b"hello").unwrap();
        assert_eq!(hex::encode(cmd.to_bytes().unwrap()), "008800000568656c6c6f00");
    }
}
