use std::fmt;

use iso7816_tlv::ber::{Tlv, Value};

use crate::constants::tags;
use crate::tlv::DecodeError;
use crate::types::Fingerprint;

/// RSA public key returned by GENERATE ASYMMETRIC KEY PAIR
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Modulus, as returned
    pub modulus: Vec<u8>,
    /// Public exponent, as returned
    pub exponent: Vec<u8>,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("modulus_bits", &(self.modulus.len() * 8))
            .field("exponent", &hex::encode(&self.exponent))
            .finish()
    }
}

fn primitive<'a>(children: &'a [Tlv], tag: u8) -> Result<&'a [u8], DecodeError> {
    let found = children
        .iter()
        .find(|tlv| tlv.tag().to_bytes() == [tag])
        .ok_or_else(|| DecodeError::MissingField {
            layout: "public key template",
            field: format!("{tag:02X}"),
        })?;
    match found.value() {
        Value::Primitive(bytes) => Ok(bytes.as_slice()),
        Value::Constructed(_) => Err(DecodeError::InvalidValue {
            what: "public key template",
            reason: format!("{tag:02X} is constructed"),
        }),
    }
}

impl PublicKey {
    /// Parse a 7F49 public key template
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let tlv = Tlv::from_bytes(data)?;
        if tlv.tag().to_bytes() != tags::PUBLIC_KEY_TEMPLATE.to_be_bytes() {
            return Err(DecodeError::InvalidValue {
                what: "public key template",
                reason: format!("unexpected tag {}", hex::encode_upper(tlv.tag().to_bytes())),
            });
        }
        let Value::Constructed(children) = tlv.value() else {
            return Err(DecodeError::InvalidValue {
                what: "public key template",
                reason: "template is primitive".into(),
            });
        };

        Ok(Self {
            modulus: primitive(children, tags::MODULUS)?.to_vec(),
            exponent: primitive(children, tags::PUBLIC_EXPONENT)?.to_vec(),
        })
    }

    /// Fingerprint over modulus and exponent exactly as the card returned them
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of([self.modulus.as_slice(), self.exponent.as_slice()])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modulus ({} bits):", self.modulus.len() * 8)?;
        for line in self.modulus.chunks(32) {
            writeln!(f, "  {}", hex::encode_upper(line))?;
        }
        write!(f, "Exponent: {}", hex::encode_upper(&self.exponent))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 7F49 template around a 256-byte modulus and e = 65537
    pub(crate) fn sample_template() -> Vec<u8> {
        let mut data = hex::decode("7F49820109818201 00".replace(' ', "")).unwrap();
        data.extend((0..=255u8).collect::<Vec<_>>());
        data.extend([0x82, 0x03, 0x01, 0x00, 0x01]);
        data
    }

    #[test]
    fn test_parse_public_key() {
        let key = PublicKey::from_bytes(&sample_template()).unwrap();
        assert_eq!(key.modulus.len(), 256);
        assert_eq!(key.modulus[1], 0x01);
        assert_eq!(key.exponent, vec![0x01, 0x00, 0x01]);

        let mut expected = key.modulus.clone();
        expected.extend(&key.exponent);
        assert_eq!(key.fingerprint(), Fingerprint::of([expected.as_slice()]));
    }

    #[test]
    fn test_parse_public_key_errors() {
        assert!(PublicKey::from_bytes(&[0x7F, 0x49, 0x03, 0x81, 0x01, 0x05]).is_err());
        assert!(PublicKey::from_bytes(&[0x5F, 0x50, 0x01, 0x00]).is_err());
        assert!(PublicKey::from_bytes(&[0x7F, 0x49]).is_err());
    }
}
