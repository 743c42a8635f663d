//! Self-describing length fields
//!
//! Lengths are encoded the way BER-TLV does it:
//!
//! - `N < 128`: one byte, `N`
//! - `128 <= N < 256`: two bytes, `81 N`
//! - `256 <= N < 65536`: three bytes, `82 hi lo`
//!
//! Nothing above 16 bits is representable.

use bytes::{BufMut, BytesMut};

/// Largest length that fits in a length field
pub const MAX_LENGTH: usize = 0xFFFF;

/// Errors raised while encoding or decoding a length field
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LengthError {
    /// Length does not fit in a 16-bit length field
    #[error("length {0} exceeds the 16-bit length field")]
    TooLong(usize),

    /// Buffer ended inside the length field
    #[error("length field truncated")]
    Truncated,

    /// First byte announces a form this codec does not know
    #[error("unsupported length form {0:#04x}")]
    UnsupportedForm(u8),
}

/// Number of bytes `encode_length(n)` produces
pub const fn encoded_len(n: usize) -> usize {
    if n < 0x80 {
        1
    } else if n < 0x100 {
        2
    } else {
        3
    }
}

/// Append the encoded form of `n` to `buf`
pub fn put_length(buf: &mut BytesMut, n: usize) -> Result<(), LengthError> {
    match n {
        0..0x80 => buf.put_u8(n as u8),
        0x80..0x100 => {
            buf.put_u8(0x81);
            buf.put_u8(n as u8);
        }
        0x100..=MAX_LENGTH => {
            buf.put_u8(0x82);
            buf.put_u16(n as u16);
        }
        _ => return Err(LengthError::TooLong(n)),
    }
    Ok(())
}

/// Encode `n` as a length field
pub fn encode_length(n: usize) -> Result<Vec<u8>, LengthError> {
    let mut buf = BytesMut::with_capacity(3);
    put_length(&mut buf, n)?;
    Ok(buf.to_vec())
}

/// Decode a length field at the start of `data`
///
/// Returns the decoded length and the number of bytes the field occupied.
pub fn decode_length(data: &[u8]) -> Result<(usize, usize), LengthError> {
    let first = *data.first().ok_or(LengthError::Truncated)?;
    match first {
        0x00..=0x7F => Ok((first as usize, 1)),
        0x81 => {
            let n = *data.get(1).ok_or(LengthError::Truncated)?;
            Ok((n as usize, 2))
        }
        0x82 => match data.get(1..3) {
            Some(&[hi, lo]) => Ok((u16::from_be_bytes([hi, lo]) as usize, 3)),
            _ => Err(LengthError::Truncated),
        },
        other => Err(LengthError::UnsupportedForm(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_forms() {
        assert_eq!(encode_length(0).unwrap(), vec![0x00]);
        assert_eq!(encode_length(1).unwrap(), vec![0x01]);
        assert_eq!(encode_length(127).unwrap(), vec![0x7F]);
        assert_eq!(encode_length(128).unwrap(), vec![0x81, 0x80]);
        assert_eq!(encode_length(255).unwrap(), vec![0x81, 0xFF]);
        assert_eq!(encode_length(256).unwrap(), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_length(65535).unwrap(), vec![0x82, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert_eq!(encode_length(65536), Err(LengthError::TooLong(65536)));
    }

    #[test]
    fn test_round_trip_full_domain() {
        for n in 0..=MAX_LENGTH {
            let encoded = encode_length(n).unwrap();
            assert_eq!(encoded.len(), encoded_len(n));
            assert_eq!(decode_length(&encoded).unwrap(), (n, encoded.len()));
        }
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode_length(&[]), Err(LengthError::Truncated));
        assert_eq!(decode_length(&[0x81]), Err(LengthError::Truncated));
        assert_eq!(decode_length(&[0x82, 0x01]), Err(LengthError::Truncated));
        assert_eq!(decode_length(&[0x83, 0, 0, 0]), Err(LengthError::UnsupportedForm(0x83)));
    }
}
