use std::fmt;

use crate::tlv::DecodeError;

/// PW status bytes (C4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwStatus {
    /// PW1 stays valid for several PSO:CDS commands
    pub pw1_valid_for_multiple: bool,
    /// Maximum length of PW1
    pub pw1_max_len: u8,
    /// Maximum length of the resetting code
    pub rc_max_len: u8,
    /// Maximum length of PW3
    pub pw3_max_len: u8,
    /// Tries left for PW1
    pub pw1_tries: u8,
    /// Tries left for the resetting code
    pub rc_tries: u8,
    /// Tries left for PW3
    pub pw3_tries: u8,
}

impl PwStatus {
    /// Encoded length
    pub const LEN: usize = 7;
}

impl From<[u8; PwStatus::LEN]> for PwStatus {
    fn from(b: [u8; PwStatus::LEN]) -> Self {
        Self {
            pw1_valid_for_multiple: b[0] == 0x01,
            pw1_max_len: b[1],
            rc_max_len: b[2],
            pw3_max_len: b[3],
            pw1_tries: b[4],
            rc_tries: b[5],
            pw3_tries: b[6],
        }
    }
}

impl TryFrom<&[u8]> for PwStatus {
    type Error = DecodeError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let mut cursor = crate::tlv::Cursor::new("PW status bytes", data);
        let bytes: [u8; Self::LEN] = cursor
            .take(Self::LEN)?
            .try_into()
            .map_err(|_| DecodeError::InvalidValue {
                what: "PW status bytes",
                reason: "wrong length".into(),
            })?;
        Ok(bytes.into())
    }
}

impl fmt::Display for PwStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let validity = if self.pw1_valid_for_multiple {
            "multiple signatures"
        } else {
            "one signature"
        };
        writeln!(f, "PW1 valid for   : {validity}")?;
        writeln!(
            f,
            "Maximum lengths : PW1 {}, RC {}, PW3 {}",
            self.pw1_max_len, self.rc_max_len, self.pw3_max_len
        )?;
        write!(
            f,
            "Tries left      : PW1 {}, RC {}, PW3 {}",
            self.pw1_tries, self.rc_tries, self.pw3_tries
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pw_status() {
        let status = PwStatus::try_from(&[0x00, 0x7F, 0x7F, 0x7F, 0x03, 0x00, 0x03][..]).unwrap();
        assert!(!status.pw1_valid_for_multiple);
        assert_eq!(status.pw1_max_len, 127);
        assert_eq!(status.pw1_tries, 3);
        assert_eq!(status.rc_tries, 0);
        assert_eq!(status.pw3_tries, 3);

        assert!(matches!(
            PwStatus::try_from(&[0x01, 0x7F][..]),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
