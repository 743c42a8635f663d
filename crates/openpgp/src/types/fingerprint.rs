use std::fmt;

use sha1::{Digest, Sha1};

/// SHA-1 key fingerprint as stored in C5/C7-C9
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(pub [u8; Self::LEN]);

impl Fingerprint {
    /// Length of a fingerprint
    pub const LEN: usize = 20;

    /// Fingerprint over the concatenation of `parts`
    pub fn of<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// An all-zero fingerprint marks an empty slot
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Raw bytes
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl From<[u8; Fingerprint::LEN]> for Fingerprint {
    fn from(bytes: [u8; Fingerprint::LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chunk) in self.0.chunks(2).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", hex::encode_upper(chunk))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_of_parts() {
        // SHA-1("abc")
        let fp = Fingerprint::of([&b"a"[..], &b"bc"[..]]);
        assert_eq!(
            hex::encode(fp.as_bytes()),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert!(!fp.is_empty());
        assert!(Fingerprint::default().is_empty());
        assert!(fp.to_string().starts_with("A999 3E36 4706"));
    }
}
