//! RSA private key import
//!
//! The card takes an RSA key in CRT form inside an extended header list:
//!
//! ```text
//! 4D L
//!    <CRT tag> 00
//!    7F48 L   91 L(e) 92 L(p) 93 L(q) 94 L(c) 95 L(dp) 96 L(dq) 97 L(n)
//!    5F48 L   e || p || q || c || dp || dq || n
//! ```
//!
//! The private key template lists only tags and lengths; the values follow
//! unframed in `5F48`. Every component is a fixed-width big-endian field:
//! `n` as wide as the modulus, `e` at least three bytes, the rest half the
//! modulus width rounded up.

use bytes::{BufMut, Bytes, BytesMut};
use num_bigint_dig::BigUint;
use num_bigint_dig::traits::ModInverse;
use num_traits::{One, Zero};
use pgpcard_apdu_core::{LengthError, length};
use zeroize::Zeroizing;

use crate::constants::tags;
use crate::key_material::{RsaKeyMaterial, strip_leading_zeros};
use crate::key_slot::KeySlot;
use crate::types::Fingerprint;

/// Minimum width of the public exponent field
pub const MIN_EXPONENT_LEN: usize = 3;

/// Errors raised while encoding key material for import
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyImportError {
    /// A component is zero, or a prime is too small to work with
    #[error("Invalid {0}")]
    InvalidComponent(&'static str),

    /// `p * q` is not the modulus
    #[error("Primes do not multiply to the modulus")]
    ModulusMismatch,

    /// `e` has no inverse modulo `(p - 1)(q - 1)`
    #[error("Public exponent is not invertible")]
    ExponentNotInvertible,

    /// A component is wider than its field
    #[error("{component} is {len} bytes, field holds {width}")]
    ComponentTooWide {
        /// Component name
        component: &'static str,
        /// Minimal byte length of the value
        len: usize,
        /// Field width
        width: usize,
    },

    /// The assembled list does not fit a length field
    #[error(transparent)]
    Length(#[from] LengthError),
}

/// CRT form of an RSA private key
pub struct CrtComponents {
    /// Public exponent
    pub e: BigUint,
    /// First prime
    pub p: BigUint,
    /// Second prime
    pub q: BigUint,
    /// `q^(p-2) mod p`, the inverse of `q` modulo `p`
    pub c: BigUint,
    /// `d mod (p - 1)`
    pub dp: BigUint,
    /// `d mod (q - 1)`
    pub dq: BigUint,
    /// Modulus
    pub n: BigUint,
}

impl std::fmt::Debug for CrtComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrtComponents")
            .field("e", &self.e)
            .field("n_bits", &self.n.bits())
            .finish_non_exhaustive()
    }
}

impl CrtComponents {
    /// Derive the CRT parameters from `n`, `e`, `p` and `q`
    ///
    /// The inverse is computed as `q^(p-2) mod p`, which relies on `p` being
    /// prime. `p` and `q` are used in the order given; the card expects `p`
    /// to be the prime that goes in tag `92`.
    pub fn derive(material: &RsaKeyMaterial) -> Result<Self, KeyImportError> {
        let n = BigUint::from_bytes_be(material.n());
        let e = BigUint::from_bytes_be(material.e());
        let p = BigUint::from_bytes_be(material.p());
        let q = BigUint::from_bytes_be(material.q());

        let two = BigUint::from(2u32);
        if n.is_zero() {
            return Err(KeyImportError::InvalidComponent("modulus"));
        }
        if e <= BigUint::one() {
            return Err(KeyImportError::InvalidComponent("public exponent"));
        }
        if p <= two {
            return Err(KeyImportError::InvalidComponent("prime p"));
        }
        if q <= two {
            return Err(KeyImportError::InvalidComponent("prime q"));
        }
        if &p * &q != n {
            return Err(KeyImportError::ModulusMismatch);
        }

        let p1 = &p - BigUint::one();
        let q1 = &q - BigUint::one();
        let phi = &p1 * &q1;

        let d = e
            .clone()
            .mod_inverse(&phi)
            .and_then(|d| d.to_biguint())
            .ok_or(KeyImportError::ExponentNotInvertible)?;

        let c = q.modpow(&(&p - &two), &p);
        let dp = &d % &p1;
        let dq = &d % &q1;

        Ok(Self {
            e,
            p,
            q,
            c,
            dp,
            dq,
            n,
        })
    }
}

/// Field widths for one modulus size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentWidths {
    /// Public exponent
    pub e: usize,
    /// Primes, CRT coefficient and reduced exponents
    pub half: usize,
    /// Modulus
    pub n: usize,
}

impl ComponentWidths {
    /// Widths for a modulus and exponent given as big-endian bytes
    pub fn for_key(n: &[u8], e: &[u8]) -> Self {
        let n = strip_leading_zeros(n).len();
        Self {
            e: strip_leading_zeros(e).len().max(MIN_EXPONENT_LEN),
            half: n.div_ceil(2),
            n,
        }
    }
}

/// Encoded key import, ready for PUT DATA
#[derive(Debug)]
pub struct KeyImport {
    /// Slot the key goes to
    pub slot: KeySlot,
    /// The extended header list; secret
    pub payload: Zeroizing<Vec<u8>>,
    /// SHA-1 over the fixed-width modulus and exponent fields
    pub fingerprint: Fingerprint,
}

impl KeyImport {
    /// Payload as bytes for the command builder
    pub fn payload_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.payload)
    }
}

fn fixed_width(
    component: &'static str,
    value: &BigUint,
    width: usize,
) -> Result<Zeroizing<Vec<u8>>, KeyImportError> {
    let bytes = Zeroizing::new(value.to_bytes_be());
    let bytes = strip_leading_zeros(&bytes);
    if bytes.len() > width {
        return Err(KeyImportError::ComponentTooWide {
            component,
            len: bytes.len(),
            width,
        });
    }
    let mut out = Zeroizing::new(vec![0u8; width]);
    out[width - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

/// Encode key material for `slot`
pub fn encode_key_import(
    slot: KeySlot,
    material: &RsaKeyMaterial,
) -> Result<KeyImport, KeyImportError> {
    let crt = CrtComponents::derive(material)?;
    let widths = ComponentWidths::for_key(material.n(), material.e());

    let fields = [
        (tags::rsa::E, fixed_width("e", &crt.e, widths.e)?),
        (tags::rsa::P, fixed_width("p", &crt.p, widths.half)?),
        (tags::rsa::Q, fixed_width("q", &crt.q, widths.half)?),
        (tags::rsa::QINV, fixed_width("q^-1 mod p", &crt.c, widths.half)?),
        (tags::rsa::DP, fixed_width("d mod (p-1)", &crt.dp, widths.half)?),
        (tags::rsa::DQ, fixed_width("d mod (q-1)", &crt.dq, widths.half)?),
        (tags::rsa::N, fixed_width("n", &crt.n, widths.n)?),
    ];

    let mut template = BytesMut::new();
    for (tag, value) in &fields {
        template.put_u8(*tag);
        length::put_length(&mut template, value.len())?;
    }
    let key_data_len: usize = fields.iter().map(|(_, value)| value.len()).sum();

    let mut body = BytesMut::with_capacity(key_data_len + template.len() + 16);
    body.put_slice(&[slot.crt_tag(), 0x00]);
    body.put_u16(tags::PRIVATE_KEY_TEMPLATE);
    length::put_length(&mut body, template.len())?;
    body.put_slice(&template);
    body.put_u16(tags::PRIVATE_KEY_DATA);
    length::put_length(&mut body, key_data_len)?;
    for (_, value) in &fields {
        body.put_slice(value);
    }

    let mut payload = Zeroizing::new(Vec::with_capacity(body.len() + 4));
    payload.push(tags::EXTENDED_HEADER_LIST);
    payload.extend_from_slice(&length::encode_length(body.len())?);
    payload.extend_from_slice(&body);
    body.fill(0);

    let (_, n) = &fields[6];
    let (_, e) = &fields[0];
    let fingerprint = Fingerprint::of([n.as_slice(), e.as_slice()]);

    Ok(KeyImport {
        slot,
        payload,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_key() -> RsaKeyMaterial {
        // p = 61, q = 53, n = 3233, e = 17
        RsaKeyMaterial::new(vec![0x0C, 0xA1], vec![0x11], vec![61], vec![53])
    }

    #[test]
    fn test_crt_values() {
        let crt = CrtComponents::derive(&toy_key()).unwrap();
        assert_eq!(crt.c, BigUint::from(38u32));
        assert_eq!(crt.dp, BigUint::from(53u32));
        assert_eq!(crt.dq, BigUint::from(49u32));

        // c is the inverse of q modulo p
        assert_eq!((&crt.c * &crt.q) % &crt.p, BigUint::one());
    }

    #[test]
    fn test_crt_matches_direct_exponentiation() {
        let crt = CrtComponents::derive(&toy_key()).unwrap();
        let d = BigUint::from(2753u32);

        for m in [2u32, 65, 1000, 3232] {
            let m = BigUint::from(m);
            let s = m.modpow(&d, &crt.n);

            let m1 = m.modpow(&crt.dp, &crt.p);
            let m2 = m.modpow(&crt.dq, &crt.q);
            // h = c * (m1 - m2) mod p, kept non-negative
            let h = (&crt.c * ((&m1 + &crt.p - (&m2 % &crt.p)) % &crt.p)) % &crt.p;
            let reconstructed = &m2 + &h * &crt.q;

            assert_eq!(reconstructed, s);
            assert_eq!(s.modpow(&crt.e, &crt.n), m);
        }
    }

    #[test]
    fn test_widths() {
        let widths = ComponentWidths::for_key(&[0x0C, 0xA1], &[0x11]);
        assert_eq!(widths, ComponentWidths { e: 3, half: 1, n: 2 });

        let widths = ComponentWidths::for_key(&[0xFF; 256], &[0x01, 0x00, 0x01]);
        assert_eq!(widths, ComponentWidths { e: 3, half: 128, n: 256 });

        let widths = ComponentWidths::for_key(&[0xFF; 129], &[0x01, 0x00, 0x00, 0x01]);
        assert_eq!(widths, ComponentWidths { e: 4, half: 65, n: 129 });
    }

    #[test]
    fn test_toy_key_layout() {
        let import = encode_key_import(KeySlot::Decryption, &toy_key()).unwrap();
        let expected = concat!(
            "4d", "20",
            "b800",
            "7f48", "0e", "9103", "9201", "9301", "9401", "9501", "9601", "9702",
            "5f48", "0a", "000011", "3d", "35", "26", "35", "31", "0ca1",
        );
        assert_eq!(hex::encode(import.payload.as_slice()), expected);
        assert_eq!(
            import.fingerprint,
            Fingerprint::of([&[0x0C, 0xA1][..], &[0x00, 0x00, 0x11][..]])
        );
    }

    #[test]
    fn test_2048_bit_key() {
        let material =
            crate::key_material::parse_pem(include_str!("../testdata/rsa2048.pem"), None).unwrap();
        let import = encode_key_import(KeySlot::Signature, &material).unwrap();

        assert_eq!(import.payload.len(), 934);
        assert_eq!(
            hex::encode(&import.payload[..38]),
            concat!(
                "4d8203a2", "b600",
                "7f4815", "9103", "928180", "938180", "948180", "958180", "968180", "97820100",
                "5f48820383", "010001",
            )
        );
        assert_eq!(
            hex::encode(import.fingerprint.as_bytes()),
            "99c942e063607a7b4ff8017fb3c39095deb985a7"
        );

        let crt = CrtComponents::derive(&material).unwrap();
        assert_eq!((&crt.c * &crt.q) % &crt.p, BigUint::one());
    }

    #[test]
    fn test_rejects_bad_material() {
        let mismatched = RsaKeyMaterial::new(vec![0x0C, 0xA2], vec![0x11], vec![61], vec![53]);
        assert_eq!(
            CrtComponents::derive(&mismatched).unwrap_err(),
            KeyImportError::ModulusMismatch
        );

        // e = 3 shares a factor with (p-1)(q-1) = 3120
        let not_invertible = RsaKeyMaterial::new(vec![0x0C, 0xA1], vec![0x03], vec![61], vec![53]);
        assert_eq!(
            CrtComponents::derive(&not_invertible).unwrap_err(),
            KeyImportError::ExponentNotInvertible
        );

        let tiny = RsaKeyMaterial::new(vec![0x06], vec![0x11], vec![2], vec![3]);
        assert_eq!(
            CrtComponents::derive(&tiny).unwrap_err(),
            KeyImportError::InvalidComponent("prime p")
        );
    }

    #[test]
    fn test_unbalanced_primes_rejected() {
        // p = 3, q = 1021: q needs two bytes but half of a two byte modulus is one
        let n = 3u32 * 1021;
        let material = RsaKeyMaterial::new(
            n.to_be_bytes()[2..].to_vec(),
            vec![0x07],
            vec![3],
            1021u32.to_be_bytes()[2..].to_vec(),
        );
        assert_eq!(
            encode_key_import(KeySlot::Signature, &material).unwrap_err(),
            KeyImportError::ComponentTooWide {
                component: "q",
                len: 2,
                width: 1
            }
        );
    }
}
