//! Cursor walk over a flat buffer

use std::fmt;

use pgpcard_apdu_core::{LengthError, decode_length};

use super::DecodeError;
use super::layout::{Layout, Width};

/// Read position over a response buffer
///
/// Every read is bounds-checked; nothing past the end is ever touched.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    layout: &'static str,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Start at the beginning of `buf`
    pub const fn new(layout: &'static str, buf: &'a [u8]) -> Self {
        Self { layout, buf, pos: 0 }
    }

    /// Current offset
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    const fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            layout: self.layout,
            offset: self.pos,
            needed,
            available: self.buf.len() - self.pos,
        }
    }

    /// Consume `n` bytes and return them
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| self.truncated(n))?;
        let value = &self.buf[self.pos..end];
        self.pos = end;
        Ok(value)
    }

    /// Advance past `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }

    /// Consume a length prefix and the value it announces
    pub fn take_prefixed(&mut self) -> Result<&'a [u8], DecodeError> {
        let rest = &self.buf[self.pos..];
        let length_error = |source| DecodeError::Length {
            layout: self.layout,
            offset: self.pos,
            source,
        };
        // Sub-fields never exceed 255 bytes, so the three byte form is invalid here
        let (len, consumed) = match rest.first() {
            Some(0x82) => return Err(length_error(LengthError::UnsupportedForm(0x82))),
            Some(_) => decode_length(rest).map_err(|e| match e {
                LengthError::Truncated => self.truncated(2),
                other => length_error(other),
            })?,
            None => return Err(self.truncated(1)),
        };
        self.pos += consumed;
        self.take(len)
    }

    /// Read one field of the given width
    pub fn read(&mut self, width: Width) -> Result<&'a [u8], DecodeError> {
        match width {
            Width::Fixed(n) => self.take(n),
            Width::Prefixed => self.take_prefixed(),
        }
    }
}

/// Fields pulled out of a buffer, in layout order
#[derive(Clone)]
pub struct Record<'a, F> {
    layout: &'static str,
    values: Vec<(F, &'a [u8])>,
}

impl<F: fmt::Debug> fmt::Debug for Record<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.values
                    .iter()
                    .map(|(field, value)| (field, hex::encode(value))),
            )
            .finish()
    }
}

impl<'a, F: Copy + PartialEq + fmt::Debug> Record<'a, F> {
    /// Raw bytes of `field`
    pub fn get(&self, field: F) -> Result<&'a [u8], DecodeError> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| *value)
            .ok_or_else(|| DecodeError::MissingField {
                layout: self.layout,
                field: format!("{field:?}"),
            })
    }

    /// Bytes of a fixed-width field as an array
    pub fn array<const N: usize>(&self, field: F) -> Result<[u8; N], DecodeError> {
        let value = self.get(field)?;
        value
            .try_into()
            .map_err(|_| DecodeError::InvalidValue {
                what: self.layout,
                reason: format!("{field:?} is {} bytes, expected {N}", value.len()),
            })
    }

    /// Owned copy of a field
    pub fn to_vec(&self, field: F) -> Result<Vec<u8>, DecodeError> {
        self.get(field).map(<[u8]>::to_vec)
    }
}

/// Walk `buf` according to `layout`
///
/// Trailing bytes after the last field are ignored.
pub fn read_layout<'a, F: Copy + 'static>(
    layout: &Layout<F>,
    buf: &'a [u8],
) -> Result<Record<'a, F>, DecodeError> {
    let mut cursor = Cursor::new(layout.name, buf);
    let mut values = Vec::with_capacity(layout.fields.len());
    for spec in layout.fields {
        cursor.skip(spec.skip)?;
        values.push((spec.field, cursor.read(spec.width)?));
    }
    Ok(Record {
        layout: layout.name,
        values,
    })
}

/// Remove an optional outer template
///
/// If `buf` starts with `tag`, the tag and its length are dropped and the
/// announced value is returned; otherwise `buf` comes back untouched.
pub fn strip_template<'a>(
    layout: &'static str,
    tag: &[u8],
    buf: &'a [u8],
) -> Result<&'a [u8], DecodeError> {
    match buf.strip_prefix(tag) {
        Some(rest) => {
            let mut cursor = Cursor::new(layout, rest);
            let (len, consumed) = decode_length(rest).map_err(|source| DecodeError::Length {
                layout,
                offset: tag.len(),
                source,
            })?;
            cursor.skip(consumed)?;
            cursor.take(len)
        }
        None => Ok(buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlv::FieldSpec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        A,
        B,
        C,
    }

    const LAYOUT: Layout<Field> = Layout {
        name: "test",
        fields: &[
            FieldSpec::prefixed(Field::A, 1),
            FieldSpec::fixed(Field::B, 2, 3),
            FieldSpec::prefixed(Field::C, 0),
        ],
    };

    #[test]
    fn test_read_layout() {
        let buf = hex::decode("4f02aabb c002 010203 81030a0b0c ff".replace(' ', "")).unwrap();
        let record = read_layout(&LAYOUT, &buf).unwrap();
        assert_eq!(record.get(Field::A).unwrap(), &[0xAA, 0xBB]);
        assert_eq!(record.array::<3>(Field::B).unwrap(), [1, 2, 3]);
        assert_eq!(record.get(Field::C).unwrap(), &[0x0A, 0x0B, 0x0C]);
    }

    #[test]
    fn test_truncation_everywhere() {
        let buf = hex::decode("4f02aabbc00201020381030a0b0c").unwrap();
        assert!(read_layout(&LAYOUT, &buf).is_ok());
        for len in 0..buf.len() {
            let err = read_layout(&LAYOUT, &buf[..len]).unwrap_err();
            assert!(
                matches!(err, DecodeError::Truncated { .. }),
                "len {len}: {err:?}"
            );
        }
    }

    #[test]
    fn test_three_byte_prefix_rejected() {
        let buf = hex::decode("4f820001aa").unwrap();
        assert!(matches!(
            read_layout(&LAYOUT, &buf),
            Err(DecodeError::Length {
                source: LengthError::UnsupportedForm(0x82),
                ..
            })
        ));
    }

    #[test]
    fn test_strip_template() {
        let inner = [0x4F, 0x01, 0xAA];
        let wrapped = [0x6E, 0x03, 0x4F, 0x01, 0xAA, 0x90];
        assert_eq!(strip_template("t", &[0x6E], &wrapped).unwrap(), &inner);
        assert_eq!(strip_template("t", &[0x6E], &inner).unwrap(), &inner);
        assert!(strip_template("t", &[0x6E], &[0x6E, 0x05, 0x4F]).is_err());
    }
}
