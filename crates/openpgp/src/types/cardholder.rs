use std::fmt;

use derive_more::Display;

use crate::tlv::{DecodeError, FieldSpec, Layout, read_layout, strip_template};

/// Sex as stored in 5F35 (ISO 5218)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Sex {
    /// Male
    #[display("male")]
    Male,
    /// Female
    #[display("female")]
    Female,
}

impl Sex {
    /// Card encoding
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Male => 0x31,
            Self::Female => 0x32,
        }
    }

    /// Decode the card encoding; anything else means "not set"
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x31 => Some(Self::Male),
            0x32 => Some(Self::Female),
            _ => None,
        }
    }
}

/// Fields of the cardholder related data record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrdField {
    /// Name (5B)
    Name,
    /// Language preferences (5F2D)
    LanguagePreferences,
    /// Sex (5F35)
    Sex,
}

/// Layout of the cardholder related data record (65)
pub const CRD_LAYOUT: Layout<CrdField> = Layout {
    name: "cardholder related data",
    fields: &[
        FieldSpec::prefixed(CrdField::Name, 1),
        FieldSpec::prefixed(CrdField::LanguagePreferences, 2),
        // 5F 35 01
        FieldSpec::fixed(CrdField::Sex, 3, 1),
    ],
};

/// Cardholder related data (65)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardholderRelatedData {
    /// Cardholder name
    pub name: String,
    /// Language preferences
    pub language_preferences: String,
    /// Sex, `None` when not set
    pub sex: Option<Sex>,
}

impl CardholderRelatedData {
    /// Decode a GET DATA 65 response, with or without the outer template
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let data = strip_template(CRD_LAYOUT.name, &[0x65], data)?;
        let record = read_layout(&CRD_LAYOUT, data)?;
        let [sex] = record.array::<1>(CrdField::Sex)?;

        Ok(Self {
            name: String::from_utf8_lossy(record.get(CrdField::Name)?).into_owned(),
            language_preferences: String::from_utf8_lossy(
                record.get(CrdField::LanguagePreferences)?,
            )
            .into_owned(),
            sex: Sex::from_byte(sex),
        })
    }
}

impl fmt::Display for CardholderRelatedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name ..................: {}", self.name)?;
        writeln!(f, "Language preferences ..: {}", self.language_preferences)?;
        match self.sex {
            Some(sex) => writeln!(f, "Sex ...................: {sex}"),
            None => writeln!(f, "Sex ...................: not set"),
        }
    }
}

/// Fields of the security support template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecuritySupportField {
    /// Digital signature counter (93)
    SignatureCounter,
}

/// Layout of the security support template (7A)
pub const SECURITY_SUPPORT_LAYOUT: Layout<SecuritySupportField> = Layout {
    name: "security support template",
    fields: &[FieldSpec::fixed(SecuritySupportField::SignatureCounter, 2, 3)],
};

/// Decode the signature counter out of a GET DATA 7A response
pub fn signature_counter(data: &[u8]) -> Result<u32, DecodeError> {
    let data = strip_template(SECURITY_SUPPORT_LAYOUT.name, &[0x7A], data)?;
    let record = read_layout(&SECURITY_SUPPORT_LAYOUT, data)?;
    let [a, b, c] = record.array::<3>(SecuritySupportField::SignatureCounter)?;
    Ok(u32::from_be_bytes([0, a, b, c]))
}
