//! Data objects addressed by GET DATA and PUT DATA
//!
//! Every writable object carries a length bound that is checked before a
//! PUT DATA command is built, so an oversized value never reaches the card.

use std::str::FromStr;

use derive_more::Display;

use crate::constants::tags;
use crate::error::{Error, Result};
use crate::key_slot::KeySlot;
use crate::types::{Fingerprint, Sex, Timestamp};

/// Longest name the card stores
pub const MAX_NAME_LEN: usize = 39;
/// Longest login data or URL value
pub const MAX_TEXT_LEN: usize = 254;
/// Longest language preference list
pub const MAX_LANGUAGE_LEN: usize = 8;
/// Largest cardholder certificate
pub const MAX_CERTIFICATE_LEN: usize = 1216;
/// Shortest non-empty resetting code
pub const MIN_RESETTING_CODE_LEN: usize = 8;
/// Longest resetting code
pub const MAX_RESETTING_CODE_LEN: usize = 127;

/// A data object known to this crate
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataObject {
    /// Application related data (read only)
    #[display("application related data")]
    ApplicationRelatedData,
    /// Cardholder related data (read only)
    #[display("cardholder related data")]
    CardholderRelatedData,
    /// Security support template (read only)
    #[display("security support template")]
    SecuritySupportTemplate,
    /// Name
    #[display("name")]
    Name,
    /// Login data
    #[display("login data")]
    LoginData,
    /// Language preferences
    #[display("language preferences")]
    LanguagePreferences,
    /// Sex
    #[display("sex")]
    Sex,
    /// Public key URL
    #[display("URL")]
    Url,
    /// Cardholder certificate
    #[display("cardholder certificate")]
    CardholderCertificate,
    /// PW status bytes; only the PW1 validity byte is writable
    #[display("PW status bytes")]
    PwStatus,
    /// Resetting code (write only)
    #[display("resetting code")]
    ResettingCode,
    /// Fingerprint of a slot's key
    #[display("{_0} fingerprint")]
    Fingerprint(KeySlot),
    /// Generation time of a slot's key
    #[display("{_0} generation time")]
    GenerationTime(KeySlot),
}

impl DataObject {
    /// Tag used in the P1/P2 bytes of GET DATA and PUT DATA
    pub const fn tag(self) -> u16 {
        match self {
            Self::ApplicationRelatedData => tags::APPLICATION_RELATED_DATA,
            Self::CardholderRelatedData => tags::CARDHOLDER_RELATED_DATA,
            Self::SecuritySupportTemplate => tags::SECURITY_SUPPORT_TEMPLATE,
            Self::Name => tags::NAME,
            Self::LoginData => tags::LOGIN_DATA,
            Self::LanguagePreferences => tags::LANGUAGE_PREFERENCES,
            Self::Sex => tags::SEX,
            Self::Url => tags::URL,
            Self::CardholderCertificate => tags::CARDHOLDER_CERTIFICATE,
            Self::PwStatus => tags::PW_STATUS,
            Self::ResettingCode => tags::RESETTING_CODE,
            Self::Fingerprint(slot) => slot.fingerprint_tag(),
            Self::GenerationTime(slot) => slot.generation_time_tag(),
        }
    }

    /// Look an object up by tag
    pub fn from_tag(tag: u16) -> Option<Self> {
        let found = match tag {
            tags::APPLICATION_RELATED_DATA => Self::ApplicationRelatedData,
            tags::CARDHOLDER_RELATED_DATA => Self::CardholderRelatedData,
            tags::SECURITY_SUPPORT_TEMPLATE => Self::SecuritySupportTemplate,
            tags::NAME => Self::Name,
            tags::LOGIN_DATA => Self::LoginData,
            tags::LANGUAGE_PREFERENCES => Self::LanguagePreferences,
            tags::SEX => Self::Sex,
            tags::URL => Self::Url,
            tags::CARDHOLDER_CERTIFICATE => Self::CardholderCertificate,
            tags::PW_STATUS => Self::PwStatus,
            tags::RESETTING_CODE => Self::ResettingCode,
            other => {
                return KeySlot::ALL.into_iter().find_map(|slot| {
                    if slot.fingerprint_tag() == other {
                        Some(Self::Fingerprint(slot))
                    } else if slot.generation_time_tag() == other {
                        Some(Self::GenerationTime(slot))
                    } else {
                        None
                    }
                });
            }
        };
        Some(found)
    }

    /// Whether PUT DATA may address this object
    pub const fn is_writable(self) -> bool {
        !matches!(
            self,
            Self::ApplicationRelatedData
                | Self::CardholderRelatedData
                | Self::SecuritySupportTemplate
        )
    }

    /// Whether GET DATA may address this object
    pub const fn is_readable(self) -> bool {
        !matches!(self, Self::ResettingCode)
    }

    /// Check a value against this object's bounds
    pub fn validate(self, value: &[u8]) -> Result<()> {
        let len = value.len();
        let too_long = |max: usize| Error::InputTooLong {
            what: self.static_name(),
            len,
            max,
        };

        match self {
            Self::ApplicationRelatedData
            | Self::CardholderRelatedData
            | Self::SecuritySupportTemplate => {
                Err(Error::invalid_input(format!("{self} is read only")))
            }
            Self::Name if len > MAX_NAME_LEN => Err(too_long(MAX_NAME_LEN)),
            Self::LoginData | Self::Url if len > MAX_TEXT_LEN => Err(too_long(MAX_TEXT_LEN)),
            Self::LanguagePreferences if len > MAX_LANGUAGE_LEN => {
                Err(too_long(MAX_LANGUAGE_LEN))
            }
            Self::CardholderCertificate if len > MAX_CERTIFICATE_LEN => {
                Err(too_long(MAX_CERTIFICATE_LEN))
            }
            Self::Sex => match value {
                [byte] if Sex::from_byte(*byte).is_some() => Ok(()),
                _ => Err(Error::invalid_input(
                    "sex must be a single 0x31 or 0x32 byte",
                )),
            },
            Self::PwStatus => match value {
                [0x00 | 0x01] => Ok(()),
                _ => Err(Error::invalid_input(
                    "PW1 validity must be a single 0x00 or 0x01 byte",
                )),
            },
            Self::ResettingCode
                if len != 0 && !(MIN_RESETTING_CODE_LEN..=MAX_RESETTING_CODE_LEN).contains(&len) =>
            {
                Err(Error::invalid_input(format!(
                    "resetting code must be empty or {MIN_RESETTING_CODE_LEN} to {MAX_RESETTING_CODE_LEN} bytes, got {len}"
                )))
            }
            Self::Fingerprint(_) if len != Fingerprint::LEN => Err(Error::invalid_input(
                format!("{self} must be {} bytes, got {len}", Fingerprint::LEN),
            )),
            Self::GenerationTime(_) if len != Timestamp::LEN => Err(Error::invalid_input(
                format!("{self} must be {} bytes, got {len}", Timestamp::LEN),
            )),
            _ => Ok(()),
        }
    }

    const fn static_name(self) -> &'static str {
        match self {
            Self::ApplicationRelatedData => "application related data",
            Self::CardholderRelatedData => "cardholder related data",
            Self::SecuritySupportTemplate => "security support template",
            Self::Name => "name",
            Self::LoginData => "login data",
            Self::LanguagePreferences => "language preferences",
            Self::Sex => "sex",
            Self::Url => "URL",
            Self::CardholderCertificate => "cardholder certificate",
            Self::PwStatus => "PW status bytes",
            Self::ResettingCode => "resetting code",
            Self::Fingerprint(_) => "fingerprint",
            Self::GenerationTime(_) => "generation time",
        }
    }
}

impl FromStr for DataObject {
    type Err = Error;

    /// Parse a short name such as `name`, `url` or `fingerprint-sig`, or a hex tag
    fn from_str(s: &str) -> Result<Self> {
        let slot_suffix = |suffix: &str| match suffix {
            "sig" => Some(KeySlot::Signature),
            "dec" => Some(KeySlot::Decryption),
            "aut" => Some(KeySlot::Authentication),
            _ => None,
        };

        let named = match s {
            "name" => Some(Self::Name),
            "login" => Some(Self::LoginData),
            "lang" => Some(Self::LanguagePreferences),
            "sex" => Some(Self::Sex),
            "url" => Some(Self::Url),
            "certificate" => Some(Self::CardholderCertificate),
            "pw1-validity" => Some(Self::PwStatus),
            "resetting-code" => Some(Self::ResettingCode),
            _ => s
                .strip_prefix("fingerprint-")
                .and_then(slot_suffix)
                .map(Self::Fingerprint)
                .or_else(|| {
                    s.strip_prefix("time-")
                        .and_then(slot_suffix)
                        .map(Self::GenerationTime)
                }),
        };

        named
            .or_else(|| {
                u16::from_str_radix(s.trim_start_matches("0x"), 16)
                    .ok()
                    .and_then(Self::from_tag)
            })
            .ok_or_else(|| Error::invalid_input(format!("unknown data object {s:?}")))
    }
}
