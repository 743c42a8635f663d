//! Host side of the OpenPGP card application
//!
//! Builds on [`pgpcard_apdu_core`] for framing and chaining, and adds the
//! OpenPGP command set, typed data objects decoded through fixed layouts,
//! and RSA private key import.

mod application;
mod clock;
pub mod commands;
pub mod constants;
pub mod data_object;
mod error;
pub mod key_import;
mod key_material;
mod key_slot;
pub mod tlv;
pub mod types;

pub use application::{GeneratedKey, ImportedKey, OpenPgpCard};
pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{Password, PinReference, ResetMode};
pub use data_object::DataObject;
pub use error::{CardError, Error, MetadataStep, Result};
pub use key_import::{KeyImportError, encode_key_import};
pub use key_material::{KeyMaterialError, KeyMaterialProvider, PemKeyFile, RsaKeyMaterial, parse_pem};
pub use key_slot::{KeySlot, SlotTags};
pub use types::{
    ApplicationRelatedData, CardholderRelatedData, Fingerprint, PublicKey, PwStatus, Sex,
    Timestamp,
};
