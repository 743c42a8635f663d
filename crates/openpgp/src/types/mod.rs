//! Typed views of the card's data objects

mod application_data;
mod cardholder;
mod fingerprint;
mod public_key;
mod pw_status;
mod timestamp;

pub use application_data::{ARD_LAYOUT, ApplicationRelatedData, ArdField};
pub use cardholder::{
    CRD_LAYOUT, CardholderRelatedData, CrdField, SECURITY_SUPPORT_LAYOUT, SecuritySupportField,
    Sex, signature_counter,
};
pub use fingerprint::Fingerprint;
pub use public_key::PublicKey;
pub use pw_status::PwStatus;
pub use timestamp::Timestamp;

#[cfg(test)]
pub(crate) use application_data::tests::sample_ard;
#[cfg(test)]
pub(crate) use public_key::tests::sample_template;
