//! Command APDU builders for the OpenPGP application
//!
//! Builders only shape bytes. Input bounds that the card would otherwise
//! reject are checked here, so a bad argument never costs an exchange.
//! Splitting long bodies into chained APDUs is left to the executor.

pub mod data;
pub use data::*;
pub mod key;
pub use key::*;
pub mod lifecycle;
pub use lifecycle::*;
pub mod pin;
pub use pin::*;
pub mod pso;
pub use pso::*;

/// Split a two byte tag into P1/P2
pub(crate) const fn tag_params(tag: u16) -> (u8, u8) {
    let [p1, p2] = tag.to_be_bytes();
    (p1, p2)
}
