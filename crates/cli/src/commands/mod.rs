//! Subcommand handlers

mod card_operations;
mod credentials;
mod data_management;
mod key_operations;

pub use card_operations::*;
pub use credentials::*;
pub use data_management::*;
pub use key_operations::*;
