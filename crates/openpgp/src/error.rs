use derive_more::Display;
use pgpcard_apdu_core::StatusWord;
use pgpcard_apdu_core::response::status::common;

use crate::key_import::KeyImportError;
use crate::key_material::KeyMaterialError;
use crate::tlv::DecodeError;

/// Result type for OpenPGP card operations
pub type Result<T> = std::result::Result<T, Error>;

/// Terminal status word other than success, as a typed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    /// Referenced key or data object not found (6A 88)
    #[error("Referenced key or data object not found")]
    NotFound,

    /// Retry counter exhausted (69 83)
    #[error("Operation blocked: retry counter exhausted")]
    Blocked,

    /// Conditions of use not satisfied (69 85), also how a terminated card answers
    #[error("Conditions of use not satisfied")]
    ConditionsNotSatisfied,

    /// Any other card-reported failure
    #[error("Card returned {0}: {desc}", desc = .0.description())]
    Failed(StatusWord),
}

impl CardError {
    /// Classify a status word, `None` for success
    pub const fn from_status(status: StatusWord) -> Option<Self> {
        if status.is_success() {
            None
        } else if status.is_referenced_data_not_found() {
            Some(Self::NotFound)
        } else if status.is_authentication_blocked() {
            Some(Self::Blocked)
        } else if status.is_conditions_not_satisfied() {
            Some(Self::ConditionsNotSatisfied)
        } else {
            Some(Self::Failed(status))
        }
    }

    /// The status word behind this error
    pub const fn status(&self) -> StatusWord {
        match self {
            Self::NotFound => common::REFERENCED_DATA_NOT_FOUND,
            Self::Blocked => common::AUTHENTICATION_BLOCKED,
            Self::ConditionsNotSatisfied => common::CONDITIONS_NOT_SATISFIED,
            Self::Failed(status) => *status,
        }
    }
}

/// Step of a composite operation that runs after the key is on the card
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStep {
    /// Reading back the generated public key
    #[display("public key parsing")]
    PublicKey,
    /// Writing the fingerprint data object
    #[display("fingerprint upload")]
    Fingerprint,
    /// Writing the generation time data object
    #[display("generation time upload")]
    GenerationTime,
}

/// Error type for OpenPGP card operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// APDU layer errors, transport faults included
    #[error(transparent)]
    Apdu(#[from] pgpcard_apdu_core::Error),

    /// Card-reported failure
    #[error(transparent)]
    Card(#[from] CardError),

    /// Malformed response data
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Key material could not be loaded
    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),

    /// Key material could not be encoded for import
    #[error(transparent)]
    KeyImport(#[from] KeyImportError),

    /// Input longer than the card accepts, rejected before any exchange
    #[error("{what} is {len} bytes, at most {max} allowed")]
    InputTooLong {
        /// What was being sent
        what: &'static str,
        /// Actual length
        len: usize,
        /// Largest accepted length
        max: usize,
    },

    /// Input the card would not accept, rejected before any exchange
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The key is on the card but its metadata is not
    #[error("Key material written, but {step} failed: {source}")]
    PartialCompletion {
        /// Step that failed
        step: MetadataStep,
        /// Why it failed
        source: Box<Self>,
    },
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Card-reported failure behind this error, if any
    pub fn card_error(&self) -> Option<CardError> {
        match self {
            Self::Card(err) => Some(*err),
            Self::PartialCompletion { source, .. } => source.card_error(),
            _ => None,
        }
    }

    /// Whether the link to the card is gone
    pub fn is_transport_fault(&self) -> bool {
        match self {
            Self::Apdu(err) => err.is_transport_fault(),
            Self::PartialCompletion { source, .. } => source.is_transport_fault(),
            _ => false,
        }
    }

    /// Whether the card reported partial completion of a composite operation
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::PartialCompletion { .. })
    }
}

impl From<pgpcard_apdu_core::TransportError> for Error {
    fn from(err: pgpcard_apdu_core::TransportError) -> Self {
        Self::Apdu(err.into())
    }
}
