//! Error types specific to APDU responses

/// Error for APDU response processing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// Fewer than two bytes, so there is no status word
    #[error("Incomplete response: {0} bytes")]
    Incomplete(usize),
}
