//! APDU response definitions
//!
//! A response is whatever payload the card returned followed by the two
//! status bytes SW1 SW2.

pub mod error;
pub mod status;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use error::ResponseError;
use status::StatusWord;

/// Basic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data, empty when the card returned none
    payload: Bytes,
    /// Status word
    status: StatusWord,
}

impl Response {
    /// Create a new response with payload and status
    pub fn new(payload: impl Into<Bytes>, status: impl Into<StatusWord>) -> Self {
        Self {
            payload: payload.into(),
            status: status.into(),
        }
    }

    /// Create a success response
    pub fn success(payload: impl Into<Bytes>) -> Self {
        Self::new(payload, status::common::SUCCESS)
    }

    /// Create an empty response carrying only a status word
    pub fn status_only(status: impl Into<StatusWord>) -> Self {
        Self::new(Bytes::new(), status)
    }

    /// Parse response from raw bytes (including status word)
    pub fn from_bytes(data: &Bytes) -> Result<Self, ResponseError> {
        let Some((payload, &[sw1, sw2])) = data.split_last_chunk::<2>() else {
            return Err(ResponseError::Incomplete(data.len()));
        };
        let status = StatusWord::new(sw1, sw2);

        trace!(%status, payload_len = payload.len(), "Parsed APDU response");

        let payload = data.slice(..payload.len());
        Ok(Self { payload, status })
    }

    /// Response payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take the payload out of the response
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Check if the response indicates success
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Bytes still waiting on the card when SW1 = 61
    pub const fn more_data(&self) -> Option<u8> {
        self.status.remaining_bytes()
    }

    /// Serialize back into `payload || SW1 SW2`
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.payload.len() + 2);
        buf.put_slice(&self.payload);
        buf.put_u8(self.status.sw1);
        buf.put_u8(self.status.sw2);
        buf.freeze()
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        response.to_bytes()
    }
}
