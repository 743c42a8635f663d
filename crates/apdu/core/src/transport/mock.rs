//! Scripted transport for tests

use std::collections::VecDeque;

use bytes::Bytes;

use super::{CardTransport, TransportError};

/// Transport that replays a fixed script of responses and records every command
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Responses to return, in order
    pub responses: VecDeque<Result<Bytes, TransportError>>,
    /// Commands that were sent
    pub commands: Vec<Bytes>,
    /// Whether the transport is connected
    pub connected: bool,
}

impl MockTransport {
    /// Create a new mock transport with the given raw responses
    pub fn new<I, B>(responses: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            responses: responses.into_iter().map(|r| Ok(r.into())).collect(),
            commands: Vec::new(),
            connected: true,
        }
    }

    /// Create a new mock transport from hex-encoded responses
    ///
    /// # Panics
    /// Panics on malformed hex; this is test scaffolding.
    pub fn from_hex<'a>(responses: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            responses
                .into_iter()
                .map(|r| hex::decode(r.replace(' ', "")).expect("valid hex in mock script")),
        )
    }

    /// Queue another response
    pub fn push_response(&mut self, response: impl Into<Bytes>) -> &mut Self {
        self.responses.push_back(Ok(response.into()));
        self
    }

    /// Queue a transport failure
    pub fn push_error(&mut self, error: TransportError) -> &mut Self {
        self.responses.push_back(Err(error));
        self
    }

    /// Commands sent so far, hex-encoded
    pub fn sent_hex(&self) -> Vec<String> {
        self.commands.iter().map(hex::encode).collect()
    }
}

impl CardTransport for MockTransport {
    type Error = TransportError;

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Self::Error> {
        if !self.connected {
            return Err(TransportError::Connection);
        }

        self.commands.push(Bytes::copy_from_slice(command));

        match self.responses.pop_front() {
            Some(Err(err)) => {
                self.connected = false;
                Err(err)
            }
            Some(Ok(response)) => Ok(response),
            None => Err(TransportError::Transmission),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.connected = true;
        self.commands.clear();
        Ok(())
    }
}
