//! Card executor implementation
//!
//! [`CardExecutor`] wraps a raw [`CardTransport`] and takes care of the two
//! ways a logical exchange spans several physical ones:
//!
//! - Command chaining: a body longer than one link is split into
//!   link-sized pieces. Every piece but the last goes out with the chaining
//!   bit set in CLA.
//! - Response continuation: while the card answers `61 XX`, the executor
//!   issues `GET RESPONSE` with Le = XX and appends what comes back.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::error::{Error, Result, ResultExt};
use crate::executor::Executor;
use crate::response::Response;
use crate::transport::CardTransport;

/// INS byte of GET RESPONSE
pub const GET_RESPONSE_INS: u8 = 0xC0;

/// Tunables for chaining and continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Body bytes carried by one link of a chain
    pub max_link_len: u8,
    /// Bits ORed into CLA on every link but the last
    pub chain_flag: u8,
    /// CLA used for GET RESPONSE
    pub get_response_cla: u8,
    /// GET RESPONSE exchanges allowed for a single command
    pub max_continuations: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_link_len: 254,
            chain_flag: 0x10,
            get_response_cla: 0x00,
            max_continuations: 64,
        }
    }
}

impl ExecutorConfig {
    /// Set the link size
    ///
    /// A zero link size is bumped to one.
    pub fn with_max_link_len(mut self, len: u8) -> Self {
        self.max_link_len = len.max(1);
        self
    }

    /// Set the chaining flag
    pub const fn with_chain_flag(mut self, flag: u8) -> Self {
        self.chain_flag = flag;
        self
    }

    /// Set the GET RESPONSE class byte
    pub const fn with_get_response_cla(mut self, cla: u8) -> Self {
        self.get_response_cla = cla;
        self
    }

    /// Set the continuation limit
    pub const fn with_max_continuations(mut self, max: usize) -> Self {
        self.max_continuations = max;
        self
    }
}

/// Card executor implementation with a transport
pub struct CardExecutor<T>
where
    T: CardTransport,
{
    /// The transport used for communication
    transport: T,
    /// Chaining and continuation settings
    config: ExecutorConfig,
}

impl<T> fmt::Debug for CardExecutor<T>
where
    T: CardTransport,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardExecutor")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> CardExecutor<T>
where
    T: CardTransport,
{
    /// Create a new card executor with the given transport
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ExecutorConfig::default())
    }

    /// Create a new card executor with explicit settings
    pub const fn with_config(transport: T, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Take ownership of the transport and return it
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Active settings
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// One physical exchange, no interpretation beyond splitting off SW1 SW2
    fn exchange_once(&mut self, raw: &[u8]) -> Result<Response> {
        let bytes = self
            .transport
            .transmit_raw(raw)
            .map_err(Into::into)?;
        Ok(Response::from_bytes(&bytes)?)
    }

    /// Send one APDU and drain any `61 XX` continuation behind it
    fn exchange(&mut self, raw: &[u8]) -> Result<Response> {
        let mut response = self.exchange_once(raw)?;
        if response.more_data().is_none() {
            return Ok(response);
        }

        let mut collected = BytesMut::new();
        let mut continuations = 0;
        while let Some(remaining) = response.more_data() {
            if continuations == self.config.max_continuations {
                warn!(
                    limit = self.config.max_continuations,
                    "Card kept returning 61xx, giving up"
                );
                return Err(Error::ChainLimitExceeded(continuations));
            }
            continuations += 1;
            collected.put_slice(response.payload());

            trace!(remaining, continuations, "Issuing GET RESPONSE");
            let get_response = Command::new_with_le(
                self.config.get_response_cla,
                GET_RESPONSE_INS,
                0x00,
                0x00,
                remaining,
            );
            response = self.exchange_once(&get_response.to_bytes()?)?;
        }

        collected.put_slice(response.payload());
        debug!(
            continuations,
            total = collected.len(),
            status = %response.status(),
            "Reassembled continued response"
        );
        Ok(Response::new(collected.freeze(), response.status()))
    }

    /// Raw bytes of an intermediate chain link
    ///
    /// The length byte is the plain link size, never a long form.
    fn chain_link(&self, command: &Command, chunk: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(5 + chunk.len());
        buf.put_u8(command.cla | self.config.chain_flag);
        buf.put_u8(command.ins);
        buf.put_u8(command.p1);
        buf.put_u8(command.p2);
        buf.put_u8(chunk.len() as u8);
        buf.put_slice(chunk);
        buf.freeze()
    }
}

impl<T> Executor for CardExecutor<T>
where
    T: CardTransport,
{
    fn do_transmit(&mut self, command: &Command) -> Result<Response> {
        let link_len = usize::from(self.config.max_link_len);
        let payload = command.payload();

        if payload.len() <= link_len {
            return self.exchange(&command.to_bytes()?);
        }

        let data = command.data.clone().unwrap_or_default();
        let links = payload.len().div_ceil(link_len);
        debug!(len = payload.len(), links, "Chaining command");

        let mut offset = 0;
        for index in 1..links {
            let chunk = &data[offset..offset + link_len];
            let link = self.chain_link(command, chunk);
            let response = self
                .exchange(&link)
                .context(format!("Chain link {index}/{links}"))?;
            if !response.is_success() {
                debug!(index, status = %response.status(), "Card refused chain link");
                return Ok(response);
            }
            offset += link_len;
        }

        let mut last = command.clone();
        last.data = Some(data.slice(offset..));
        self.exchange(&last.to_bytes()?)
    }

    fn reset(&mut self) -> Result<()> {
        self.transport
            .reset()
            .context("Failed to reset transport")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::status::StatusWord;
    use crate::transport::TransportError;
    use crate::transport::mock::MockTransport;

    fn ok_responses(n: usize) -> MockTransport {
        MockTransport::new(std::iter::repeat_n(vec![0x90, 0x00], n))
    }

    fn import(len: usize) -> Command {
        Command::new_with_data(0x00, 0xDB, 0x3F, 0xFF, vec![0x5A; len])
    }

    #[test]
    fn test_short_command_single_exchange() {
        let mut executor = CardExecutor::new(ok_responses(1));
        let response = executor.transmit(&import(254)).unwrap();
        assert!(response.is_success());

        let sent = &executor.transport().commands;
        assert_eq!(sent.len(), 1);
        assert_eq!(&sent[0][..7], &[0x00, 0xDB, 0x3F, 0xFF, 0x81, 0xFE, 0x5A]);
    }

    #[test]
    fn test_chaining_link_counts() {
        for (len, links) in [(255, 2), (508, 2), (509, 3), (1000, 4)] {
            let mut executor = CardExecutor::new(ok_responses(links));
            executor.transmit(&import(len)).unwrap();
            let sent = &executor.transport().commands;
            assert_eq!(sent.len(), links, "len {len}");

            for link in &sent[..links - 1] {
                assert_eq!(&link[..5], &[0x10, 0xDB, 0x3F, 0xFF, 0xFE]);
                assert_eq!(link.len(), 5 + 254);
            }

            let last = &sent[links - 1];
            let rest = len - 254 * (links - 1);
            assert_eq!(last[0], 0x00);
            let mut expected = vec![0x00, 0xDB, 0x3F, 0xFF];
            expected.extend(crate::length::encode_length(rest).unwrap());
            assert_eq!(&last[..expected.len()], expected.as_slice());
            assert_eq!(last.len(), expected.len() + rest);
        }
    }

    #[test]
    fn test_chain_preserves_body() {
        let body: Vec<u8> = (0..600u32).map(|i| i as u8).collect();
        let mut executor = CardExecutor::new(ok_responses(3));
        executor
            .transmit(&Command::new_with_data(0x00, 0xDB, 0x3F, 0xFF, body.clone()))
            .unwrap();

        let sent = &executor.transport().commands;
        let mut reassembled = Vec::new();
        reassembled.extend_from_slice(&sent[0][5..]);
        reassembled.extend_from_slice(&sent[1][5..]);
        // 92 bytes left: single byte length
        reassembled.extend_from_slice(&sent[2][5..]);
        assert_eq!(reassembled, body);
    }

    #[test]
    fn test_chain_aborts_on_refused_link() {
        let transport = MockTransport::from_hex(["6A80", "9000", "9000"]);
        let mut executor = CardExecutor::new(transport);
        let response = executor.transmit(&import(600)).unwrap();
        assert_eq!(response.status(), StatusWord::new(0x6A, 0x80));
        assert_eq!(executor.transport().commands.len(), 1);
    }

    #[test]
    fn test_get_response_reassembly() {
        let transport = MockTransport::from_hex(["0102 6105", "0304050607 9000"]);
        let mut executor = CardExecutor::new(transport);
        let response = executor
            .transmit(&Command::new_with_le(0x00, 0xCA, 0x00, 0x6E, 0x00))
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.payload(), &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            executor.transport().sent_hex(),
            vec!["00ca006e00".to_string(), "00c0000005".to_string()]
        );
    }

    #[test]
    fn test_get_response_keeps_final_error_status() {
        let transport = MockTransport::from_hex(["AA 6102", "BB 6A88"]);
        let mut executor = CardExecutor::new(transport);
        let response = executor
            .transmit(&Command::new_with_le(0x00, 0xCA, 0x00, 0x6E, 0x00))
            .unwrap();
        assert_eq!(response.status(), StatusWord::new(0x6A, 0x88));
        assert_eq!(response.payload(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_no_spurious_continuation() {
        let transport = MockTransport::from_hex(["6300", "9000"]);
        let mut executor = CardExecutor::new(transport);
        let response = executor
            .transmit(&Command::new_with_data(0x00, 0x20, 0x00, 0x81, &b"123456"[..]))
            .unwrap();
        assert_eq!(response.status(), StatusWord::new(0x63, 0x00));
        assert_eq!(executor.transport().commands.len(), 1);
    }

    #[test]
    fn test_continuation_limit() {
        let transport = MockTransport::from_hex(["6101", "00 6101", "00 6101", "00 6101"]);
        let config = ExecutorConfig::default().with_max_continuations(2);
        let mut executor = CardExecutor::with_config(transport, config);
        let err = executor
            .transmit(&Command::new_with_le(0x00, 0xCA, 0x00, 0x6E, 0x00))
            .unwrap_err();
        assert_eq!(err, Error::ChainLimitExceeded(2));
        assert_eq!(executor.transport().commands.len(), 3);
    }

    #[test]
    fn test_transport_fault_is_fatal() {
        let mut transport = MockTransport::default();
        transport.connected = true;
        transport.push_response(vec![0x90, 0x00]);
        transport.push_error(TransportError::Disconnected);
        let mut executor = CardExecutor::new(transport);

        let err = executor.transmit(&import(600)).unwrap_err();
        assert!(err.is_transport_fault());
        assert_eq!(executor.transport().commands.len(), 2);

        // Link is down, nothing retried behind the caller's back
        let err = executor.transmit(&import(10)).unwrap_err();
        assert_eq!(err, Error::Transport(TransportError::Connection));
    }

    #[test]
    fn test_truncated_response_is_transport_fault() {
        let transport = MockTransport::from_hex(["90"]);
        let mut executor = CardExecutor::new(transport);
        let err = executor
            .transmit(&Command::new(0x00, 0x44, 0x00, 0x00))
            .unwrap_err();
        assert!(err.is_transport_fault());
    }

    #[test]
    fn test_custom_link_size() {
        let config = ExecutorConfig::default().with_max_link_len(16);
        let mut executor = CardExecutor::with_config(ok_responses(3), config);
        executor.transmit(&import(40)).unwrap();
        let sent = &executor.transport().commands;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0][4], 16);
        assert_eq!(sent[2][4], 8);
    }
}
