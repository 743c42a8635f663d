//! APDU command definitions
//!
//! A command is the fixed four byte header (CLA, INS, P1, P2), an optional
//! body prefixed with a self-describing length field, and an optional
//! one byte Le.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;
use crate::length::{self, LengthError, MAX_LENGTH};

/// Generic APDU command structure
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<u8>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("cla", &format_args!("{:#04x}", self.cla))
            .field("ins", &format_args!("{:#04x}", self.ins))
            .field("p1", &format_args!("{:#04x}", self.p1))
            .field("p2", &format_args!("{:#04x}", self.p2))
            .field("data_len", &self.data.as_ref().map_or(0, Bytes::len))
            .field("le", &self.le)
            .finish()
    }
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self::new(cla, ins, p1, p2).with_data(data)
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Header bytes `[CLA, INS, P1, P2]`
    pub const fn header(&self) -> [u8; 4] {
        [self.cla, self.ins, self.p1, self.p2]
    }

    /// Command payload, empty when absent
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        let body = self
            .data
            .as_ref()
            .map_or(0, |data| length::encoded_len(data.len()) + data.len());
        4 + body + usize::from(self.le.is_some())
    }

    /// Serialize the command
    ///
    /// The body length is written with [`length::encode_length`], so bodies of
    /// 128 bytes or more carry the `81`/`82` long forms. Splitting oversized
    /// bodies across several APDUs is the executor's job, not the builder's.
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        if let Some(data) = &self.data {
            if data.len() > MAX_LENGTH {
                return Err(LengthError::TooLong(data.len()).into());
            }
        }

        let mut buffer = BytesMut::with_capacity(self.command_length());
        buffer.put_slice(&self.header());

        if let Some(data) = &self.data {
            length::put_length(&mut buffer, data.len())?;
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        Ok(buffer.freeze())
    }

    /// Parse a command from raw bytes
    ///
    /// The inverse of [`Command::to_bytes`]: a single trailing byte is Le,
    /// otherwise a length field, exactly that many body bytes and an optional
    /// Le follow the header.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let Some((header, rest)) = data.split_first_chunk::<4>() else {
            return Err(Error::InvalidCommandLength(data.len()));
        };
        let [cla, ins, p1, p2] = *header;
        let mut command = Self::new(cla, ins, p1, p2);

        match rest {
            [] => {}
            [le] => command.le = Some(*le),
            _ => {
                let (lc, consumed) = length::decode_length(rest)?;
                let body = &rest[consumed..];
                match body.len().checked_sub(lc) {
                    Some(0) => {}
                    Some(1) => command.le = Some(body[lc]),
                    _ => return Err(Error::InvalidCommandLength(data.len())),
                }
                command.data = Some(Bytes::copy_from_slice(&body[..lc]));
            }
        }

        Ok(command)
    }
}
