//! Status words
//!
//! SW1 SW2 close every response. Only `90 00` is plain success; `61 XX` is
//! swallowed by the executor and never reaches application code.

use std::fmt;

use tracing::Level;

/// Status Word (SW1-SW2) from an APDU response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Build from `SW1 << 8 | SW2`
    pub const fn from_u16(status: u16) -> Self {
        let [sw1, sw2] = status.to_be_bytes();
        Self { sw1, sw2 }
    }

    /// `SW1 << 8 | SW2`
    pub const fn to_u16(&self) -> u16 {
        u16::from_be_bytes([self.sw1, self.sw2])
    }

    /// `90 00`
    pub const fn is_success(&self) -> bool {
        matches!((self.sw1, self.sw2), (0x90, 0x00))
    }

    /// `61 XX`, the card holds more response bytes
    pub const fn is_more_data_available(&self) -> bool {
        self.sw1 == 0x61
    }

    /// XX of a `61 XX` status
    ///
    /// `Some(0)` means the card did not say how much is left.
    pub const fn remaining_bytes(&self) -> Option<u8> {
        match self.sw1 {
            0x61 => Some(self.sw2),
            _ => None,
        }
    }

    /// Tries left after a failed VERIFY (`63 CX`)
    pub const fn retries_left(&self) -> Option<u8> {
        match (self.sw1, self.sw2 & 0xF0) {
            (0x63, 0xC0) => Some(self.sw2 & 0x0F),
            _ => None,
        }
    }

    /// `6A 88`: no such key or data object
    pub const fn is_referenced_data_not_found(&self) -> bool {
        matches!((self.sw1, self.sw2), (0x6A, 0x88))
    }

    /// `69 83`: retry counter exhausted
    pub const fn is_authentication_blocked(&self) -> bool {
        matches!((self.sw1, self.sw2), (0x69, 0x83))
    }

    /// `69 85`: conditions of use not satisfied, also what a terminated card answers
    pub const fn is_conditions_not_satisfied(&self) -> bool {
        matches!((self.sw1, self.sw2), (0x69, 0x85))
    }

    /// Level card answers with this status should be logged at
    pub const fn tracing_level(&self) -> Level {
        match self.sw1 {
            0x90 | 0x61 => Level::DEBUG,
            0x62 | 0x63 => Level::INFO,
            _ => Level::WARN,
        }
    }

    /// Human readable meaning, as far as an OpenPGP card uses it
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "Success",
            (0x61, _) => "More data available",
            (0x62, 0x85) => "Selected file in termination state",
            (0x63, n) if (n & 0xF0) == 0xC0 => "Verification failed",
            (0x64, _) => "Execution error, memory unchanged",
            (0x65, 0x81) => "Memory failure",
            (0x67, 0x00) => "Wrong length",
            (0x68, 0x83) => "Last command of the chain expected",
            (0x68, 0x84) => "Command chaining not supported",
            (0x69, 0x82) => "Security status not satisfied",
            (0x69, 0x83) => "Authentication method blocked",
            (0x69, 0x85) => "Conditions of use not satisfied",
            (0x6A, 0x80) => "Incorrect parameters in the data field",
            (0x6A, 0x82) => "File or application not found",
            (0x6A, 0x88) => "Referenced data not found",
            (0x6B, 0x00) => "Wrong parameters P1-P2",
            (0x6D, 0x00) => "Instruction not supported",
            (0x6E, 0x00) => "Class not supported",
            _ => "Unknown status word",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from((sw1, sw2): (u8, u8)) -> Self {
        Self::new(sw1, sw2)
    }
}

impl From<u16> for StatusWord {
    fn from(status: u16) -> Self {
        Self::from_u16(status)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X}", self.sw1, self.sw2)
    }
}

/// Status words the OpenPGP application branches on
pub mod common {
    use super::StatusWord;

    /// `90 00`
    pub const SUCCESS: StatusWord = StatusWord::new(0x90, 0x00);

    /// `69 83`
    pub const AUTHENTICATION_BLOCKED: StatusWord = StatusWord::new(0x69, 0x83);

    /// `69 85`
    pub const CONDITIONS_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x85);

    /// `6A 88`
    pub const REFERENCED_DATA_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x88);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_word_u16() {
        let sw = StatusWord::from_u16(0x6A88);
        assert_eq!((sw.sw1, sw.sw2), (0x6A, 0x88));
        assert_eq!(sw.to_u16(), 0x6A88);
        assert_eq!(u16::from(common::SUCCESS), 0x9000);
    }

    #[test]
    fn test_status_word_classes() {
        assert!(common::SUCCESS.is_success());
        assert!(StatusWord::new(0x61, 0x10).is_more_data_available());
        assert!(common::AUTHENTICATION_BLOCKED.is_authentication_blocked());
        assert!(common::CONDITIONS_NOT_SATISFIED.is_conditions_not_satisfied());
        assert!(common::REFERENCED_DATA_NOT_FOUND.is_referenced_data_not_found());
        assert!(!StatusWord::new(0x6A, 0x82).is_referenced_data_not_found());
    }

    #[test]
    fn test_remaining_and_retries() {
        assert_eq!(StatusWord::new(0x61, 0x15).remaining_bytes(), Some(0x15));
        assert_eq!(StatusWord::new(0x61, 0x00).remaining_bytes(), Some(0));
        assert_eq!(common::SUCCESS.remaining_bytes(), None);

        assert_eq!(StatusWord::new(0x63, 0xC2).retries_left(), Some(2));
        assert_eq!(StatusWord::new(0x63, 0x00).retries_left(), None);
    }

    #[test]
    fn test_levels_and_text() {
        assert_eq!(StatusWord::new(0x61, 0x05).tracing_level(), Level::DEBUG);
        assert_eq!(StatusWord::new(0x63, 0xC1).tracing_level(), Level::INFO);
        assert_eq!(common::AUTHENTICATION_BLOCKED.tracing_level(), Level::WARN);

        assert_eq!(StatusWord::new(0x63, 0xC1).description(), "Verification failed");
        assert_eq!(common::REFERENCED_DATA_NOT_FOUND.description(), "Referenced data not found");
        assert_eq!(common::REFERENCED_DATA_NOT_FOUND.to_string(), "6A 88");
    }
}
