//! Utility functions and types for the CLI

pub mod display;
pub mod session;

use std::error::Error;

use clap::Args;
use zeroize::Zeroizing;

/// Admin password for commands that need a prior PW3 VERIFY
#[derive(Args, Debug, Clone)]
pub struct AdminArgs {
    /// Admin PIN (PW3)
    #[arg(long, env = "PGPCARD_ADMIN_PIN", hide_env_values = true)]
    pub admin_pin: String,
}

impl AdminArgs {
    /// PW3 bytes, wiped on drop
    pub fn pin(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.admin_pin.as_bytes().to_vec())
    }
}

/// User password for commands that need a prior PW1 VERIFY
#[derive(Args, Debug, Clone)]
pub struct UserArgs {
    /// User PIN (PW1)
    #[arg(long, env = "PGPCARD_PIN", hide_env_values = true)]
    pub pin: String,
}

impl UserArgs {
    /// PW1 bytes, wiped on drop
    pub fn pin(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.pin.as_bytes().to_vec())
    }
}

/// Decode a hex argument, tolerating spaces and a `0x` prefix
pub fn parse_hex(input: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    Ok(hex::decode(cleaned)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(parse_hex("DE AD be ef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(parse_hex("xyz").is_err());
    }
}
