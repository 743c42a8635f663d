//! Card session setup

use std::net::SocketAddr;
use std::time::Duration;

use pgpcard_apdu_core::CardExecutor;
use pgpcard_openpgp::OpenPgpCard;
use pgpcard_transport_relay::{RelayConfig, RelayError, RelayTransport};
use tracing::info;

/// Card handle used by every command
pub type Card = OpenPgpCard<CardExecutor<RelayTransport>>;

/// Bind the relay listener and wrap it in an OpenPGP card handle
pub fn open_card(bind: SocketAddr, timeout: Option<Duration>) -> Result<Card, RelayError> {
    let config = RelayConfig::new()
        .with_bind(bind)
        .with_read_timeout(timeout)
        .with_write_timeout(timeout);
    let transport = RelayTransport::bind(config)?;
    info!("Waiting for the card bridge on {}", transport.local_addr());
    Ok(OpenPgpCard::new(CardExecutor::new(transport)))
}
