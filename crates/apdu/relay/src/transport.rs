//! Relay transport implementation

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use pgpcard_apdu_core::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;

type Reply = std::result::Result<Bytes, RelayError>;

/// Transport that relays APDUs to a bridge dialling in over TCP
pub struct RelayTransport {
    /// Address the listener actually bound to
    local_addr: SocketAddr,
    /// Hands a command to the worker; dropped to stop it
    requests: Option<Sender<Bytes>>,
    /// Receives the worker's answer
    responses: Receiver<Reply>,
    /// Worker thread owning the listener
    worker: Option<JoinHandle<()>>,
    /// Configuration
    config: RelayConfig,
}

impl fmt::Debug for RelayTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayTransport")
            .field("local_addr", &self.local_addr)
            .field("running", &self.is_running())
            .field("config", &self.config)
            .finish()
    }
}

impl RelayTransport {
    /// Bind the listener and start the worker
    pub fn bind(config: RelayConfig) -> std::result::Result<Self, RelayError> {
        let listener = TcpListener::bind(config.bind).map_err(|source| RelayError::Bind {
            addr: config.bind,
            source,
        })?;
        let local_addr = listener.local_addr()?;

        let (request_tx, request_rx) = bounded::<Bytes>(1);
        let (response_tx, response_rx) = bounded::<Reply>(1);

        let worker_config = config.clone();
        let worker = thread::Builder::new()
            .name("pgpcard-relay".into())
            .spawn(move || run_worker(&listener, &worker_config, &request_rx, &response_tx))
            .map_err(RelayError::Spawn)?;

        info!(%local_addr, "Relay listening for the card bridge");

        Ok(Self {
            local_addr,
            requests: Some(request_tx),
            responses: response_rx,
            worker: Some(worker),
            config,
        })
    }

    /// Address the listener is bound to
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Configuration
    pub const fn config(&self) -> &RelayConfig {
        &self.config
    }

    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }
}

impl CardTransport for RelayTransport {
    type Error = RelayError;

    fn do_transmit_raw(&mut self, command: &[u8]) -> std::result::Result<Bytes, Self::Error> {
        let requests = self.requests.as_ref().ok_or(RelayError::WorkerStopped)?;
        requests
            .send(Bytes::copy_from_slice(command))
            .map_err(|_| RelayError::WorkerStopped)?;
        self.responses
            .recv()
            .map_err(|_| RelayError::WorkerStopped)?
    }

    fn is_connected(&self) -> bool {
        self.requests.is_some() && self.is_running()
    }

    fn reset(&mut self) -> std::result::Result<(), Self::Error> {
        // Each exchange is its own connection, so there is nothing to reset
        // unless the worker has died.
        if self.is_connected() {
            Ok(())
        } else {
            Err(RelayError::WorkerStopped)
        }
    }
}

impl Drop for RelayTransport {
    fn drop(&mut self) {
        // Closing the request channel ends the worker's receive loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Relay worker panicked");
            }
        }
    }
}

fn run_worker(
    listener: &TcpListener,
    config: &RelayConfig,
    requests: &Receiver<Bytes>,
    responses: &Sender<Reply>,
) {
    for command in requests {
        let reply = relay_once(listener, config, &command);
        if let Err(err) = &reply {
            debug!(error = %err, "Relay exchange failed");
        }
        if responses.send(reply).is_err() {
            break;
        }
    }
    debug!("Relay worker exiting");
}

/// Accept one bridge connection and run one exchange over it
fn relay_once(listener: &TcpListener, config: &RelayConfig, command: &[u8]) -> Reply {
    let (mut stream, peer) = listener.accept()?;
    trace!(%peer, "Bridge connected");

    stream.set_read_timeout(config.read_timeout)?;
    stream.set_write_timeout(config.write_timeout)?;
    stream.set_nodelay(true)?;

    stream.write_all(command)?;

    // The bridge hangs up after answering, so read until EOF or a full buffer
    let mut buffer = vec![0u8; config.max_response_len];
    let mut filled = 0;
    while filled < buffer.len() {
        match stream.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err.into()),
        }
    }
    if filled == 0 {
        return Err(RelayError::HungUp);
    }
    buffer.truncate(filled);
    trace!(len = filled, "Bridge answered");
    Ok(Bytes::from(buffer))
}
