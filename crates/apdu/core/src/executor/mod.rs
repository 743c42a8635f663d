//! Executor for APDU command execution
//!
//! An executor takes a whole [`Command`] and returns a whole [`Response`]:
//! whatever splitting or reassembly the link needs happens underneath.

use std::fmt;

use tracing::{debug, instrument, trace};

use crate::command::Command;
use crate::response::Response;
use crate::Result;

/// Trait for APDU command execution
pub trait Executor: Send + fmt::Debug {
    /// Transmit an APDU command
    ///
    /// The returned response carries the card's final status word and the
    /// concatenation of every payload segment the card produced.
    #[instrument(
        level = "trace",
        skip(self, command),
        fields(executor = std::any::type_name::<Self>(), ins = format_args!("{:#04x}", command.ins))
    )]
    fn transmit(&mut self, command: &Command) -> Result<Response> {
        trace!(?command, "Transmitting command");
        let response = self.do_transmit(command);
        match &response {
            Ok(response) => {
                trace!(
                    status = %response.status(),
                    len = response.payload().len(),
                    "Received response"
                );
            }
            Err(err) => {
                debug!(error = ?err, "Error during transmission");
            }
        }
        response
    }

    /// Internal implementation of transmit
    fn do_transmit(&mut self, command: &Command) -> Result<Response>;

    /// Reset the executor, including the transport
    fn reset(&mut self) -> Result<()>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn transmit(&mut self, command: &Command) -> Result<Response> {
        (**self).transmit(command)
    }

    fn do_transmit(&mut self, command: &Command) -> Result<Response> {
        (**self).do_transmit(command)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}
