//! Commands for password management

use std::error::Error;

use pgpcard_openpgp::{CardError, Password, PinReference, ResetMode};

use crate::utils::display;
use crate::utils::session::Card;

/// VERIFY a password and report the tries left on failure
pub fn verify_command(
    card: &mut Card,
    reference: PinReference,
    pin: &[u8],
) -> Result<(), Box<dyn Error>> {
    match card.verify(reference, pin) {
        Ok(()) => {
            println!("{}", display::success(&format!("{reference} verified")));
            Ok(())
        }
        Err(err) if err.card_error() == Some(CardError::Blocked) => {
            println!(
                "{}",
                display::warning(&format!("{reference} is blocked, reset its retry counter"))
            );
            Err(err.into())
        }
        Err(err) => {
            if let Some(tries) = err
                .card_error()
                .and_then(|card_error| card_error.status().retries_left())
            {
                println!(
                    "{}",
                    display::warning(&format!("Wrong {reference}, {tries} tries left"))
                );
            }
            Err(err.into())
        }
    }
}

/// Change PW1 or PW3
pub fn change_pin_command(
    card: &mut Card,
    password: Password,
    old: &[u8],
    new: &[u8],
) -> Result<(), Box<dyn Error>> {
    card.change_pin(password, old, new)?;
    println!("{}", display::success(&format!("{password} changed")));
    Ok(())
}

/// Unblock PW1
pub fn reset_retry_counter_command(
    card: &mut Card,
    resetting_code: Option<&[u8]>,
    admin_pin: Option<&[u8]>,
    new_pin: &[u8],
) -> Result<(), Box<dyn Error>> {
    let mode = match (resetting_code, admin_pin) {
        (Some(code), _) => ResetMode::ResettingCode(code),
        (None, Some(pin)) => {
            card.verify(PinReference::Pw3, pin)?;
            ResetMode::Admin
        }
        (None, None) => return Err("either a resetting code or the admin PIN is required".into()),
    };
    card.reset_retry_counter(mode, new_pin)?;
    println!("{}", display::success("PW1 unblocked"));
    Ok(())
}
