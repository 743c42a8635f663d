//! Commands for card information and lifecycle

use std::error::Error;

use pgpcard_openpgp::{CardError, DataObject};
use tracing::{debug, warn};

use crate::utils::display;
use crate::utils::session::Card;

/// Show application and cardholder data
pub fn info_command(card: &mut Card) -> Result<(), Box<dyn Error>> {
    let ard = match card.application_related_data() {
        Err(err) if err.card_error() == Some(CardError::ConditionsNotSatisfied) => {
            println!(
                "{}",
                display::warning("The application is terminated, run `activate` to reset it")
            );
            return Ok(());
        }
        other => other?,
    };
    println!("{}", display::section_title("Application"));
    println!("{ard}");

    let crd = card.cardholder_related_data()?;
    println!("{}", display::section_title("Cardholder"));
    println!("{crd}");

    let mut items = Vec::new();
    for (label, object) in [("Login data", DataObject::LoginData), ("URL", DataObject::Url)] {
        match card.get_data(object) {
            Ok(value) => items.push((label, String::from_utf8_lossy(&value).into_owned())),
            Err(err) if err.card_error().is_some() => debug!("{object} unavailable: {err}"),
            Err(err) => return Err(err.into()),
        }
    }
    items.push(("Signatures made", card.signature_counter()?.to_string()));
    println!("\n{}", display::key_value_box("Other data", &items));

    Ok(())
}

/// Show the PW status bytes
pub fn pw_status_command(card: &mut Card) -> Result<(), Box<dyn Error>> {
    let status = card.pw_status()?;
    println!("{status}");
    Ok(())
}

/// Show the vendor version bytes
pub fn version_command(card: &mut Card) -> Result<(), Box<dyn Error>> {
    let version = card.version()?;
    println!("Version: {}", hex::encode_upper(&version));
    Ok(())
}

/// Print random bytes from the card
pub fn challenge_command(card: &mut Card, len: usize) -> Result<(), Box<dyn Error>> {
    let challenge = card.challenge(len)?;
    println!("{}", display::hex_block(&challenge));
    Ok(())
}

/// Terminate the application
pub fn terminate_command(card: &mut Card, admin_pin: Option<&[u8]>) -> Result<(), Box<dyn Error>> {
    if let Some(pin) = admin_pin {
        card.verify(pgpcard_openpgp::PinReference::Pw3, pin)?;
    }
    card.terminate()?;
    warn!("The card stays unusable until `activate`");
    println!("{}", display::success("Application terminated"));
    Ok(())
}

/// Activate a terminated application
pub fn activate_command(card: &mut Card) -> Result<(), Box<dyn Error>> {
    card.activate()?;
    println!("{}", display::success("Application activated and reset"));
    Ok(())
}

/// Set the retry counters
pub fn set_retries_command(
    card: &mut Card,
    admin_pin: &[u8],
    pw1: u8,
    rc: u8,
    pw3: u8,
) -> Result<(), Box<dyn Error>> {
    card.verify(pgpcard_openpgp::PinReference::Pw3, admin_pin)?;
    card.set_pin_retries(pw1, rc, pw3)?;
    println!("{}", display::success("Retry counters updated"));
    Ok(())
}
