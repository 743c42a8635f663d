//! Commands for reading and writing data objects

use std::error::Error;
use std::path::Path;

use pgpcard_openpgp::{DataObject, PinReference};

use crate::utils::display;
use crate::utils::session::Card;

/// Write a data object after a PW3 VERIFY
pub fn put_command(
    card: &mut Card,
    admin_pin: &[u8],
    object: DataObject,
    value: &[u8],
) -> Result<(), Box<dyn Error>> {
    // Checked before VERIFY so a bad value costs no PW3 try
    object.validate(value)?;
    card.verify(PinReference::Pw3, admin_pin)?;
    card.put_data(object, value)?;
    println!("{}", display::success(&format!("{object} written")));
    Ok(())
}

/// Read the cardholder certificate, printing it or saving it to `output`
pub fn certificate_command(card: &mut Card, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let certificate = card.certificate()?;
    if certificate.is_empty() {
        println!("{}", display::warning("No cardholder certificate stored"));
        return Ok(());
    }

    match output {
        Some(path) => {
            std::fs::write(path, &certificate)?;
            println!(
                "{}",
                display::success(&format!(
                    "{} byte certificate saved to {}",
                    certificate.len(),
                    path.display()
                ))
            );
        }
        None => println!("{}", display::hex_block(&certificate)),
    }
    Ok(())
}
