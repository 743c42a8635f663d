//! Commands for key management and private key operations

use std::error::Error;
use std::path::Path;

use pgpcard_openpgp::{Error as OpenPgpError, KeySlot, PemKeyFile, PinReference};
use tracing::info;

use crate::utils::display;
use crate::utils::session::Card;

/// Print what is on the card after a partial key operation
fn report_partial(err: &OpenPgpError, slot: KeySlot) {
    if err.is_partial() {
        println!(
            "{}",
            display::warning(&format!(
                "The {slot} key is on the card but its metadata is not: {err}"
            ))
        );
    }
}

/// Generate a key pair after a PW3 VERIFY
pub fn generate_key_command(
    card: &mut Card,
    admin_pin: &[u8],
    slot: KeySlot,
) -> Result<(), Box<dyn Error>> {
    card.verify(PinReference::Pw3, admin_pin)?;
    info!("Generating {slot} key, this can take a while");

    let key = card.generate_key(slot).inspect_err(|err| report_partial(err, slot))?;
    println!("{}", display::success(&format!("{slot} key generated")));
    println!(
        "{}",
        display::key_value_box(
            "Key",
            &[
                ("Fingerprint", key.fingerprint.to_string()),
                ("Created", key.generation_time.to_string()),
            ],
        )
    );
    println!("{}", key.public_key);
    Ok(())
}

/// Show the public key of a slot
pub fn public_key_command(card: &mut Card, slot: KeySlot) -> Result<(), Box<dyn Error>> {
    let key = card.public_key(slot)?;
    println!("{}", display::section_title("Public key"));
    println!("{key}");
    println!("Fingerprint: {}", key.fingerprint());
    Ok(())
}

/// Import an RSA key from a PEM file after a PW3 VERIFY
pub fn import_key_command(
    card: &mut Card,
    admin_pin: &[u8],
    slot: KeySlot,
    path: &Path,
    passphrase: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let provider = PemKeyFile::new(path);
    card.verify(PinReference::Pw3, admin_pin)?;

    let imported = card
        .import_key(slot, &provider, passphrase)
        .inspect_err(|err| report_partial(err, slot))?;
    println!("{}", display::success(&format!("Key imported into the {slot} slot")));
    println!(
        "{}",
        display::key_value_box(
            "Key",
            &[
                ("Fingerprint", imported.fingerprint.to_string()),
                ("Created", imported.generation_time.to_string()),
            ],
        )
    );
    Ok(())
}

/// Sign `data` after a PW1 VERIFY for signing
pub fn sign_command(card: &mut Card, pin: &[u8], data: &[u8]) -> Result<(), Box<dyn Error>> {
    card.verify(PinReference::Pw1Sign, pin)?;
    let signature = card.sign(data)?;
    println!("{}", display::hex_block(&signature));
    Ok(())
}

/// Decrypt `ciphertext` after a PW1 VERIFY
pub fn decipher_command(
    card: &mut Card,
    pin: &[u8],
    ciphertext: &[u8],
) -> Result<(), Box<dyn Error>> {
    card.verify(PinReference::Pw1Other, pin)?;
    let plaintext = card.decipher(ciphertext)?;
    println!("{}", display::hex_block(&plaintext));
    Ok(())
}

/// Sign a challenge with the authentication key after a PW1 VERIFY
pub fn authenticate_command(
    card: &mut Card,
    pin: &[u8],
    data: &[u8],
) -> Result<(), Box<dyn Error>> {
    card.verify(PinReference::Pw1Other, pin)?;
    let response = card.authenticate(data)?;
    println!("{}", display::hex_block(&response));
    Ok(())
}
