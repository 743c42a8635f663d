use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pgpcard_openpgp::{DataObject, KeySlot, Password, PinReference};
use zeroize::Zeroizing;

mod commands;
mod utils;

use commands::*;
use utils::{AdminArgs, UserArgs, parse_hex};

#[derive(Parser)]
#[command(version, about = "Manage an OpenPGP card reached through a TCP card bridge")]
struct Cli {
    /// Address the relay listens on for the card bridge
    #[arg(short, long, env = "PGPCARD_BIND", default_value = "0.0.0.0:5511")]
    bind: SocketAddr,

    /// Read and write timeout on the bridge connection, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Debug level output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show application related data, cardholder data and counters
    Info,

    /// Verify a password
    Verify {
        /// Password to verify
        #[arg(long, value_enum, default_value_t = PinReference::Pw1Sign)]
        reference: PinReference,

        /// The password
        #[arg(env = "PGPCARD_PIN", hide_env_values = true)]
        pin: String,
    },

    /// Change PW1 or PW3
    ChangePin {
        /// Password to change
        #[arg(long, value_enum, default_value_t = Password::Pw1)]
        password: Password,

        /// Current value
        old: String,

        /// New value
        new: String,
    },

    /// Unblock PW1 with the resetting code or the admin PIN
    ResetRetryCounter {
        /// New PW1
        new_pin: String,

        /// Resetting code
        #[arg(long)]
        resetting_code: Option<String>,

        /// Admin PIN (PW3)
        #[arg(long, env = "PGPCARD_ADMIN_PIN", hide_env_values = true)]
        admin_pin: Option<String>,
    },

    /// Sign a hash or DigestInfo with the signature key
    Sign {
        /// Data to sign, as hex (at most 245 bytes)
        data: String,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Decrypt with the decryption key
    Decipher {
        /// Ciphertext, as hex
        ciphertext: String,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Sign a challenge with the authentication key
    Authenticate {
        /// Challenge, as hex (at most 245 bytes)
        data: String,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Generate a key pair and record its fingerprint and creation time
    GenerateKey {
        /// Key slot
        #[arg(long, value_enum)]
        slot: KeySlot,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Show the public key of a slot
    PublicKey {
        /// Key slot
        #[arg(long, value_enum)]
        slot: KeySlot,
    },

    /// Get random bytes from the card
    Challenge {
        /// Number of bytes (1 to 255)
        #[arg(default_value_t = 8)]
        len: usize,
    },

    /// Show the PW status bytes
    PwStatus,

    /// Read the cardholder certificate
    Certificate {
        /// Save to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a data object
    Put {
        /// Object name (name, login, lang, sex, url, certificate, pw1-validity,
        /// resetting-code, fingerprint-sig/dec/aut, time-sig/dec/aut) or hex tag
        object: DataObject,

        /// Value as text
        #[arg(required_unless_present_any = ["hex", "file"])]
        value: Option<String>,

        /// Value as hex
        #[arg(long, conflicts_with_all = ["value", "file"])]
        hex: Option<String>,

        /// Value read from a file
        #[arg(long, conflicts_with_all = ["value", "hex"])]
        file: Option<PathBuf>,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Import an RSA private key from a PEM file
    ImportKey {
        /// Key slot
        #[arg(long, value_enum)]
        slot: KeySlot,

        /// PKCS#8 or PKCS#1 PEM file
        key: PathBuf,

        /// Passphrase of an encrypted key
        #[arg(long, env = "PGPCARD_KEY_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Terminate the application
    Terminate {
        /// Admin PIN (PW3); not needed once PW3 is blocked
        #[arg(long, env = "PGPCARD_ADMIN_PIN", hide_env_values = true)]
        admin_pin: Option<String>,
    },

    /// Activate a terminated application
    Activate,

    /// Show the vendor version bytes
    Version,

    /// Set the retry counters of PW1, the resetting code and PW3
    SetRetries {
        /// PW1 retries
        pw1: u8,
        /// Resetting code retries
        rc: u8,
        /// PW3 retries
        pw3: u8,

        #[command(flatten)]
        admin: AdminArgs,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    let mut card = utils::session::open_card(cli.bind, cli.timeout.map(Duration::from_secs))?;
    let card = &mut card;

    match cli.command {
        Commands::Info => info_command(card)?,
        Commands::Verify { reference, pin } => {
            let pin = Zeroizing::new(pin);
            verify_command(card, reference, pin.as_bytes())?
        }
        Commands::ChangePin { password, old, new } => {
            let (old, new) = (Zeroizing::new(old), Zeroizing::new(new));
            change_pin_command(card, password, old.as_bytes(), new.as_bytes())?
        }
        Commands::ResetRetryCounter {
            new_pin,
            resetting_code,
            admin_pin,
        } => {
            let new_pin = Zeroizing::new(new_pin);
            let resetting_code = resetting_code.map(Zeroizing::new);
            let admin_pin = admin_pin.map(Zeroizing::new);
            reset_retry_counter_command(
                card,
                resetting_code.as_deref().map(String::as_bytes),
                admin_pin.as_deref().map(String::as_bytes),
                new_pin.as_bytes(),
            )?
        }
        Commands::Sign { data, user } => sign_command(card, &user.pin(), &parse_hex(&data)?)?,
        Commands::Decipher { ciphertext, user } => {
            decipher_command(card, &user.pin(), &parse_hex(&ciphertext)?)?
        }
        Commands::Authenticate { data, user } => {
            authenticate_command(card, &user.pin(), &parse_hex(&data)?)?
        }
        Commands::GenerateKey { slot, admin } => generate_key_command(card, &admin.pin(), slot)?,
        Commands::PublicKey { slot } => public_key_command(card, slot)?,
        Commands::Challenge { len } => challenge_command(card, len)?,
        Commands::PwStatus => pw_status_command(card)?,
        Commands::Certificate { output } => certificate_command(card, output.as_deref())?,
        Commands::Put {
            object,
            value,
            hex,
            file,
            admin,
        } => {
            let value = match (value, hex, file) {
                (Some(text), _, _) => text.into_bytes(),
                (None, Some(hex), _) => parse_hex(&hex)?,
                (None, None, Some(path)) => std::fs::read(path)?,
                (None, None, None) => Vec::new(),
            };
            put_command(card, &admin.pin(), object, &value)?
        }
        Commands::ImportKey {
            slot,
            key,
            passphrase,
            admin,
        } => {
            let passphrase = passphrase.map(Zeroizing::new);
            let passphrase = passphrase.as_deref().map(String::as_str);
            import_key_command(card, &admin.pin(), slot, &key, passphrase)?
        }
        Commands::Terminate { admin_pin } => {
            let admin_pin = admin_pin.map(|pin| Zeroizing::new(pin.into_bytes()));
            terminate_command(card, admin_pin.as_deref().map(Vec::as_slice))?
        }
        Commands::Activate => activate_command(card)?,
        Commands::Version => version_command(card)?,
        Commands::SetRetries {
            pw1,
            rc,
            pw3,
            admin,
        } => set_retries_command(card, &admin.pin(), pw1, rc, pw3)?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(true)
        .init();
}
