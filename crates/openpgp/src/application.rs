//! OpenPGP card application
//!
//! [`OpenPgpCard`] wraps an [`Executor`] and turns every card operation into a
//! typed call. Single commands return the card's answer or a [`CardError`];
//! key generation and key import also write the slot's fingerprint and
//! generation time, and report [`Error::PartialCompletion`] when the key made
//! it onto the card but its metadata did not.

use bytes::Bytes;
use pgpcard_apdu_core::prelude::*;
use tracing::{Level, debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::commands::{self, Password, PinReference, ResetMode};
use crate::data_object::DataObject;
use crate::error::{CardError, Error, MetadataStep, Result};
use crate::key_import::encode_key_import;
use crate::key_material::KeyMaterialProvider;
use crate::key_slot::KeySlot;
use crate::types::{
    ApplicationRelatedData, CardholderRelatedData, Fingerprint, PublicKey, PwStatus, Sex,
    Timestamp, signature_counter,
};

/// Outcome of a key generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    /// Public key returned by the card
    pub public_key: PublicKey,
    /// Fingerprint written to the slot
    pub fingerprint: Fingerprint,
    /// Generation time written to the slot
    pub generation_time: Timestamp,
}

/// Outcome of a key import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedKey {
    /// Slot the key went to
    pub slot: KeySlot,
    /// Fingerprint written to the slot
    pub fingerprint: Fingerprint,
    /// Generation time written to the slot
    pub generation_time: Timestamp,
}

/// OpenPGP card application
#[derive(Debug)]
pub struct OpenPgpCard<E: Executor, C: Clock = SystemClock> {
    executor: E,
    clock: C,
}

impl<E: Executor> OpenPgpCard<E> {
    /// Create a card handle that timestamps keys with the system clock
    pub const fn new(executor: E) -> Self {
        Self {
            executor,
            clock: SystemClock,
        }
    }
}

impl<E: Executor, C: Clock> OpenPgpCard<E, C> {
    /// Create a card handle with a custom time source
    pub const fn with_clock(executor: E, clock: C) -> Self {
        Self { executor, clock }
    }

    /// Underlying executor
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Underlying executor, mutably
    pub const fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Consume the handle and return the executor
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Send one logical command and turn a failure status into a [`CardError`]
    fn execute(&mut self, command: &Command) -> Result<Bytes> {
        let response = self.executor.transmit(command)?;
        let status = response.status();
        match CardError::from_status(status) {
            None => Ok(response.into_payload()),
            Some(err) => {
                let level = status.tracing_level();
                if level == Level::WARN {
                    warn!(ins = command.ins, %status, "{}", status.description());
                } else if level == Level::INFO {
                    info!(ins = command.ins, %status, "{}", status.description());
                } else {
                    debug!(ins = command.ins, %status, "{}", status.description());
                }
                Err(err.into())
            }
        }
    }

    /// VERIFY a password
    #[instrument(level = "debug", skip(self, pin))]
    pub fn verify(&mut self, reference: PinReference, pin: &[u8]) -> Result<()> {
        self.execute(&commands::verify(reference, pin))?;
        Ok(())
    }

    /// Replace PW1 or PW3
    #[instrument(level = "debug", skip(self, old, new))]
    pub fn change_pin(&mut self, password: Password, old: &[u8], new: &[u8]) -> Result<()> {
        self.execute(&commands::change_reference_data(password, old, new))?;
        Ok(())
    }

    /// Unblock PW1 with the resetting code or after a PW3 VERIFY
    #[instrument(level = "debug", skip_all)]
    pub fn reset_retry_counter(&mut self, mode: ResetMode<'_>, new_pin: &[u8]) -> Result<()> {
        self.execute(&commands::reset_retry_counter(mode, new_pin))?;
        Ok(())
    }

    /// Sign with the signature key
    #[instrument(level = "debug", skip(self, data), fields(len = data.len()))]
    pub fn sign(&mut self, data: &[u8]) -> Result<Bytes> {
        self.execute(&commands::compute_digital_signature(data)?)
    }

    /// Decrypt with the decryption key
    #[instrument(level = "debug", skip(self, ciphertext), fields(len = ciphertext.len()))]
    pub fn decipher(&mut self, ciphertext: &[u8]) -> Result<Bytes> {
        self.execute(&commands::decipher(ciphertext))
    }

    /// Sign a challenge with the authentication key
    #[instrument(level = "debug", skip(self, data), fields(len = data.len()))]
    pub fn authenticate(&mut self, data: &[u8]) -> Result<Bytes> {
        self.execute(&commands::internal_authenticate(data)?)
    }

    /// Random bytes from the card
    #[instrument(level = "debug", skip(self))]
    pub fn challenge(&mut self, len: usize) -> Result<Bytes> {
        self.execute(&commands::get_challenge(len)?)
    }

    /// Public key currently in `slot`
    #[instrument(level = "debug", skip(self))]
    pub fn public_key(&mut self, slot: KeySlot) -> Result<PublicKey> {
        let payload = self.execute(&commands::read_public_key(slot))?;
        Ok(PublicKey::from_bytes(&payload)?)
    }

    /// Generate a key pair in `slot`, then record its fingerprint and generation time
    #[instrument(level = "debug", skip(self))]
    pub fn generate_key(&mut self, slot: KeySlot) -> Result<GeneratedKey> {
        let payload = self.execute(&commands::generate_key(slot))?;
        info!(%slot, "Key pair generated");

        let public_key = PublicKey::from_bytes(&payload).map_err(|err| Error::PartialCompletion {
            step: MetadataStep::PublicKey,
            source: Box::new(err.into()),
        })?;
        let fingerprint = public_key.fingerprint();
        let generation_time = self.write_key_metadata(slot, fingerprint)?;

        Ok(GeneratedKey {
            public_key,
            fingerprint,
            generation_time,
        })
    }

    /// Import an RSA key into `slot`, then record its fingerprint and generation time
    ///
    /// The key material is loaded, encoded and dropped within this call.
    #[instrument(level = "debug", skip(self, provider, passphrase))]
    pub fn import_key(
        &mut self,
        slot: KeySlot,
        provider: &dyn KeyMaterialProvider,
        passphrase: Option<&str>,
    ) -> Result<ImportedKey> {
        let import = {
            let material = provider.load(passphrase)?;
            debug!(bits = material.bits(), "Key material loaded");
            encode_key_import(slot, &material)?
        };

        self.execute(&commands::import_key(import.payload_bytes()))?;
        info!(%slot, "Key imported");

        let generation_time = self.write_key_metadata(slot, import.fingerprint)?;
        Ok(ImportedKey {
            slot,
            fingerprint: import.fingerprint,
            generation_time,
        })
    }

    fn write_key_metadata(&mut self, slot: KeySlot, fingerprint: Fingerprint) -> Result<Timestamp> {
        let partial = |step| move |source: Error| Error::PartialCompletion {
            step,
            source: Box::new(source),
        };

        self.put_data(DataObject::Fingerprint(slot), fingerprint.as_bytes())
            .map_err(partial(MetadataStep::Fingerprint))?;

        let now = self.clock.now();
        self.put_data(DataObject::GenerationTime(slot), &now.to_bytes())
            .map_err(partial(MetadataStep::GenerationTime))?;

        debug!(%slot, %fingerprint, %now, "Key metadata written");
        Ok(now)
    }

    /// Raw contents of a data object
    #[instrument(level = "debug", skip(self))]
    pub fn get_data(&mut self, object: DataObject) -> Result<Bytes> {
        self.execute(&commands::get_object(object)?)
    }

    /// Write a data object; the value is checked against the object's bounds first
    #[instrument(level = "debug", skip(self, value), fields(len = value.len()))]
    pub fn put_data(&mut self, object: DataObject, value: &[u8]) -> Result<()> {
        self.execute(&commands::put_data(object, value)?)?;
        Ok(())
    }

    /// Application related data
    pub fn application_related_data(&mut self) -> Result<ApplicationRelatedData> {
        let payload = self.get_data(DataObject::ApplicationRelatedData)?;
        Ok(ApplicationRelatedData::from_bytes(&payload)?)
    }

    /// Cardholder related data
    pub fn cardholder_related_data(&mut self) -> Result<CardholderRelatedData> {
        let payload = self.get_data(DataObject::CardholderRelatedData)?;
        Ok(CardholderRelatedData::from_bytes(&payload)?)
    }

    /// Number of signatures made with the signature key
    pub fn signature_counter(&mut self) -> Result<u32> {
        let payload = self.get_data(DataObject::SecuritySupportTemplate)?;
        Ok(signature_counter(&payload)?)
    }

    /// PW status bytes
    pub fn pw_status(&mut self) -> Result<PwStatus> {
        let payload = self.get_data(DataObject::PwStatus)?;
        Ok(PwStatus::try_from(payload.as_ref())?)
    }

    /// Login data
    pub fn login_data(&mut self) -> Result<String> {
        let payload = self.get_data(DataObject::LoginData)?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    /// Public key URL
    pub fn url(&mut self) -> Result<String> {
        let payload = self.get_data(DataObject::Url)?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    /// Cardholder certificate
    pub fn certificate(&mut self) -> Result<Bytes> {
        self.get_data(DataObject::CardholderCertificate)
    }

    /// Set the cardholder name
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.put_data(DataObject::Name, name.as_bytes())
    }

    /// Set the cardholder sex
    pub fn set_sex(&mut self, sex: Sex) -> Result<()> {
        self.put_data(DataObject::Sex, &[sex.to_byte()])
    }

    /// Whether PW1 stays valid for several signatures
    pub fn set_pw1_validity(&mut self, multiple: bool) -> Result<()> {
        self.put_data(DataObject::PwStatus, &[u8::from(multiple)])
    }

    /// Terminate the application
    ///
    /// Afterwards the card answers GET DATA with
    /// [`CardError::ConditionsNotSatisfied`] until [`Self::activate`].
    #[instrument(level = "debug", skip(self))]
    pub fn terminate(&mut self) -> Result<()> {
        self.execute(&commands::terminate())?;
        warn!("Application terminated");
        Ok(())
    }

    /// Reactivate a terminated application, resetting it
    #[instrument(level = "debug", skip(self))]
    pub fn activate(&mut self) -> Result<()> {
        self.execute(&commands::activate())?;
        Ok(())
    }

    /// Vendor version bytes
    #[instrument(level = "debug", skip(self))]
    pub fn version(&mut self) -> Result<Bytes> {
        self.execute(&commands::get_version())
    }

    /// Set the retry counters of PW1, the resetting code and PW3
    #[instrument(level = "debug", skip(self))]
    pub fn set_pin_retries(&mut self, pw1: u8, rc: u8, pw3: u8) -> Result<()> {
        self.execute(&commands::set_pin_retries(pw1, rc, pw3)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pgpcard_apdu_core::transport::mock::MockTransport;

    use super::*;
    use crate::clock::FixedClock;
    use crate::key_material::RsaKeyMaterial;
    use crate::tlv::DecodeError;
    use crate::types::{sample_ard, sample_template};

    type MockCard = OpenPgpCard<CardExecutor<MockTransport>, FixedClock>;

    const NOW: Timestamp = Timestamp(1_700_000_000);

    fn card(responses: &[&str]) -> MockCard {
        OpenPgpCard::with_clock(
            CardExecutor::new(MockTransport::from_hex(responses.iter().copied())),
            FixedClock(NOW),
        )
    }

    fn with_status(payload: &[u8], sw: &str) -> String {
        hex::encode(payload) + sw
    }

    fn sent(card: &MockCard) -> Vec<String> {
        card.executor().transport().sent_hex()
    }

    #[test]
    fn test_name_at_bound_is_sent() {
        let mut card = card(&["9000"]);
        let name = "A".repeat(39);
        card.set_name(&name).unwrap();

        let sent = sent(&card);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], format!("00da005b27{}", hex::encode(&name)));
    }

    #[test]
    fn test_name_over_bound_never_reaches_card() {
        let mut card = card(&["9000"]);
        let err = card.set_name(&"A".repeat(40)).unwrap_err();
        assert!(matches!(err, Error::InputTooLong { len: 40, max: 39, .. }));
        assert!(sent(&card).is_empty());
    }

    #[test]
    fn test_verify_status_mapping() {
        let mut card = card(&["9000", "6983", "6A88", "6982"]);
        card.verify(PinReference::Pw3, b"12345678").unwrap();

        let err = card.verify(PinReference::Pw3, b"00000000").unwrap_err();
        assert_eq!(err.card_error(), Some(CardError::Blocked));

        let err = card.public_key(KeySlot::Signature).unwrap_err();
        assert_eq!(err.card_error(), Some(CardError::NotFound));

        let err = card.sign(&[0; 32]).unwrap_err();
        assert_eq!(
            err.card_error(),
            Some(CardError::Failed(StatusWord::new(0x69, 0x82)))
        );
        assert!(!err.is_transport_fault());
    }

    #[test]
    fn test_read_application_data() {
        let mut card = card(&[&with_status(&sample_ard(), "9000")]);
        let ard = card.application_related_data().unwrap();
        assert_eq!(ard.serial_number(), Some([0x12, 0x34, 0x56, 0x78]));
        assert_eq!(sent(&card), vec!["00ca006e00"]);
    }

    #[test]
    fn test_truncated_application_data_is_a_decode_error() {
        let ard = sample_ard();
        let mut card = card(&[&with_status(&ard[..ard.len() - 3], "9000")]);
        assert!(matches!(
            card.application_related_data(),
            Err(Error::Decode(DecodeError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_application_data_across_continuations() {
        let ard = sample_ard();
        let (head, tail) = ard.split_at(100);
        let first = format!("{}61{:02x}", hex::encode(head), tail.len());
        let mut card = card(&[&first, &with_status(tail, "9000")]);

        let decoded = card.application_related_data().unwrap();
        assert_eq!(decoded, ApplicationRelatedData::from_bytes(&ard).unwrap());
        assert_eq!(
            sent(&card),
            vec!["00ca006e00".to_owned(), format!("00c00000{:02x}", tail.len())]
        );
    }

    #[test]
    fn test_terminated_card() {
        let mut card = card(&["9000", "6985"]);
        card.terminate().unwrap();
        let err = card.cardholder_related_data().unwrap_err();
        assert_eq!(err.card_error(), Some(CardError::ConditionsNotSatisfied));
    }

    #[test]
    fn test_generate_key_writes_metadata() {
        let template = sample_template();
        let mut card = card(&[&with_status(&template, "9000"), "9000", "9000"]);

        let key = card.generate_key(KeySlot::Decryption).unwrap();
        assert_eq!(key.public_key.modulus.len(), 256);
        assert_eq!(key.public_key.exponent, vec![0x01, 0x00, 0x01]);
        assert_eq!(key.generation_time, NOW);

        let expected_fp = Fingerprint::of([
            (0..=255u8).collect::<Vec<_>>().as_slice(),
            &[0x01, 0x00, 0x01][..],
        ]);
        assert_eq!(key.fingerprint, expected_fp);

        let sent = sent(&card);
        assert_eq!(sent[0], "0047800002b80000");
        assert_eq!(
            sent[1],
            format!("00da00c814{}", hex::encode(expected_fp.as_bytes()))
        );
        assert_eq!(sent[2], "00da00cf046553f100");
    }

    #[test]
    fn test_generate_key_partial_completion() {
        let template = sample_template();
        let mut card = card(&[&with_status(&template, "9000"), "9000", "6982"]);

        let err = card.generate_key(KeySlot::Signature).unwrap_err();
        match &err {
            Error::PartialCompletion { step, .. } => {
                assert_eq!(*step, MetadataStep::GenerationTime);
            }
            other => panic!("expected partial completion, got {other:?}"),
        }
        assert_eq!(
            err.card_error(),
            Some(CardError::Failed(StatusWord::new(0x69, 0x82)))
        );
    }

    #[test]
    fn test_generate_key_unparsable_template_is_partial() {
        let mut card = card(&["7f4903810100 9000"]);
        let err = card.generate_key(KeySlot::Authentication).unwrap_err();
        assert!(matches!(
            err,
            Error::PartialCompletion {
                step: MetadataStep::PublicKey,
                ..
            }
        ));
        assert_eq!(sent(&card).len(), 1);
    }

    #[test]
    fn test_generate_key_refused_is_plain_failure() {
        let mut card = card(&["6982"]);
        let err = card.generate_key(KeySlot::Signature).unwrap_err();
        assert!(!err.is_partial());
    }

    #[test]
    fn test_import_key_chains_and_writes_metadata() {
        let material =
            crate::key_material::parse_pem(include_str!("../testdata/rsa2048.pem"), None).unwrap();

        // 934 byte list: three full links and a final one
        let mut card = card(&["9000", "9000", "9000", "9000", "9000", "9000"]);
        let imported = card.import_key(KeySlot::Signature, &material, None).unwrap();

        let sent = sent(&card);
        assert_eq!(sent.len(), 6);
        assert!(sent[0].starts_with("10db3ffffe4d8203a2b600"));
        assert!(sent[1].starts_with("10db3ffffe"));
        assert!(sent[2].starts_with("10db3ffffe"));
        assert!(sent[3].starts_with("00db3fff81ac"));
        assert_eq!(
            hex::encode(imported.fingerprint.as_bytes()),
            "99c942e063607a7b4ff8017fb3c39095deb985a7"
        );
        assert_eq!(
            sent[4],
            "00da00c714".to_owned() + "99c942e063607a7b4ff8017fb3c39095deb985a7"
        );
        assert_eq!(sent[5], "00da00ce046553f100");
    }

    #[test]
    fn test_import_key_fingerprint_failure_is_partial() {
        let material = RsaKeyMaterial::new(vec![0x0C, 0xA1], vec![0x11], vec![61], vec![53]);
        let mut card = card(&["9000", "6A88"]);
        let err = card
            .import_key(KeySlot::Authentication, &material, None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PartialCompletion {
                step: MetadataStep::Fingerprint,
                ..
            }
        ));
        assert_eq!(err.card_error(), Some(CardError::NotFound));
    }

    #[test]
    fn test_import_rejected_material_sends_nothing() {
        let material = RsaKeyMaterial::new(vec![0x0C, 0xA2], vec![0x11], vec![61], vec![53]);
        let mut card = card(&["9000"]);
        assert!(matches!(
            card.import_key(KeySlot::Signature, &material, None),
            Err(Error::KeyImport(_))
        ));
        assert!(sent(&card).is_empty());
    }

    #[test]
    fn test_transport_fault_is_reported() {
        let mut transport = MockTransport::new(Vec::<Vec<u8>>::new());
        transport.push_error(TransportError::Disconnected);
        let mut card = OpenPgpCard::new(CardExecutor::new(transport));

        let err = card.version().unwrap_err();
        assert!(err.is_transport_fault());
        assert_eq!(err.card_error(), None);
    }

    #[test]
    fn test_pw_status_and_counter() {
        let mut card = card(&["00207f7f030003 9000", "7a05930300002a 9000"]);
        let status = card.pw_status().unwrap();
        assert_eq!(status.pw1_tries, 3);
        assert_eq!(status.rc_tries, 0);
        assert_eq!(card.signature_counter().unwrap(), 42);
    }

    #[test]
    fn test_challenge_and_retries() {
        let mut card = card(&["0102030405060708 9000", "9000"]);
        assert_eq!(card.challenge(8).unwrap().as_ref(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        card.set_pin_retries(3, 3, 3).unwrap();
        assert_eq!(sent(&card), vec!["0084000008", "00f2000003030303"]);
    }
}
