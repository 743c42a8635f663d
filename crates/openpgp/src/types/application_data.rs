use std::fmt;

use crate::key_slot::KeySlot;
use crate::tlv::{DecodeError, FieldSpec, Layout, read_layout, strip_template};
use crate::types::{Fingerprint, PwStatus, Timestamp};

/// Fields of the application related data record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArdField {
    /// Application identifier (4F)
    Aid,
    /// Historical bytes (5F52)
    HistoricalBytes,
    /// Extended capabilities (C0)
    ExtendedCapabilities,
    /// Algorithm attributes (C1-C3)
    AlgorithmAttributes(KeySlot),
    /// PW status bytes (C4)
    PwStatus,
    /// Key fingerprint (C5)
    Fingerprint(KeySlot),
    /// CA fingerprint (C6), 0-based
    CaFingerprint(u8),
    /// Key generation time (CD)
    GenerationTime(KeySlot),
}

use ArdField as F;
use KeySlot::{Authentication, Decryption, Signature};

/// Layout of the application related data record (6E)
pub const ARD_LAYOUT: Layout<ArdField> = Layout {
    name: "application related data",
    fields: &[
        FieldSpec::prefixed(F::Aid, 1),
        FieldSpec::prefixed(F::HistoricalBytes, 2),
        // 73 81 xx C0
        FieldSpec::prefixed(F::ExtendedCapabilities, 4),
        FieldSpec::prefixed(F::AlgorithmAttributes(Signature), 1),
        FieldSpec::prefixed(F::AlgorithmAttributes(Decryption), 1),
        FieldSpec::prefixed(F::AlgorithmAttributes(Authentication), 1),
        FieldSpec::fixed(F::PwStatus, 2, PwStatus::LEN),
        FieldSpec::fixed(F::Fingerprint(Signature), 2, 20),
        FieldSpec::fixed(F::Fingerprint(Decryption), 0, 20),
        FieldSpec::fixed(F::Fingerprint(Authentication), 0, 20),
        FieldSpec::fixed(F::CaFingerprint(0), 2, 20),
        FieldSpec::fixed(F::CaFingerprint(1), 0, 20),
        FieldSpec::fixed(F::CaFingerprint(2), 0, 20),
        FieldSpec::fixed(F::GenerationTime(Signature), 2, 4),
        FieldSpec::fixed(F::GenerationTime(Decryption), 0, 4),
        FieldSpec::fixed(F::GenerationTime(Authentication), 0, 4),
    ],
};

/// Application related data (6E)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRelatedData {
    /// Application identifier
    pub aid: Vec<u8>,
    /// Historical bytes
    pub historical_bytes: Vec<u8>,
    /// Extended capabilities
    pub extended_capabilities: Vec<u8>,
    /// Algorithm attributes, in slot order
    pub algorithm_attributes: [Vec<u8>; 3],
    /// PW status bytes
    pub pw_status: PwStatus,
    /// Key fingerprints, in slot order
    pub fingerprints: [Fingerprint; 3],
    /// CA fingerprints
    pub ca_fingerprints: [Fingerprint; 3],
    /// Key generation times, in slot order
    pub generation_times: [Timestamp; 3],
}

impl ApplicationRelatedData {
    /// Decode a GET DATA 6E response, with or without the outer template
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let data = strip_template(ARD_LAYOUT.name, &[0x6E], data)?;
        let record = read_layout(&ARD_LAYOUT, data)?;

        let per_slot = |f: fn(KeySlot) -> ArdField| KeySlot::ALL.map(f);

        Ok(Self {
            aid: record.to_vec(F::Aid)?,
            historical_bytes: record.to_vec(F::HistoricalBytes)?,
            extended_capabilities: record.to_vec(F::ExtendedCapabilities)?,
            algorithm_attributes: [
                record.to_vec(F::AlgorithmAttributes(Signature))?,
                record.to_vec(F::AlgorithmAttributes(Decryption))?,
                record.to_vec(F::AlgorithmAttributes(Authentication))?,
            ],
            pw_status: PwStatus::from(record.array::<{ PwStatus::LEN }>(F::PwStatus)?),
            fingerprints: fingerprints(&record, per_slot(F::Fingerprint))?,
            ca_fingerprints: fingerprints(&record, [0, 1, 2].map(F::CaFingerprint))?,
            generation_times: {
                let [a, b, c] = per_slot(F::GenerationTime);
                [
                    Timestamp::from_bytes(record.array(a)?),
                    Timestamp::from_bytes(record.array(b)?),
                    Timestamp::from_bytes(record.array(c)?),
                ]
            },
        })
    }

    /// Algorithm attributes of a slot
    pub fn algorithm_attributes(&self, slot: KeySlot) -> &[u8] {
        &self.algorithm_attributes[slot.index()]
    }

    /// Fingerprint of a slot
    pub const fn fingerprint(&self, slot: KeySlot) -> &Fingerprint {
        &self.fingerprints[slot.index()]
    }

    /// Generation time of a slot
    pub const fn generation_time(&self, slot: KeySlot) -> Timestamp {
        self.generation_times[slot.index()]
    }

    /// Card serial number, when the AID has the usual 16-byte shape
    pub fn serial_number(&self) -> Option<[u8; 4]> {
        self.aid.get(10..14)?.try_into().ok()
    }
}

fn fingerprints(
    record: &crate::tlv::Record<'_, ArdField>,
    fields: [ArdField; 3],
) -> Result<[Fingerprint; 3], DecodeError> {
    let [a, b, c] = fields;
    Ok([
        Fingerprint(record.array(a)?),
        Fingerprint(record.array(b)?),
        Fingerprint(record.array(c)?),
    ])
}

impl fmt::Display for ApplicationRelatedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application ID ........: {}", hex::encode_upper(&self.aid))?;
        writeln!(f, "Historical bytes ......: {}", hex::encode_upper(&self.historical_bytes))?;
        writeln!(
            f,
            "Extended capabilities .: {}",
            hex::encode_upper(&self.extended_capabilities)
        )?;
        writeln!(f, "Algorithm attributes")?;
        for slot in KeySlot::ALL {
            writeln!(
                f,
                "  {:<15}: {}",
                slot.to_string(),
                hex::encode_upper(self.algorithm_attributes(slot))
            )?;
        }
        let pw = &self.pw_status;
        writeln!(f, "PW status")?;
        writeln!(f, "  PW1 valid for multiple CDS: {}", pw.pw1_valid_for_multiple)?;
        writeln!(
            f,
            "  max length PW1/RC/PW3 : {}/{}/{}",
            pw.pw1_max_len, pw.rc_max_len, pw.pw3_max_len
        )?;
        writeln!(
            f,
            "  tries PW1/RC/PW3      : {}/{}/{}",
            pw.pw1_tries, pw.rc_tries, pw.pw3_tries
        )?;
        writeln!(f, "Key fingerprints")?;
        for slot in KeySlot::ALL {
            writeln!(f, "  {:<15}: {}", slot.to_string(), self.fingerprint(slot))?;
        }
        writeln!(f, "CA fingerprints")?;
        for (i, fp) in self.ca_fingerprints.iter().enumerate() {
            writeln!(f, "  CA {:<12}: {fp}", i + 1)?;
        }
        writeln!(f, "Key generation times")?;
        for slot in KeySlot::ALL {
            writeln!(f, "  {:<15}: {}", slot.to_string(), self.generation_time(slot))?;
        }
        Ok(())
    }
}
