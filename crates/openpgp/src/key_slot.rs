//! Key slots and the tags tied to each of them

use derive_more::Display;

/// One of the three key slots of the card
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum KeySlot {
    /// Signature key
    #[display("signature")]
    Signature,
    /// Decryption key
    #[display("decryption")]
    Decryption,
    /// Authentication key
    #[display("authentication")]
    Authentication,
}

/// Tags that belong to one key slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTags {
    /// Control reference template tag (key reference)
    pub crt: u8,
    /// Fingerprint data object
    pub fingerprint: u16,
    /// Generation time data object
    pub generation_time: u16,
}

const SLOT_TAGS: [SlotTags; 3] = [
    SlotTags {
        crt: 0xB6,
        fingerprint: 0x00C7,
        generation_time: 0x00CE,
    },
    SlotTags {
        crt: 0xB8,
        fingerprint: 0x00C8,
        generation_time: 0x00CF,
    },
    SlotTags {
        crt: 0xA4,
        fingerprint: 0x00C9,
        generation_time: 0x00D0,
    },
];

impl KeySlot {
    /// All slots in card order
    pub const ALL: [Self; 3] = [Self::Signature, Self::Decryption, Self::Authentication];

    /// Position of the slot in card order
    pub const fn index(self) -> usize {
        match self {
            Self::Signature => 0,
            Self::Decryption => 1,
            Self::Authentication => 2,
        }
    }

    /// Slot from its 1-based number
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Signature),
            2 => Some(Self::Decryption),
            3 => Some(Self::Authentication),
            _ => None,
        }
    }

    /// Tags belonging to this slot
    pub const fn tags(self) -> &'static SlotTags {
        &SLOT_TAGS[self.index()]
    }

    /// Control reference template tag
    pub const fn crt_tag(self) -> u8 {
        self.tags().crt
    }

    /// Fingerprint data object tag
    pub const fn fingerprint_tag(self) -> u16 {
        self.tags().fingerprint
    }

    /// Generation time data object tag
    pub const fn generation_time_tag(self) -> u16 {
        self.tags().generation_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_table() {
        assert_eq!(KeySlot::Signature.crt_tag(), 0xB6);
        assert_eq!(KeySlot::Decryption.fingerprint_tag(), 0xC8);
        assert_eq!(KeySlot::Authentication.generation_time_tag(), 0xD0);
        assert_eq!(KeySlot::from_number(2), Some(KeySlot::Decryption));
        assert_eq!(KeySlot::from_number(0), None);

        for (i, slot) in KeySlot::ALL.into_iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }
}
