//! Instruction codes, parameter bytes and data object tags

/// Class byte of every OpenPGP command
pub const CLA: u8 = 0x00;

/// Largest input accepted by PSO:CDS and INTERNAL AUTHENTICATE
pub const MAX_AUTH_INPUT_LEN: usize = 245;

/// Instruction bytes
pub mod ins {
    /// VERIFY
    pub const VERIFY: u8 = 0x20;
    /// CHANGE REFERENCE DATA
    pub const CHANGE_REFERENCE_DATA: u8 = 0x24;
    /// RESET RETRY COUNTER
    pub const RESET_RETRY_COUNTER: u8 = 0x2C;
    /// PERFORM SECURITY OPERATION
    pub const PSO: u8 = 0x2A;
    /// INTERNAL AUTHENTICATE
    pub const INTERNAL_AUTHENTICATE: u8 = 0x88;
    /// GENERATE ASYMMETRIC KEY PAIR
    pub const GENERATE_ASYMMETRIC_KEY_PAIR: u8 = 0x47;
    /// GET CHALLENGE
    pub const GET_CHALLENGE: u8 = 0x84;
    /// GET DATA
    pub const GET_DATA: u8 = 0xCA;
    /// PUT DATA
    pub const PUT_DATA: u8 = 0xDA;
    /// PUT DATA, odd instruction: extended header list for key import
    pub const PUT_DATA_ODD: u8 = 0xDB;
    /// TERMINATE DF
    pub const TERMINATE_DF: u8 = 0xE6;
    /// ACTIVATE FILE
    pub const ACTIVATE_FILE: u8 = 0x44;
    /// GET VERSION (vendor specific)
    pub const GET_VERSION: u8 = 0xF1;
    /// SET PIN RETRIES (vendor specific)
    pub const SET_PIN_RETRIES: u8 = 0xF2;
}

/// P1/P2 pairs that select an operation variant
pub mod params {
    /// PSO: COMPUTE DIGITAL SIGNATURE
    pub const PSO_CDS: (u8, u8) = (0x9E, 0x9A);
    /// PSO: DECIPHER
    pub const PSO_DECIPHER: (u8, u8) = (0x80, 0x86);
    /// GENERATE ASYMMETRIC KEY PAIR: generate a new key
    pub const GENERATE: (u8, u8) = (0x80, 0x00);
    /// GENERATE ASYMMETRIC KEY PAIR: read the existing public key
    pub const READ_PUBLIC_KEY: (u8, u8) = (0x81, 0x00);
    /// PUT DATA odd: extended header list
    pub const EXTENDED_HEADER_LIST: (u8, u8) = (0x3F, 0xFF);
    /// RESET RETRY COUNTER authorised by the resetting code
    pub const RESET_WITH_CODE: u8 = 0x00;
    /// RESET RETRY COUNTER authorised by a prior PW3 VERIFY
    pub const RESET_WITH_ADMIN: u8 = 0x02;
    /// Key reference of PW1 for RESET RETRY COUNTER
    pub const RESET_PW1: u8 = 0x81;
}

/// Data object tags
pub mod tags {
    /// Application identifier
    pub const AID: u16 = 0x004F;
    /// Name
    pub const NAME: u16 = 0x005B;
    /// Login data
    pub const LOGIN_DATA: u16 = 0x005E;
    /// Language preferences
    pub const LANGUAGE_PREFERENCES: u16 = 0x5F2D;
    /// Sex
    pub const SEX: u16 = 0x5F35;
    /// Public key URL
    pub const URL: u16 = 0x5F50;
    /// Cardholder related data template
    pub const CARDHOLDER_RELATED_DATA: u16 = 0x0065;
    /// Application related data template
    pub const APPLICATION_RELATED_DATA: u16 = 0x006E;
    /// Security support template
    pub const SECURITY_SUPPORT_TEMPLATE: u16 = 0x007A;
    /// Cardholder certificate
    pub const CARDHOLDER_CERTIFICATE: u16 = 0x7F21;
    /// PW status bytes
    pub const PW_STATUS: u16 = 0x00C4;
    /// Resetting code
    pub const RESETTING_CODE: u16 = 0x00D3;

    /// Extended header list
    pub const EXTENDED_HEADER_LIST: u8 = 0x4D;
    /// Cardholder private key template
    pub const PRIVATE_KEY_TEMPLATE: u16 = 0x7F48;
    /// Concatenated private key components
    pub const PRIVATE_KEY_DATA: u16 = 0x5F48;
    /// Public key template returned by GENERATE ASYMMETRIC KEY PAIR
    pub const PUBLIC_KEY_TEMPLATE: u16 = 0x7F49;
    /// RSA modulus inside the public key template
    pub const MODULUS: u8 = 0x81;
    /// RSA public exponent inside the public key template
    pub const PUBLIC_EXPONENT: u8 = 0x82;

    /// Private key template entries, in the order the card expects them
    pub mod rsa {
        /// Public exponent e
        pub const E: u8 = 0x91;
        /// Prime p
        pub const P: u8 = 0x92;
        /// Prime q
        pub const Q: u8 = 0x93;
        /// CRT coefficient q^-1 mod p
        pub const QINV: u8 = 0x94;
        /// d mod (p - 1)
        pub const DP: u8 = 0x95;
        /// d mod (q - 1)
        pub const DQ: u8 = 0x96;
        /// Modulus n
        pub const N: u8 = 0x97;
    }
}
