// Path: crates/jam-types/src/validator.rs

/// Byte width of one fixed-length validator data record, per the protocol's
/// `designate` wire encoding.
pub const VALIDATOR_RECORD_SIZE: usize = 336;

/// One validator's fixed-size key bundle, opaque to the accumulation engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorKey(pub [u8; VALIDATOR_RECORD_SIZE]);

impl ValidatorKey {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != VALIDATOR_RECORD_SIZE {
            return None;
        }
        let mut buf = [0u8; VALIDATOR_RECORD_SIZE];
        buf.copy_from_slice(bytes);
        Some(ValidatorKey(buf))
    }
}

/// ι: ordered sequence of validator key bundles, length = `validators_count`.
pub type ValidatorKeys = Vec<ValidatorKey>;
