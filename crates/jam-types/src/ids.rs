// Path: crates/jam-types/src/ids.rs

/// 32-bit service identifier. Public range is `[MIN_PUBLIC_SERVICE_ID, 2^32)`;
/// ids below that threshold are reserved for the registrar privileged service.
pub type ServiceId = u32;

/// A 32-byte hash, used for code hashes, preimage hashes, entropy and yields.
pub type Hash32 = [u8; 32];

/// Absolute timeslot index.
pub type Slot = u32;

/// Current-slot and entropy inputs threaded through accumulation without
/// being owned by any single CoW dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeInfo {
    pub slot: Slot,
}

impl TimeInfo {
    pub fn new(slot: Slot) -> Self {
        Self { slot }
    }
}

/// Encodes `id` as a little-endian 32-byte value, used by `eject` to compare
/// a target's code hash against the ejecting service's own identity.
pub fn encode_service_id_as_hash(id: ServiceId) -> Hash32 {
    let mut out = [0u8; 32];
    out[..4].copy_from_slice(&id.to_le_bytes());
    out
}
