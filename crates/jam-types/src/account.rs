// Path: crates/jam-types/src/account.rs

use std::collections::BTreeMap;

use crate::ids::{Hash32, ServiceId, Slot};

/// Key into `ServiceAccount::preimage_lookup`: the preimage hash and its
/// declared byte length (the same hash can be solicited at different sizes).
pub type PreimageKey = (Hash32, u64);

/// Length-0..3 ordered sequence of timeslots tracking a preimage's lifecycle:
/// `[]` requested, `[t0]` available since t0, `[t0,t1]` available then
/// forgotten, `[t0,t1,t2]` re-solicited at t2 after the prior window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreimageStatus(pub Vec<Slot>);

impl PreimageStatus {
    pub fn requested() -> Self {
        PreimageStatus(Vec::new())
    }

    pub fn is_requested(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_available(&self) -> bool {
        self.0.len() == 1
    }

    pub fn is_forgotten(&self) -> bool {
        self.0.len() == 2
    }

    pub fn is_resolicited(&self) -> bool {
        self.0.len() == 3
    }

    pub fn available_since(&self) -> Option<Slot> {
        self.0.first().copied()
    }

    pub fn forgotten_since(&self) -> Option<Slot> {
        if self.0.len() >= 2 {
            self.0.get(1).copied()
        } else {
            None
        }
    }

    /// Encodes as the two host-call registers used by `query`: first is
    /// `|status| + (status[0] << 32)`, second is `status[1] + (status[2] << 32)`.
    pub fn encode_registers(&self) -> (u64, u64) {
        let len = self.0.len() as u64;
        let s0 = self.0.first().copied().unwrap_or(0) as u64;
        let s1 = self.0.get(1).copied().unwrap_or(0) as u64;
        let s2 = self.0.get(2).copied().unwrap_or(0) as u64;
        (len | (s0 << 32), s1 | (s2 << 32))
    }
}

/// A service's on-chain account: balance, code identity, storage and
/// preimage bookkeeping. `balance >= a_t(footprint_items, footprint_bytes)`
/// must hold after every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceAccount {
    pub code_hash: Hash32,
    pub balance: u64,
    pub min_gas_accumulate: u64,
    pub min_gas_on_transfer: u64,
    pub storage_offset: u64,
    pub creation_slot: Slot,
    pub last_accumulation_slot: Slot,
    pub parent_service: ServiceId,
    pub footprint_items: u32,
    pub footprint_bytes: u64,
    pub storage: BTreeMap<Vec<u8>, Vec<u8>>,
    pub preimages: BTreeMap<Hash32, Vec<u8>>,
    pub preimage_lookup: BTreeMap<PreimageKey, PreimageStatus>,
}

impl ServiceAccount {
    pub fn new(code_hash: Hash32, creation_slot: Slot, parent_service: ServiceId) -> Self {
        Self {
            code_hash,
            balance: 0,
            min_gas_accumulate: 0,
            min_gas_on_transfer: 0,
            storage_offset: 0,
            creation_slot,
            last_accumulation_slot: creation_slot,
            parent_service,
            footprint_items: 0,
            footprint_bytes: 0,
            storage: BTreeMap::new(),
            preimages: BTreeMap::new(),
            preimage_lookup: BTreeMap::new(),
        }
    }

    /// Storage-footprint deposit threshold `a_t = per_item*items + per_octet*bytes`.
    pub fn storage_threshold(&self, min_balance_per_item: u64, min_balance_per_octet: u64) -> u64 {
        min_balance_per_item
            .saturating_mul(self.footprint_items as u64)
            .saturating_add(min_balance_per_octet.saturating_mul(self.footprint_bytes))
    }
}
