// Path: crates/jam-types/src/params.rs

use crate::ids::ServiceId;

/// Protocol-level constants consumed by the state fabric, host-call surface
/// and outer loop. Values mirror the JAM Gray Paper defaults used elsewhere
/// in the retrieved reference implementations; callers running against a
/// different network configuration build their own `ProtocolParams`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolParams {
    pub core_count: u32,
    pub validators_count: u32,
    pub epoch_length: u32,
    pub max_authorizations_queue_items: u32,
    pub total_gas_alloc_accumulation: u64,
    pub gas_alloc_accumulation: u64,
    pub transfer_memo_size: usize,
    pub preimage_expungement_period: u32,
    pub min_balance_per_item: u64,
    pub min_balance_per_octet: u64,
    pub min_public_service_id: ServiceId,
    /// Base gas charged by the host-call dispatcher before running a handler.
    pub host_call_base_gas: u64,
    /// Minimum number of distinct services in a batch before invocation runs
    /// as a scatter-gather over independently cloned contexts.
    pub parallel_threshold: usize,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            core_count: 341,
            validators_count: 1023,
            epoch_length: 600,
            max_authorizations_queue_items: 80,
            total_gas_alloc_accumulation: 3_500_000_000,
            gas_alloc_accumulation: 10_000_000,
            transfer_memo_size: 128,
            preimage_expungement_period: 19_200,
            min_balance_per_item: 10,
            min_balance_per_octet: 1,
            min_public_service_id: 65_536,
            host_call_base_gas: 10,
            parallel_threshold: 2,
        }
    }
}

impl ProtocolParams {
    /// Storage-footprint deposit threshold `a_t = per_item*items + per_octet*bytes`.
    pub fn storage_threshold(&self, items: u32, bytes: u64) -> u64 {
        self.min_balance_per_item
            .saturating_mul(items as u64)
            .saturating_add(self.min_balance_per_octet.saturating_mul(bytes))
    }
}
