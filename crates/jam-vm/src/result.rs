// Path: crates/jam-vm/src/result.rs

use std::collections::BTreeMap;

use jam_state::AccumulationContext;
use jam_types::{Hash32, PreimageKey, ServiceId, TransferOperand};

/// Per-service output of one invocation, ready for deterministic application
/// to the outer context by the engine.
pub struct AccumulationResult {
    pub gas_used: u64,
    pub collapsed_dimension: AccumulationContext,
    pub generated_transfers: Vec<TransferOperand>,
    pub accumulation_output: Option<Hash32>,
    pub provided_preimages: BTreeMap<(ServiceId, PreimageKey), Vec<u8>>,
}
