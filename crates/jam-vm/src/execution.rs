// Path: crates/jam-vm/src/execution.rs

use std::collections::BTreeMap;

use jam_types::{Hash32, PreimageKey, ServiceId, TransferOperand};

/// A VM terminal: either path ends the current service's invocation and is
/// reported to batch reconciliation rather than retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    Panic,
    OutOfGas,
}

/// Per-invocation bookkeeping threaded through every host call: gas
/// accounting, transfers generated so far, the recorded yield, and staged
/// preimage provisions not yet materialized into any account.
pub struct ExecutionContext {
    pub service_id: ServiceId,
    pub gas_remaining: i64,
    pub generated_transfers: Vec<TransferOperand>,
    pub accumulation_output: Option<Hash32>,
    pub provided_preimages: BTreeMap<(ServiceId, PreimageKey), Vec<u8>>,
    /// Running id used by `new` to derive the next auto-advancing service id.
    pub next_free_service_id: ServiceId,
}

impl ExecutionContext {
    pub fn new(service_id: ServiceId, gas_limit: u64, next_free_service_id: ServiceId) -> Self {
        Self {
            service_id,
            gas_remaining: gas_limit as i64,
            generated_transfers: Vec::new(),
            accumulation_output: None,
            provided_preimages: BTreeMap::new(),
            next_free_service_id,
        }
    }

    /// Deducts the fixed base gas charged before every host call. Returns
    /// `Err(Trap::OutOfGas)` if this pushes the counter negative.
    pub fn charge_base_gas(&mut self, base_gas: u64) -> Result<(), Trap> {
        self.gas_remaining -= base_gas as i64;
        if self.gas_remaining < 0 {
            Err(Trap::OutOfGas)
        } else {
            Ok(())
        }
    }

    pub fn charge_additional_gas(&mut self, amount: u64) -> Result<(), Trap> {
        self.gas_remaining -= amount as i64;
        if self.gas_remaining < 0 {
            Err(Trap::OutOfGas)
        } else {
            Ok(())
        }
    }
}
