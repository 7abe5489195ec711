// Path: crates/jam-vm/src/script.rs

use jam_state::AccumulationContext;
use jam_types::{AccumulationOperand, ProtocolParams, ServiceId, TransferOperand};

use crate::boundary::ServiceVm;
use crate::dual::DualDimension;
use crate::execution::ExecutionContext;
use crate::host::{dispatch, HostCall};
use crate::memory::Memory;
use crate::result::AccumulationResult;

/// A `ServiceVm` whose "program" is a fixed, ordered list of host calls
/// rather than compiled code, standing in for a service's sandboxed
/// execution in tests and in callers without a real instruction-set
/// interpreter. Runs the list in order, stopping at the first trap.
pub struct ScriptedVm {
    pub calls: Vec<HostCall>,
}

impl ScriptedVm {
    pub fn new(calls: Vec<HostCall>) -> Self {
        Self { calls }
    }
}

impl ServiceVm for ScriptedVm {
    fn invoke(
        &self,
        params: &ProtocolParams,
        memory: &mut dyn Memory,
        context: AccumulationContext,
        service_id: ServiceId,
        gas_limit: u64,
        next_free_service_id: ServiceId,
        operands: &[AccumulationOperand],
        incoming_transfers: &[TransferOperand],
    ) -> AccumulationResult {
        let mut dd = DualDimension::new(context);
        let mut ec = ExecutionContext::new(service_id, gas_limit, next_free_service_id);
        let mut trapped = false;

        for call in self.calls.clone() {
            if dispatch(
                call,
                &mut dd,
                &mut ec,
                memory,
                params,
                service_id,
                incoming_transfers,
                operands,
            )
            .is_err()
            {
                trapped = true;
                break;
            }
        }

        let gas_used = if trapped {
            gas_limit
        } else {
            gas_limit.saturating_sub(ec.gas_remaining.max(0) as u64)
        };

        AccumulationResult {
            gas_used,
            collapsed_dimension: dd.collapse(trapped),
            generated_transfers: ec.generated_transfers,
            accumulation_output: ec.accumulation_output,
            provided_preimages: ec.provided_preimages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{AuthorizerQueue, Privileges, ServiceAccount, TimeInfo, ValidatorKeys};
    use jam_state::DeltaSnapshot;
    use std::collections::BTreeMap;

    fn context_with(service_id: ServiceId, account: ServiceAccount) -> AccumulationContext {
        let mut accounts = BTreeMap::new();
        accounts.insert(service_id, account);
        AccumulationContext::new(
            DeltaSnapshot::new(accounts),
            ValidatorKeys::new(),
            AuthorizerQueue::new(2),
            Privileges::new(2),
            TimeInfo::new(100),
            [0u8; 32],
        )
    }

    #[test]
    fn yield_call_records_output() {
        let params = ProtocolParams::default();
        let mut account = ServiceAccount::new([0u8; 32], 0, 0);
        account.balance = 1_000;
        let ctx = context_with(7, account);

        let mut mem = crate::memory::LinearMemory::new(64);
        mem.write(0, &[9u8; 32]);

        let vm = ScriptedVm::new(vec![HostCall::Yield { hash_ptr: 0 }]);
        let result = vm.invoke(&params, &mut mem, ctx, 7, 1_000, 65_536, &[], &[]);

        assert_eq!(result.accumulation_output, Some([9u8; 32]));
        assert!(result.gas_used > 0);
    }

    #[test]
    fn out_of_gas_collapses_to_exceptional() {
        let params = ProtocolParams::default();
        let account = ServiceAccount::new([0u8; 32], 0, 0);
        let ctx = context_with(3, account);
        let mut mem = crate::memory::LinearMemory::new(64);

        let vm = ScriptedVm::new(vec![HostCall::Gas, HostCall::Gas]);
        let result = vm.invoke(&params, &mut mem, ctx, 3, 5, 65_536, &[], &[]);

        assert_eq!(result.gas_used, 5);
    }
}
