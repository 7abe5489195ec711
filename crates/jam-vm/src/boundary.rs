// Path: crates/jam-vm/src/boundary.rs

use jam_state::AccumulationContext;
use jam_types::{AccumulationOperand, ProtocolParams, ServiceId, TransferOperand};

use crate::memory::Memory;
use crate::result::AccumulationResult;

/// The boundary a service's sandboxed code crosses into the engine. The
/// actual instruction set a service's code is compiled to is out of scope;
/// an implementation of this trait is responsible for running that code and
/// routing its host-call traps through `host::dispatch`.
pub trait ServiceVm: Sync + Send {
    #[allow(clippy::too_many_arguments)]
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
    ) -> AccumulationResult;
}
