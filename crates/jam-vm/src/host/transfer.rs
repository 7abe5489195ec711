// Path: crates/jam-vm/src/host/transfer.rs

use jam_state::AccumulationContext;
use jam_types::{ProtocolParams, ServiceId, TransferOperand};

use crate::codes::ReturnCode;
use crate::execution::{ExecutionContext, Trap};
use crate::memory::Memory;

/// Debits the calling service and appends a `TransferOperand` for the
/// destination to consume in a later batch. Fails `WHO` if the destination
/// is unknown, `LOW` if the gas limit undercuts the destination's declared
/// minimum, `CASH` if the balance would drop below the storage threshold.
pub fn transfer(
    ctx: &mut AccumulationContext,
    ec: &mut ExecutionContext,
    mem: &dyn Memory,
    params: &ProtocolParams,
    self_id: ServiceId,
    dest: ServiceId,
    amount: u64,
    gas_limit: u64,
    memo_ptr: u32,
) -> Result<ReturnCode, Trap> {
    let memo = mem
        .read(memo_ptr, params.transfer_memo_size as u32)
        .ok_or(Trap::Panic)?;

    let Some(dest_account) = ctx.service_accounts.get_read_only(dest) else {
        return Ok(ReturnCode::Who);
    };
    if gas_limit < dest_account.min_gas_on_transfer {
        return Ok(ReturnCode::Low);
    }

    let Ok(source) = ctx.service_accounts.get_mutable(self_id) else {
        return Ok(ReturnCode::Huh);
    };
    if source.balance < amount {
        return Ok(ReturnCode::Cash);
    }
    let balance_after = source.balance - amount;
    let threshold =
        source.storage_threshold(params.min_balance_per_item, params.min_balance_per_octet);
    if balance_after < threshold {
        return Ok(ReturnCode::Cash);
    }
    source.balance = balance_after;

    ec.generated_transfers.push(TransferOperand {
        sender: self_id,
        destination: dest,
        amount,
        memo,
        gas_limit,
    });
    ec.charge_additional_gas(gas_limit)?;
    Ok(ReturnCode::Ok)
}
