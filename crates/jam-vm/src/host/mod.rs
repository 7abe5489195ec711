// Path: crates/jam-vm/src/host/mod.rs

mod assign;
mod bless;
mod checkpoint;
mod designate;
mod eject;
mod fetch;
mod forget;
mod new;
mod provide;
mod query;
mod solicit;
mod storage;
mod transfer;
mod upgrade;
mod yield_call;

use jam_types::{AccumulationOperand, ProtocolParams, ServiceId, TransferOperand};

use crate::codes::ReturnCode;
use crate::dual::DualDimension;
use crate::execution::{ExecutionContext, Trap};
use crate::memory::Memory;

/// One accumulate-context host call, carrying its typed register arguments.
/// Argument names follow the register order a caller would load before
/// trapping into the host; the dispatcher itself does not interpret raw
/// register arrays, since the VM instruction set this would be decoded from
/// is out of scope here.
#[derive(Clone)]
#[allow(clippy::large_enum_variant)]
pub enum HostCall {
    Gas,
    Lookup {
        service_id_reg: u64,
        hash_ptr: u32,
        out_ptr: u32,
        offset: u32,
        len: u32,
    },
    Read {
        service_id_reg: u64,
        key_ptr: u32,
        key_len: u32,
        out_ptr: u32,
        offset: u32,
        len: u32,
    },
    Write {
        key_ptr: u32,
        key_len: u32,
        value_ptr: u32,
        value_len: u32,
    },
    Info {
        service_id_reg: u64,
        out_ptr: u32,
    },
    Bless {
        manager: ServiceId,
        assign_ptr: u32,
        designate: ServiceId,
        registrar: ServiceId,
        always_accumulate_ptr: u32,
        n: u64,
    },
    Assign {
        core: u32,
        auth_queue_ptr: u32,
        new_assigner: u64,
        queue_length: u32,
    },
    Designate {
        offset_ptr: u32,
    },
    Checkpoint,
    New {
        code_hash_ptr: u32,
        expected_code_length: u64,
        min_gas_accumulate: u64,
        min_gas_on_transfer: u64,
        gratis: u64,
        desired_id: ServiceId,
    },
    Upgrade {
        code_hash_ptr: u32,
        min_gas_accumulate: u64,
        min_gas_on_transfer: u64,
    },
    Transfer {
        dest: ServiceId,
        amount: u64,
        gas_limit: u64,
        memo_ptr: u32,
    },
    Eject {
        target_id: ServiceId,
        hash_ptr: u32,
    },
    Query {
        hash_ptr: u32,
        size: u64,
    },
    Solicit {
        hash_ptr: u32,
        size: u64,
    },
    Forget {
        hash_ptr: u32,
        size: u64,
    },
    Yield {
        hash_ptr: u32,
    },
    Provide {
        service_id_reg: u64,
        data_ptr: u32,
        size: u32,
    },
    Fetch {
        out_ptr: u32,
        offset: u32,
        limit: u32,
        selector: u32,
        index: u32,
    },
}

/// Two registers of output: `(register 7, an auxiliary value when the call
/// produces one — e.g. `new`'s allocated id, `query`'s second register)`.
pub struct HostOutcome {
    pub a: u64,
    pub b: u64,
}

impl HostOutcome {
    fn code(code: ReturnCode) -> Self {
        Self {
            a: code.to_register(),
            b: 0,
        }
    }

    fn pair(a: u64, b: u64) -> Self {
        Self { a, b }
    }
}

/// The call's name, for logging only — kept as a `match` rather than a
/// `Debug` derive so the dispatch hot path never pays for formatting a
/// call's register arguments, only its name.
fn call_name(call: &HostCall) -> &'static str {
    match call {
        HostCall::Gas => "gas",
        HostCall::Lookup { .. } => "lookup",
        HostCall::Read { .. } => "read",
        HostCall::Write { .. } => "write",
        HostCall::Info { .. } => "info",
        HostCall::Bless { .. } => "bless",
        HostCall::Assign { .. } => "assign",
        HostCall::Designate { .. } => "designate",
        HostCall::Checkpoint => "checkpoint",
        HostCall::New { .. } => "new",
        HostCall::Upgrade { .. } => "upgrade",
        HostCall::Transfer { .. } => "transfer",
        HostCall::Eject { .. } => "eject",
        HostCall::Query { .. } => "query",
        HostCall::Solicit { .. } => "solicit",
        HostCall::Forget { .. } => "forget",
        HostCall::Yield { .. } => "yield",
        HostCall::Provide { .. } => "provide",
        HostCall::Fetch { .. } => "fetch",
    }
}

/// Charges the fixed base gas then dispatches to the matching handler.
/// `dd.regular` is the context every non-`checkpoint` call mutates;
/// `checkpoint` additionally touches `dd.exceptional`.
#[allow(clippy::too_many_arguments)]
pub fn dispatch(
    call: HostCall,
    dd: &mut DualDimension,
    ec: &mut ExecutionContext,
    mem: &mut dyn Memory,
    params: &ProtocolParams,
    self_id: ServiceId,
    incoming_transfers: &[TransferOperand],
    operands: &[AccumulationOperand],
) -> Result<HostOutcome, Trap> {
    tracing::debug!(target: "jam_vm::host", call = call_name(&call), service = self_id, "dispatching host call");
    ec.charge_base_gas(params.host_call_base_gas)?;
    let ctx = &mut dd.regular;

    match call {
        HostCall::Gas => Ok(HostOutcome::pair(storage::gas(ec), 0)),
        HostCall::Lookup {
            service_id_reg,
            hash_ptr,
            out_ptr,
            offset,
            len,
        } => {
            let v = storage::lookup(ctx, mem, self_id, service_id_reg, hash_ptr, out_ptr, offset, len)?;
            Ok(HostOutcome::pair(v, 0))
        }
        HostCall::Read {
            service_id_reg,
            key_ptr,
            key_len,
            out_ptr,
            offset,
            len,
        } => {
            let v = storage::read(
                ctx,
                mem,
                self_id,
                service_id_reg,
                key_ptr,
                key_len,
                out_ptr,
                offset,
                len,
            )?;
            Ok(HostOutcome::pair(v, 0))
        }
        HostCall::Write {
            key_ptr,
            key_len,
            value_ptr,
            value_len,
        } => {
            let v = storage::write(ctx, params, mem, self_id, key_ptr, key_len, value_ptr, value_len)?;
            Ok(HostOutcome::pair(v, 0))
        }
        HostCall::Info {
            service_id_reg,
            out_ptr,
        } => {
            let v = storage::info(ctx, mem, self_id, service_id_reg, out_ptr)?;
            Ok(HostOutcome::pair(v, 0))
        }
        HostCall::Bless {
            manager,
            assign_ptr,
            designate,
            registrar,
            always_accumulate_ptr,
            n,
        } => {
            bless::bless(
                ctx,
                mem,
                manager,
                assign_ptr,
                designate,
                registrar,
                always_accumulate_ptr,
                n,
                params.core_count,
            )?;
            Ok(HostOutcome::code(ReturnCode::Ok))
        }
        HostCall::Assign {
            core,
            auth_queue_ptr,
            new_assigner,
            queue_length,
        } => {
            let code = assign::assign(
                ctx,
                mem,
                self_id,
                core,
                auth_queue_ptr,
                new_assigner,
                params.core_count,
                queue_length,
            )?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Designate { offset_ptr } => {
            let code = designate::designate(ctx, mem, self_id, offset_ptr, params.validators_count)?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Checkpoint => {
            let remaining = checkpoint::checkpoint(dd, ec)?;
            Ok(HostOutcome::pair(remaining, 0))
        }
        HostCall::New {
            code_hash_ptr,
            expected_code_length,
            min_gas_accumulate,
            min_gas_on_transfer,
            gratis,
            desired_id,
        } => {
            let ctx = &mut dd.regular;
            let (code, new_id) = new::new_service(
                ctx,
                ec,
                mem,
                params,
                self_id,
                code_hash_ptr,
                expected_code_length,
                min_gas_accumulate,
                min_gas_on_transfer,
                gratis,
                desired_id,
            )?;
            Ok(HostOutcome::pair(
                code.to_register(),
                new_id.map(|id| id as u64).unwrap_or(0),
            ))
        }
        HostCall::Upgrade {
            code_hash_ptr,
            min_gas_accumulate,
            min_gas_on_transfer,
        } => {
            let code = upgrade::upgrade(ctx, mem, self_id, code_hash_ptr, min_gas_accumulate, min_gas_on_transfer)?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Transfer {
            dest,
            amount,
            gas_limit,
            memo_ptr,
        } => {
            let ctx = &mut dd.regular;
            let code = transfer::transfer(ctx, ec, mem, params, self_id, dest, amount, gas_limit, memo_ptr)?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Eject { target_id, hash_ptr } => {
            let now = ctx.time.slot;
            let code = eject::eject(ctx, mem, params, self_id, target_id, hash_ptr, now)?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Query { hash_ptr, size } => {
            let (a, b) = query::query(ctx, mem, self_id, hash_ptr, size)?;
            Ok(HostOutcome::pair(a, b))
        }
        HostCall::Solicit { hash_ptr, size } => {
            let now = ctx.time.slot;
            let code = solicit::solicit(ctx, mem, params, self_id, hash_ptr, size, now)?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Forget { hash_ptr, size } => {
            let now = ctx.time.slot;
            let code = forget::forget(ctx, mem, params, self_id, hash_ptr, size, now)?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Yield { hash_ptr } => {
            yield_call::yield_output(ec, mem, hash_ptr)?;
            Ok(HostOutcome::code(ReturnCode::Ok))
        }
        HostCall::Provide {
            service_id_reg,
            data_ptr,
            size,
        } => {
            let code = provide::provide(ctx, ec, mem, self_id, service_id_reg, data_ptr, size)?;
            Ok(HostOutcome::code(code))
        }
        HostCall::Fetch {
            out_ptr,
            offset,
            limit,
            selector,
            index,
        } => {
            let v = fetch::fetch(
                mem,
                params,
                ctx.entropy,
                incoming_transfers,
                operands,
                out_ptr,
                offset,
                limit,
                selector,
                index,
            )?;
            Ok(HostOutcome::pair(v, 0))
        }
    }
}
