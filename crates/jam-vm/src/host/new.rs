// Path: crates/jam-vm/src/host/new.rs

use jam_state::AccumulationContext;
use jam_types::{Hash32, ProtocolParams, ServiceAccount, ServiceId};

use crate::codes::ReturnCode;
use crate::execution::{ExecutionContext, Trap};
use crate::memory::Memory;

const NEW_SERVICE_ITEMS: u32 = 2;
const OCTETS_BASE: u64 = 81;

fn min_balance(params: &ProtocolParams, items: u32, octets: u64, gratis: u64) -> u64 {
    let deposit = 100u64
        .saturating_add(params.min_balance_per_item.saturating_mul(items as u64))
        .saturating_add(params.min_balance_per_octet.saturating_mul(octets));
    deposit.saturating_sub(gratis)
}

/// Advances a candidate id past any already-occupied one, wrapping within
/// the public id range. Mirrors the Gray Paper's `check`/`get_next_free_id`
/// step used to derive an auto-advancing service id.
fn advance_past_occupied(ctx: &AccumulationContext, params: &ProtocolParams, mut id: u64) -> u64 {
    let min_pub = params.min_public_service_id as u64;
    let modulus = (1u64 << 32) - 256 - min_pub;
    loop {
        if ctx.service_accounts.get_read_only(id as u32).is_none() {
            return id;
        }
        id = min_pub + ((id - min_pub + 1) % modulus);
    }
}

fn next_free_id(ctx: &AccumulationContext, params: &ProtocolParams, current: ServiceId) -> ServiceId {
    let min_pub = params.min_public_service_id as u64;
    let modulus = (1u64 << 32) - 256 - min_pub;
    let candidate = min_pub + ((current as u64 - min_pub + 42) % modulus);
    advance_past_occupied(ctx, params, candidate) as u32
}

/// Creates a new service account. Reserved ids (below `min_public_service_id`)
/// require the caller to be the registrar; a nonzero `gratis` subsidy
/// requires the caller to be the manager.
#[allow(clippy::too_many_arguments)]
pub fn new_service(
    ctx: &mut AccumulationContext,
    ec: &mut ExecutionContext,
    mem: &dyn Memory,
    params: &ProtocolParams,
    self_id: ServiceId,
    code_hash_ptr: u32,
    expected_code_length: u64,
    min_gas_accumulate: u64,
    min_gas_on_transfer: u64,
    gratis: u64,
    desired_id: ServiceId,
) -> Result<(ReturnCode, Option<ServiceId>), Trap> {
    let data = mem.read(code_hash_ptr, 32).ok_or(Trap::Panic)?;
    let mut code_hash: Hash32 = [0u8; 32];
    code_hash.copy_from_slice(&data);

    let privileges = ctx.privileges.get_read_only();
    let is_manager = privileges.manager == self_id;
    let is_registrar = privileges.registrar == self_id;

    if gratis != 0 && !is_manager {
        return Ok((ReturnCode::Huh, None));
    }

    let new_octets = OCTETS_BASE + expected_code_length;
    let new_min_balance = min_balance(params, NEW_SERVICE_ITEMS, new_octets, gratis);

    let Some(current) = ctx.service_accounts.get_read_only(self_id) else {
        return Ok((ReturnCode::Huh, None));
    };
    if current.balance < new_min_balance {
        return Ok((ReturnCode::Cash, None));
    }
    let balance_after = current.balance - new_min_balance;
    let current_threshold =
        current.storage_threshold(params.min_balance_per_item, params.min_balance_per_octet);
    if balance_after < current_threshold {
        return Ok((ReturnCode::Cash, None));
    }

    let use_reserved = gratis == 0 && is_registrar && desired_id < params.min_public_service_id;
    let new_id = if use_reserved {
        if ctx.service_accounts.get_read_only(desired_id).is_some() {
            return Ok((ReturnCode::Full, None));
        }
        desired_id
    } else {
        ec.next_free_service_id
    };

    let mut account = ServiceAccount::new(code_hash, ctx.time.slot, self_id);
    account.balance = new_min_balance;
    account.min_gas_accumulate = min_gas_accumulate;
    account.min_gas_on_transfer = min_gas_on_transfer;
    account.footprint_items = NEW_SERVICE_ITEMS;
    account.footprint_bytes = new_octets;

    if let Ok(source) = ctx.service_accounts.get_mutable(self_id) {
        source.balance = balance_after;
    }
    // Newly-created account cannot already exist on the auto-advancing path
    // (next_free_id skips occupied ids); the reserved path was checked above.
    let _ = ctx.service_accounts.create_service(new_id, account);

    if !use_reserved {
        ec.next_free_service_id = next_free_id(ctx, params, new_id);
    }

    Ok((ReturnCode::Ok, Some(new_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::LinearMemory;
    use crate::testutil::{account, context_with};
    use jam_types::Privileges;

    #[test]
    fn creates_account_at_auto_advancing_id_and_debits_caller() {
        let params = ProtocolParams::default();
        let mut ctx = context_with(vec![(1, account(1_000_000))], Privileges::new(2));
        let mut ec = ExecutionContext::new(1, 1_000_000, params.min_public_service_id);
        let mut mem = LinearMemory::new(64);
        mem.write(0, &[5u8; 32]);

        let (code, new_id) =
            new_service(&mut ctx, &mut ec, &mem, &params, 1, 0, 16, 100, 100, 0, 0).unwrap();

        assert_eq!(code, ReturnCode::Ok);
        let new_id = new_id.unwrap();
        assert!(ctx.service_accounts.get_read_only(new_id).is_some());
        assert!(ctx.service_accounts.get_read_only(1).unwrap().balance < 1_000_000);
    }

    #[test]
    fn reserved_id_requires_registrar() {
        let params = ProtocolParams::default();
        let mut ctx = context_with(vec![(1, account(1_000_000))], Privileges::new(2));
        let mut ec = ExecutionContext::new(1, 1_000_000, params.min_public_service_id);
        let mut mem = LinearMemory::new(64);
        mem.write(0, &[5u8; 32]);

        // self_id=1 is not the registrar, desired_id=10 is below min_public -> falls
        // back to the auto-advancing path rather than claiming the reserved id.
        let (code, new_id) =
            new_service(&mut ctx, &mut ec, &mem, &params, 1, 0, 16, 100, 100, 0, 10).unwrap();
        assert_eq!(code, ReturnCode::Ok);
        assert_ne!(new_id.unwrap(), 10);
    }

    #[test]
    fn insufficient_balance_is_cash() {
        let params = ProtocolParams::default();
        let mut ctx = context_with(vec![(1, account(1))], Privileges::new(2));
        let mut ec = ExecutionContext::new(1, 1_000_000, params.min_public_service_id);
        let mut mem = LinearMemory::new(64);
        mem.write(0, &[5u8; 32]);

        let (code, new_id) =
            new_service(&mut ctx, &mut ec, &mem, &params, 1, 0, 16, 100, 100, 0, 0).unwrap();
        assert_eq!(code, ReturnCode::Cash);
        assert!(new_id.is_none());
    }
}
