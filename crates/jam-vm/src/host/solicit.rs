// Path: crates/jam-vm/src/host/solicit.rs

use jam_state::AccumulationContext;
use jam_types::{Hash32, PreimageStatus, ProtocolParams, ServiceId, Slot};

use crate::codes::ReturnCode;
use crate::execution::Trap;
use crate::memory::Memory;

const OCTETS_BASE: u64 = 81;

/// Requests a preimage: a fresh hash starts the `[]` lookup state; an
/// already-forgotten `[t0,t1]` entry is re-solicited into `[t0,t1,now]`.
/// Fails `FULL` if the resulting footprint would push the account below its
/// storage threshold, or if the hash is mid-lifecycle in any other shape.
pub fn solicit(
    ctx: &mut AccumulationContext,
    mem: &dyn Memory,
    params: &ProtocolParams,
    self_id: ServiceId,
    hash_ptr: u32,
    size: u64,
    now: Slot,
) -> Result<ReturnCode, Trap> {
    let data = mem.read(hash_ptr, 32).ok_or(Trap::Panic)?;
    let mut hash: Hash32 = [0u8; 32];
    hash.copy_from_slice(&data);

    let Ok(account) = ctx.service_accounts.get_mutable(self_id) else {
        return Ok(ReturnCode::Huh);
    };

    let key = (hash, size);
    let (new_status, is_new) = match account.preimage_lookup.get(&key) {
        None => (PreimageStatus(Vec::new()), true),
        Some(status) if status.is_forgotten() => {
            let mut timeslots = status.0.clone();
            timeslots.push(now);
            (PreimageStatus(timeslots), false)
        }
        Some(_) => return Ok(ReturnCode::Huh),
    };

    let (new_items, new_octets) = if is_new {
        (
            account.footprint_items + 2,
            account.footprint_bytes.saturating_add(OCTETS_BASE + size),
        )
    } else {
        (account.footprint_items, account.footprint_bytes)
    };

    let new_threshold = params
        .min_balance_per_item
        .saturating_mul(new_items as u64)
        .saturating_add(params.min_balance_per_octet.saturating_mul(new_octets));
    if new_threshold > account.balance {
        return Ok(ReturnCode::Full);
    }

    account.preimage_lookup.insert(key, new_status);
    if is_new {
        account.footprint_items = new_items;
        account.footprint_bytes = new_octets;
    }
    Ok(ReturnCode::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::LinearMemory;
    use crate::testutil::{account, simple_context};

    #[test]
    fn fresh_hash_starts_requested_lookup() {
        let params = ProtocolParams::default();
        let mut ctx = simple_context(vec![(1, account(1_000))]);
        let mut mem = LinearMemory::new(64);
        mem.write(0, &[7u8; 32]);

        let code = solicit(&mut ctx, &mem, &params, 1, 0, 10, 50).unwrap();

        assert_eq!(code, ReturnCode::Ok);
        let status = ctx
            .service_accounts
            .get_read_only(1)
            .unwrap()
            .preimage_lookup
            .get(&([7u8; 32], 10))
            .unwrap();
        assert!(status.is_requested());
    }

    #[test]
    fn re_solicit_appends_timeslot_to_forgotten_entry() {
        let params = ProtocolParams::default();
        let mut acc = account(1_000);
        acc.preimage_lookup
            .insert(([7u8; 32], 10), PreimageStatus(vec![1, 2]));
        let mut ctx = simple_context(vec![(1, acc)]);
        let mut mem = LinearMemory::new(64);
        mem.write(0, &[7u8; 32]);

        let code = solicit(&mut ctx, &mem, &params, 1, 0, 10, 99).unwrap();

        assert_eq!(code, ReturnCode::Ok);
        let status = ctx
            .service_accounts
            .get_read_only(1)
            .unwrap()
            .preimage_lookup
            .get(&([7u8; 32], 10))
            .unwrap();
        assert_eq!(status.0, vec![1, 2, 99]);
    }

    #[test]
    fn insufficient_balance_is_full() {
        let params = ProtocolParams::default();
        let mut ctx = simple_context(vec![(1, account(0))]);
        let mut mem = LinearMemory::new(64);
        mem.write(0, &[7u8; 32]);

        let code = solicit(&mut ctx, &mem, &params, 1, 0, 10, 50).unwrap();
        assert_eq!(code, ReturnCode::Full);
    }
}
