// Path: crates/jam-vm/src/host/forget.rs

use jam_state::AccumulationContext;
use jam_types::{Hash32, PreimageStatus, ProtocolParams, ServiceId, Slot};

use crate::codes::ReturnCode;
use crate::execution::Trap;
use crate::memory::Memory;

const OCTETS_BASE: u64 = 81;

fn remove_request(account: &mut jam_types::ServiceAccount, key: (Hash32, u64)) {
    account.preimage_lookup.remove(&key);
    account.preimages.remove(&key.0);
    account.footprint_items = account.footprint_items.saturating_sub(2);
    account.footprint_bytes = account
        .footprint_bytes
        .saturating_sub(OCTETS_BASE + key.1);
}

/// Transitions a preimage's lookup status: `[]` removes it outright;
/// `[t0]` marks it forgotten as `[t0,now]`; `[t0,t1,t2]` collapses to
/// `[t2,now]` once `t1` has passed the expungement period, else `HUH`.
pub fn forget(
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
    let key = (hash, size);

    let Ok(account) = ctx.service_accounts.get_mutable(self_id) else {
        return Ok(ReturnCode::Huh);
    };
    let Some(status) = account.preimage_lookup.get(&key).cloned() else {
        return Ok(ReturnCode::Huh);
    };

    match status.0.len() {
        0 => {
            remove_request(account, key);
        }
        2 => {
            let y = status.0[1];
            if (y as u64 + params.preimage_expungement_period as u64) < now as u64 {
                remove_request(account, key);
            } else {
                return Ok(ReturnCode::Huh);
            }
        }
        1 => {
            let x = status.0[0];
            account
                .preimage_lookup
                .insert(key, PreimageStatus(vec![x, now]));
        }
        3 => {
            let y = status.0[1];
            let w = status.0[2];
            if (y as u64 + params.preimage_expungement_period as u64) < now as u64 {
                account
                    .preimage_lookup
                    .insert(key, PreimageStatus(vec![w, now]));
            } else {
                return Ok(ReturnCode::Huh);
            }
        }
        _ => return Ok(ReturnCode::Huh),
    }

    Ok(ReturnCode::Ok)
}
