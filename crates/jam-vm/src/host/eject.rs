// Path: crates/jam-vm/src/host/eject.rs

use jam_state::AccumulationContext;
use jam_types::{encode_service_id_as_hash, Hash32, ProtocolParams, ServiceId, Slot};

use crate::codes::ReturnCode;
use crate::execution::Trap;
use crate::memory::Memory;

/// Removes `target` and credits its balance to the caller. Fails `WHO` if
/// `target` is the caller or its code hash is not the caller's own id
/// encoded as a hash; `HUH` if its footprint is not the two-item shape left
/// by a single solicited preimage, or the forgotten-since timeslot hasn't
/// yet passed the expungement period.
pub fn eject(
    ctx: &mut AccumulationContext,
    mem: &dyn Memory,
    params: &ProtocolParams,
    self_id: ServiceId,
    target_id: ServiceId,
    hash_ptr: u32,
    now: Slot,
) -> Result<ReturnCode, Trap> {
    let data = mem.read(hash_ptr, 32).ok_or(Trap::Panic)?;
    let mut hash: Hash32 = [0u8; 32];
    hash.copy_from_slice(&data);

    if target_id == self_id {
        return Ok(ReturnCode::Who);
    }
    let Some(target) = ctx.service_accounts.get_read_only(target_id) else {
        return Ok(ReturnCode::Who);
    };
    if target.code_hash != encode_service_id_as_hash(self_id) {
        return Ok(ReturnCode::Who);
    }
    if target.footprint_items != 2 {
        return Ok(ReturnCode::Huh);
    }
    let octets = target.footprint_bytes.saturating_sub(81);
    let Some(status) = target.preimage_lookup.get(&(hash, octets)) else {
        return Ok(ReturnCode::Huh);
    };
    if !status.is_forgotten() {
        return Ok(ReturnCode::Huh);
    }
    let forgotten_since = status.forgotten_since().unwrap_or(0);
    if forgotten_since as u64 + params.preimage_expungement_period as u64 >= now as u64 {
        return Ok(ReturnCode::Huh);
    }

    let balance = target.balance;
    ctx.service_accounts.remove_service(target_id);
    if let Ok(source) = ctx.service_accounts.get_mutable(self_id) {
        source.balance = source.balance.saturating_add(balance);
    }
    Ok(ReturnCode::Ok)
}
