// Path: crates/jam-vm/src/host/query.rs

use jam_state::AccumulationContext;
use jam_types::{Hash32, ServiceId};

use crate::codes::ReturnCode;
use crate::execution::Trap;
use crate::memory::Memory;

/// Encodes a preimage's lookup status into two registers: the first is
/// `|status| + (status[0] << 32)`, the second `status[1] + (status[2] << 32)`.
/// `NONE` (with the second register zero) if no such request exists.
pub fn query(
    ctx: &AccumulationContext,
    mem: &dyn Memory,
    self_id: ServiceId,
    hash_ptr: u32,
    size: u64,
) -> Result<(u64, u64), Trap> {
    let data = mem.read(hash_ptr, 32).ok_or(Trap::Panic)?;
    let mut hash: Hash32 = [0u8; 32];
    hash.copy_from_slice(&data);

    let Some(account) = ctx.service_accounts.get_read_only(self_id) else {
        return Ok((ReturnCode::None.to_register(), 0));
    };
    match account.preimage_lookup.get(&(hash, size)) {
        Some(status) => Ok(status.encode_registers()),
        None => Ok((ReturnCode::None.to_register(), 0)),
    }
}
