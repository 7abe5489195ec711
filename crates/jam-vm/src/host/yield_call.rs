// Path: crates/jam-vm/src/host/yield_call.rs

use jam_types::Hash32;

use crate::execution::{ExecutionContext, Trap};
use crate::memory::Memory;

/// Records a 32-byte accumulation output for the calling service.
pub fn yield_output(
    ec: &mut ExecutionContext,
    mem: &dyn Memory,
    hash_ptr: u32,
) -> Result<(), Trap> {
    let data = mem.read(hash_ptr, 32).ok_or(Trap::Panic)?;
    let mut hash: Hash32 = [0u8; 32];
    hash.copy_from_slice(&data);
    ec.accumulation_output = Some(hash);
    Ok(())
}
