// Path: crates/jam-vm/src/host/assign.rs

use jam_state::AccumulationContext;
use jam_types::{Hash32, ServiceId};

use crate::codes::ReturnCode;
use crate::execution::Trap;
use crate::memory::Memory;

/// Overwrites a core's authorizer queue and records its new assigner. Fails
/// `CORE` if the core index is out of range, `HUH` if the caller is not
/// currently that core's assigner, `WHO` if the new assigner id is invalid.
#[allow(clippy::too_many_arguments)]
pub fn assign(
    ctx: &mut AccumulationContext,
    mem: &dyn Memory,
    self_id: ServiceId,
    core: u32,
    auth_queue_ptr: u32,
    new_assigner: u64,
    core_count: u32,
    queue_length: u32,
) -> Result<ReturnCode, Trap> {
    if core >= core_count {
        return Ok(ReturnCode::Core);
    }
    if new_assigner > u32::MAX as u64 {
        return Ok(ReturnCode::Who);
    }

    let privileges = ctx.privileges.get_read_only();
    let current_assigner = privileges.assign.get(core as usize).copied().unwrap_or(0);
    if current_assigner != self_id {
        return Ok(ReturnCode::Huh);
    }

    let data = mem
        .read(auth_queue_ptr, queue_length * 32)
        .ok_or(Trap::Panic)?;
    let mut queue = Vec::with_capacity(queue_length as usize);
    for chunk in data.chunks_exact(32) {
        let mut hash: Hash32 = [0u8; 32];
        hash.copy_from_slice(chunk);
        queue.push(hash);
    }

    let authorizer_queue = ctx.authorizer_queue.get_mutable();
    if let Some(slot) = authorizer_queue.cores.get_mut(core as usize) {
        *slot = queue;
    }

    ctx.privileges.get_mutable().assign[core as usize] = new_assigner as u32;
    Ok(ReturnCode::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::LinearMemory;
    use crate::testutil::context_with;
    use jam_types::Privileges;

    fn privileges_with_assigner(core_count: usize, core: usize, assigner: ServiceId) -> Privileges {
        let mut p = Privileges::new(core_count);
        p.assign[core] = assigner;
        p
    }

    #[test]
    fn overwrites_queue_and_assigner_when_caller_is_current_assigner() {
        let mut ctx = context_with(vec![], privileges_with_assigner(2, 0, 7));
        let mut mem = LinearMemory::new(128);
        mem.write(0, &[9u8; 32]);

        let code = assign(&mut ctx, &mem, 7, 0, 0, 42, 2, 1).unwrap();

        assert_eq!(code, ReturnCode::Ok);
        assert_eq!(ctx.authorizer_queue.get_read_only().cores[0], vec![[9u8; 32]]);
        assert_eq!(ctx.privileges.get_read_only().assign[0], 42);
    }

    #[test]
    fn wrong_caller_is_huh() {
        let mut ctx = context_with(vec![], privileges_with_assigner(2, 0, 7));
        let mem = LinearMemory::new(128);
        let code = assign(&mut ctx, &mem, 8, 0, 0, 42, 2, 0).unwrap();
        assert_eq!(code, ReturnCode::Huh);
    }

    #[test]
    fn out_of_range_core_is_core() {
        let mut ctx = context_with(vec![], Privileges::new(2));
        let mem = LinearMemory::new(128);
        let code = assign(&mut ctx, &mem, 7, 5, 0, 42, 2, 0).unwrap();
        assert_eq!(code, ReturnCode::Core);
    }
}
