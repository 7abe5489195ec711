// Path: crates/jam-vm/src/host/bless.rs

use jam_state::AccumulationContext;
use jam_types::ServiceId;

use crate::execution::Trap;
use crate::memory::Memory;

/// Overwrites all privileges. Meaningful only when the caller is the
/// current manager; if it is not, the R-merge overwrites this edit later,
/// so no manager check happens here.
#[allow(clippy::too_many_arguments)]
pub fn bless(
    ctx: &mut AccumulationContext,
    mem: &dyn Memory,
    manager: ServiceId,
    assign_ptr: u32,
    designate: ServiceId,
    registrar: ServiceId,
    always_accumulate_ptr: u32,
    n: u64,
    core_count: u32,
) -> Result<(), Trap> {
    let assigners_len = core_count as u32 * 4;
    let assigners_data = mem.read(assign_ptr, assigners_len).ok_or(Trap::Panic)?;

    let entry_len = 12u32;
    let entries_len = (n as u32).saturating_mul(entry_len);
    let entries_data = mem
        .read(always_accumulate_ptr, entries_len)
        .ok_or(Trap::Panic)?;

    let mut assign = Vec::with_capacity(core_count as usize);
    for chunk in assigners_data.chunks_exact(4) {
        assign.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    let mut always_accumulate = std::collections::BTreeMap::new();
    for chunk in entries_data.chunks_exact(12) {
        let service_id = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let gas = u64::from_le_bytes([
            chunk[4], chunk[5], chunk[6], chunk[7], chunk[8], chunk[9], chunk[10], chunk[11],
        ]);
        always_accumulate.insert(service_id, gas);
    }

    let privileges = ctx.privileges.get_mutable();
    privileges.manager = manager;
    privileges.designate = designate;
    privileges.registrar = registrar;
    privileges.assign = assign;
    privileges.always_accumulate = always_accumulate;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{LinearMemory, Memory};
    use crate::testutil::simple_context;

    #[test]
    fn overwrites_all_privileges_from_encoded_memory() {
        let mut ctx = simple_context(vec![]);
        let mut mem = LinearMemory::new(256);
        // two assigners (core_count = 2)
        mem.write(0, &10u32.to_le_bytes());
        mem.write(4, &11u32.to_le_bytes());
        // one always_accumulate entry: (service_id=5, gas=9000)
        mem.write(8, &5u32.to_le_bytes());
        mem.write(12, &9_000u64.to_le_bytes());

        bless(&mut ctx, &mem, 1, 0, 2, 3, 8, 1, 2).unwrap();

        let privileges = ctx.privileges.get_read_only();
        assert_eq!(privileges.manager, 1);
        assert_eq!(privileges.designate, 2);
        assert_eq!(privileges.registrar, 3);
        assert_eq!(privileges.assign, vec![10, 11]);
        assert_eq!(privileges.always_accumulate.get(&5), Some(&9_000));
    }
}
