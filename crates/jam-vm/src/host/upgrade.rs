// Path: crates/jam-vm/src/host/upgrade.rs

use jam_state::AccumulationContext;
use jam_types::{Hash32, ServiceId};

use crate::codes::ReturnCode;
use crate::execution::Trap;
use crate::memory::Memory;

/// Mutates the calling service's own code hash and gas minimums.
pub fn upgrade(
    ctx: &mut AccumulationContext,
    mem: &dyn Memory,
    self_id: ServiceId,
    code_hash_ptr: u32,
    min_gas_accumulate: u64,
    min_gas_on_transfer: u64,
) -> Result<ReturnCode, Trap> {
    let data = mem.read(code_hash_ptr, 32).ok_or(Trap::Panic)?;
    let mut code_hash: Hash32 = [0u8; 32];
    code_hash.copy_from_slice(&data);

    let Ok(account) = ctx.service_accounts.get_mutable(self_id) else {
        return Ok(ReturnCode::Huh);
    };
    account.code_hash = code_hash;
    account.min_gas_accumulate = min_gas_accumulate;
    account.min_gas_on_transfer = min_gas_on_transfer;
    Ok(ReturnCode::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::LinearMemory;
    use crate::testutil::{account, simple_context};

    #[test]
    fn mutates_own_code_and_gas_minimums() {
        let mut ctx = simple_context(vec![(1, account(0))]);
        let mut mem = LinearMemory::new(64);
        mem.write(0, &[8u8; 32]);

        let code = upgrade(&mut ctx, &mem, 1, 0, 500, 600).unwrap();

        assert_eq!(code, ReturnCode::Ok);
        let acc = ctx.service_accounts.get_read_only(1).unwrap();
        assert_eq!(acc.code_hash, [8u8; 32]);
        assert_eq!(acc.min_gas_accumulate, 500);
        assert_eq!(acc.min_gas_on_transfer, 600);
    }
}
