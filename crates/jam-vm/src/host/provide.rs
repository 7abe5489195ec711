// Path: crates/jam-vm/src/host/provide.rs

use jam_state::AccumulationContext;
use jam_types::ServiceId;

use crate::codes::ReturnCode;
use crate::execution::{ExecutionContext, Trap};
use crate::memory::Memory;

/// Stages a preimage blob for a target service (self if `service_id_reg`
/// is `u64::MAX`). The bytes are held in `provided_preimages`, not written
/// into the account, and are only materialized after the outer loop
/// finishes if the lookup is still `[]` at that point.
pub fn provide(
    ctx: &AccumulationContext,
    ec: &mut ExecutionContext,
    mem: &dyn Memory,
    self_id: ServiceId,
    service_id_reg: u64,
    data_ptr: u32,
    size: u32,
) -> Result<ReturnCode, Trap> {
    let target = if service_id_reg == u64::MAX {
        self_id
    } else {
        service_id_reg as ServiceId
    };

    let data = mem.read(data_ptr, size).ok_or(Trap::Panic)?;

    let Some(account) = ctx.service_accounts.get_read_only(target) else {
        return Ok(ReturnCode::Who);
    };
    let hash = jam_crypto::keccak256(&data);
    let key = (hash, size as u64);
    let Some(status) = account.preimage_lookup.get(&key) else {
        return Ok(ReturnCode::Huh);
    };
    if !status.is_requested() {
        return Ok(ReturnCode::Huh);
    }
    if ec.provided_preimages.contains_key(&(target, key)) {
        return Ok(ReturnCode::Huh);
    }

    ec.provided_preimages.insert((target, key), data);
    Ok(ReturnCode::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::LinearMemory;
    use crate::testutil::{account, simple_context};
    use jam_types::PreimageStatus;

    #[test]
    fn stages_bytes_for_requested_entry() {
        let data = b"hello";
        let hash = jam_crypto::keccak256(data);
        let mut acc = account(1_000);
        acc.preimage_lookup
            .insert((hash, data.len() as u64), PreimageStatus::requested());
        let ctx = simple_context(vec![(7, acc)]);
        let mut ec = ExecutionContext::new(7, 10_000, 65_536);
        let mut mem = LinearMemory::new(64);
        mem.write(0, data);

        let code = provide(&ctx, &mut ec, &mem, 7, u64::MAX, 0, data.len() as u32).unwrap();

        assert_eq!(code, ReturnCode::Ok);
        assert_eq!(
            ec.provided_preimages
                .get(&(7, (hash, data.len() as u64)))
                .unwrap(),
            data
        );
    }

    #[test]
    fn duplicate_provision_within_accumulation_is_huh() {
        let data = b"hello";
        let hash = jam_crypto::keccak256(data);
        let mut acc = account(1_000);
        acc.preimage_lookup
            .insert((hash, data.len() as u64), PreimageStatus::requested());
        let ctx = simple_context(vec![(7, acc)]);
        let mut ec = ExecutionContext::new(7, 10_000, 65_536);
        let mut mem = LinearMemory::new(64);
        mem.write(0, data);

        provide(&ctx, &mut ec, &mem, 7, u64::MAX, 0, data.len() as u32).unwrap();
        let code = provide(&ctx, &mut ec, &mem, 7, u64::MAX, 0, data.len() as u32).unwrap();
        assert_eq!(code, ReturnCode::Huh);
    }

    #[test]
    fn no_pending_request_is_huh() {
        let ctx = simple_context(vec![(7, account(1_000))]);
        let mut ec = ExecutionContext::new(7, 10_000, 65_536);
        let mut mem = LinearMemory::new(64);
        mem.write(0, b"hello");

        let code = provide(&ctx, &mut ec, &mem, 7, u64::MAX, 0, 5).unwrap();
        assert_eq!(code, ReturnCode::Huh);
    }
}
