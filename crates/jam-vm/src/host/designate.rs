// Path: crates/jam-vm/src/host/designate.rs

use jam_state::AccumulationContext;
use jam_types::{ServiceId, ValidatorKey, VALIDATOR_RECORD_SIZE};

use crate::codes::ReturnCode;
use crate::execution::Trap;
use crate::memory::Memory;

/// Overwrites the staged validator set. Only the privileged delegator may
/// call this; everyone else gets `HUH`.
pub fn designate(
    ctx: &mut AccumulationContext,
    mem: &dyn Memory,
    self_id: ServiceId,
    offset_ptr: u32,
    validators_count: u32,
) -> Result<ReturnCode, Trap> {
    if self_id != ctx.privileges.get_read_only().designate {
        return Ok(ReturnCode::Huh);
    }

    let total_size = VALIDATOR_RECORD_SIZE as u32 * validators_count;
    let data = mem.read(offset_ptr, total_size).ok_or(Trap::Panic)?;

    let mut validators = Vec::with_capacity(validators_count as usize);
    for chunk in data.chunks_exact(VALIDATOR_RECORD_SIZE) {
        if let Some(key) = ValidatorKey::from_bytes(chunk) {
            validators.push(key);
        }
    }
    *ctx.validator_keys.get_mutable() = validators;
    Ok(ReturnCode::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::LinearMemory;
    use crate::testutil::context_with;
    use jam_types::Privileges;

    #[test]
    fn delegator_overwrites_validator_set() {
        let mut privileges = Privileges::new(2);
        privileges.designate = 9;
        let mut ctx = context_with(vec![], privileges);
        let mut mem = LinearMemory::new(VALIDATOR_RECORD_SIZE * 2);
        mem.write(0, &[1u8; VALIDATOR_RECORD_SIZE]);
        mem.write(VALIDATOR_RECORD_SIZE as u32, &[2u8; VALIDATOR_RECORD_SIZE]);

        let code = designate(&mut ctx, &mem, 9, 0, 2).unwrap();

        assert_eq!(code, ReturnCode::Ok);
        assert_eq!(ctx.validator_keys.get_read_only().len(), 2);
    }

    #[test]
    fn non_delegator_is_huh() {
        let mut ctx = context_with(vec![], Privileges::new(2));
        let mem = LinearMemory::new(VALIDATOR_RECORD_SIZE);
        let code = designate(&mut ctx, &mem, 9, 0, 1).unwrap();
        assert_eq!(code, ReturnCode::Huh);
    }
}
