// Path: crates/jam-vm/src/host/checkpoint.rs

use crate::dual::DualDimension;
use crate::execution::{ExecutionContext, Trap};

/// Replaces the exceptional dimension with a deep clone of regular, giving
/// the service an explicit rollback point. Returns the remaining gas.
pub fn checkpoint(dd: &mut DualDimension, ec: &ExecutionContext) -> Result<u64, Trap> {
    dd.checkpoint();
    Ok(ec.gas_remaining as u64)
}
