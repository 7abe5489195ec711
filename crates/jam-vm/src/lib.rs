// Path: crates/jam-vm/src/lib.rs

#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

mod boundary;
mod codes;
mod dual;
mod execution;
mod host;
mod memory;
mod opcodes;
mod result;
mod script;
#[cfg(test)]
mod testutil;

pub use boundary::ServiceVm;
pub use codes::ReturnCode;
pub use dual::DualDimension;
pub use execution::{ExecutionContext, Trap};
pub use host::{dispatch, HostCall, HostOutcome};
pub use memory::{LinearMemory, Memory};
pub use result::AccumulationResult;
pub use script::ScriptedVm;
