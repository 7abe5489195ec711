// Path: crates/jam-vm/src/opcodes.rs

//! Kept for documentation even though `host::HostCall` dispatches on a typed
//! enum rather than these raw ids.
#![allow(dead_code)]

/// Accumulate-context host-call function identifiers, matching the Gray
/// Paper's Ω_* numbering used across the JAM reference implementations.
pub const FUNC_GAS: u8 = 0;
pub const FUNC_LOOKUP: u8 = 1;
pub const FUNC_READ: u8 = 2;
pub const FUNC_WRITE: u8 = 3;
pub const FUNC_INFO: u8 = 4;
pub const FUNC_BLESS: u8 = 14;
pub const FUNC_ASSIGN: u8 = 15;
pub const FUNC_DESIGNATE: u8 = 16;
pub const FUNC_CHECKPOINT: u8 = 17;
pub const FUNC_NEW: u8 = 18;
pub const FUNC_UPGRADE: u8 = 19;
pub const FUNC_TRANSFER: u8 = 20;
pub const FUNC_EJECT: u8 = 21;
pub const FUNC_QUERY: u8 = 22;
pub const FUNC_SOLICIT: u8 = 23;
pub const FUNC_FORGET: u8 = 24;
pub const FUNC_YIELD: u8 = 25;
pub const FUNC_PROVIDE: u8 = 26;
pub const FUNC_FETCH: u8 = 27;
