// Path: crates/jam-vm/src/host/storage.rs

use jam_state::AccumulationContext;
use jam_types::{ProtocolParams, ServiceId};

use crate::codes::ReturnCode;
use crate::execution::{ExecutionContext, Trap};
use crate::memory::Memory;

/// Returns the calling service's remaining gas.
pub fn gas(ec: &ExecutionContext) -> u64 {
    ec.gas_remaining.max(0) as u64
}

/// Reads a preimage by hash out of a service's account and writes up to
/// `len` bytes of it (starting at `offset`) into memory. `NONE` if the
/// service or the preimage is unknown.
pub fn lookup(
    ctx: &AccumulationContext,
    mem: &mut dyn Memory,
    self_id: ServiceId,
    service_id_reg: u64,
    hash_ptr: u32,
    out_ptr: u32,
    offset: u32,
    len: u32,
) -> Result<u64, Trap> {
    let target = if service_id_reg == u64::MAX {
        self_id
    } else {
        service_id_reg as ServiceId
    };
    let hash = mem.read(hash_ptr, 32).ok_or(Trap::Panic)?;

    let Some(account) = ctx.service_accounts.get_read_only(target) else {
        return Ok(ReturnCode::None.to_register());
    };
    let mut key = [0u8; 32];
    key.copy_from_slice(&hash);
    let Some(data) = account.preimages.get(&key) else {
        return Ok(ReturnCode::None.to_register());
    };

    let total_len = data.len() as u64;
    let start = (offset as usize).min(data.len());
    let end = start.saturating_add(len as usize).min(data.len());
    if !mem.write(out_ptr, &data[start..end]) {
        return Err(Trap::Panic);
    }
    Ok(total_len)
}

/// Reads a value out of the calling service's untyped key/value storage.
pub fn read(
    ctx: &AccumulationContext,
    mem: &mut dyn Memory,
    self_id: ServiceId,
    service_id_reg: u64,
    key_ptr: u32,
    key_len: u32,
    out_ptr: u32,
    offset: u32,
    len: u32,
) -> Result<u64, Trap> {
    let target = if service_id_reg == u64::MAX {
        self_id
    } else {
        service_id_reg as ServiceId
    };
    let key = mem.read(key_ptr, key_len).ok_or(Trap::Panic)?;

    let Some(account) = ctx.service_accounts.get_read_only(target) else {
        return Ok(ReturnCode::None.to_register());
    };
    let Some(data) = account.storage.get(&key) else {
        return Ok(ReturnCode::None.to_register());
    };

    let total_len = data.len() as u64;
    let start = (offset as usize).min(data.len());
    let end = start.saturating_add(len as usize).min(data.len());
    if !mem.write(out_ptr, &data[start..end]) {
        return Err(Trap::Panic);
    }
    Ok(total_len)
}

/// Writes (or, with an empty value, deletes) a key in the calling service's
/// untyped storage. Rejects the write with `FULL` if the resulting
/// footprint would push the balance below its deposit threshold.
pub fn write(
    ctx: &mut AccumulationContext,
    params: &ProtocolParams,
    mem: &dyn Memory,
    self_id: ServiceId,
    key_ptr: u32,
    key_len: u32,
    value_ptr: u32,
    value_len: u32,
) -> Result<u64, Trap> {
    let key = mem.read(key_ptr, key_len).ok_or(Trap::Panic)?;
    let value = if value_len == 0 {
        None
    } else {
        Some(mem.read(value_ptr, value_len).ok_or(Trap::Panic)?)
    };

    let account = match ctx.service_accounts.get_mutable(self_id) {
        Ok(a) => a,
        Err(_) => return Ok(ReturnCode::Who.to_register()),
    };

    let prior_len = account.storage.get(&key).map(|v| v.len());
    let (items_delta, bytes_delta): (i64, i64) = match (&prior_len, &value) {
        (None, None) => (0, 0),
        (None, Some(v)) => (1, v.len() as i64),
        (Some(old), None) => (-1, -(*old as i64)),
        (Some(old), Some(v)) => (0, v.len() as i64 - *old as i64),
    };

    let new_items = (account.footprint_items as i64 + items_delta).max(0) as u32;
    let new_bytes = (account.footprint_bytes as i64 + bytes_delta).max(0) as u64;
    let threshold = params.storage_threshold(new_items, new_bytes);
    if account.balance < threshold {
        return Ok(ReturnCode::Full.to_register());
    }

    let old_len = prior_len.unwrap_or(0) as u64;
    match value {
        Some(v) => {
            account.storage.insert(key, v);
        }
        None => {
            account.storage.remove(&key);
        }
    }
    account.footprint_items = new_items;
    account.footprint_bytes = new_bytes;
    Ok(old_len)
}

/// Encodes a service's public account fields into memory: balance,
/// min_gas_accumulate, min_gas_on_transfer, code_hash, footprint_items,
/// footprint_bytes, in that order. `NONE` if the service is unknown.
pub fn info(
    ctx: &AccumulationContext,
    mem: &mut dyn Memory,
    self_id: ServiceId,
    service_id_reg: u64,
    out_ptr: u32,
) -> Result<u64, Trap> {
    let target = if service_id_reg == u64::MAX {
        self_id
    } else {
        service_id_reg as ServiceId
    };
    let Some(account) = ctx.service_accounts.get_read_only(target) else {
        return Ok(ReturnCode::None.to_register());
    };

    let mut buf = Vec::with_capacity(32 + 8 * 5);
    buf.extend_from_slice(&account.code_hash);
    buf.extend_from_slice(&account.balance.to_le_bytes());
    buf.extend_from_slice(&account.min_gas_accumulate.to_le_bytes());
    buf.extend_from_slice(&account.min_gas_on_transfer.to_le_bytes());
    buf.extend_from_slice(&account.footprint_items.to_le_bytes());
    buf.extend_from_slice(&account.footprint_bytes.to_le_bytes());
    if !mem.write(out_ptr, &buf) {
        return Err(Trap::Panic);
    }
    Ok(ReturnCode::Ok.to_register())
}
