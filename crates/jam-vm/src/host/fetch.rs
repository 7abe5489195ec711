// Path: crates/jam-vm/src/host/fetch.rs

use jam_types::{AccumulationOperand, Hash32, ProtocolParams, TransferOperand};

use crate::execution::Trap;
use crate::memory::Memory;

fn encode_params(params: &ProtocolParams) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&params.core_count.to_le_bytes());
    buf.extend_from_slice(&params.validators_count.to_le_bytes());
    buf.extend_from_slice(&params.epoch_length.to_le_bytes());
    buf.extend_from_slice(&params.max_authorizations_queue_items.to_le_bytes());
    buf.extend_from_slice(&params.total_gas_alloc_accumulation.to_le_bytes());
    buf.extend_from_slice(&params.gas_alloc_accumulation.to_le_bytes());
    buf.extend_from_slice(&(params.transfer_memo_size as u32).to_le_bytes());
    buf.extend_from_slice(&params.preimage_expungement_period.to_le_bytes());
    buf.extend_from_slice(&params.min_balance_per_item.to_le_bytes());
    buf.extend_from_slice(&params.min_balance_per_octet.to_le_bytes());
    buf.extend_from_slice(&params.min_public_service_id.to_le_bytes());
    buf
}

fn encode_transfer(t: &TransferOperand) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&t.sender.to_le_bytes());
    buf.extend_from_slice(&t.destination.to_le_bytes());
    buf.extend_from_slice(&t.amount.to_le_bytes());
    buf.extend_from_slice(&t.memo);
    buf.extend_from_slice(&t.gas_limit.to_le_bytes());
    buf
}

fn encode_operand(o: &AccumulationOperand) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&o.service_id.to_le_bytes());
    buf.extend_from_slice(&o.accumulate_gas.to_le_bytes());
    buf.extend_from_slice(&o.payload_hash);
    buf.extend_from_slice(&o.package_hash);
    match &o.exec_result {
        jam_types::ExecResult::Ok(data) => {
            buf.push(0);
            buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            buf.extend_from_slice(data);
        }
        jam_types::ExecResult::Fault(msg) => {
            buf.push(1);
            let bytes = msg.as_bytes();
            buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(bytes);
        }
    }
    buf
}

/// Selector 0: encoded protocol constants. 1: entropy. 14: incoming
/// transfers then operands, concatenated. 15: a single item (by combined
/// index across transfers then operands). Anything else: empty (`NONE`).
/// Writes at most `limit` bytes at `offset`; returns the total blob length.
#[allow(clippy::too_many_arguments)]
pub fn fetch(
    mem: &mut dyn Memory,
    params: &ProtocolParams,
    entropy: Hash32,
    incoming_transfers: &[TransferOperand],
    operands: &[AccumulationOperand],
    out_ptr: u32,
    offset: u32,
    limit: u32,
    selector: u32,
    index: u32,
) -> Result<u64, Trap> {
    let blob: Vec<u8> = match selector {
        0 => encode_params(params),
        1 => entropy.to_vec(),
        14 => {
            let mut buf = Vec::new();
            for t in incoming_transfers {
                buf.extend_from_slice(&encode_transfer(t));
            }
            for o in operands {
                buf.extend_from_slice(&encode_operand(o));
            }
            buf
        }
        15 => {
            let idx = index as usize;
            if idx < incoming_transfers.len() {
                encode_transfer(&incoming_transfers[idx])
            } else if idx - incoming_transfers.len() < operands.len() {
                encode_operand(&operands[idx - incoming_transfers.len()])
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    };

    let total_len = blob.len() as u64;
    let start = (offset as usize).min(blob.len());
    let end = start.saturating_add(limit as usize).min(blob.len());
    if !mem.write(out_ptr, &blob[start..end]) {
        return Err(Trap::Panic);
    }
    Ok(total_len)
}
