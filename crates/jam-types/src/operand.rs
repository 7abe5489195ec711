// Path: crates/jam-types/src/operand.rs

use crate::ids::{Hash32, ServiceId};
use crate::report::ExecResult;

/// One work-result forwarded to the service that produced it, grouped by
/// `service_id` before invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccumulationOperand {
    pub service_id: ServiceId,
    pub accumulate_gas: u64,
    pub payload_hash: Hash32,
    pub exec_result: ExecResult,
    pub package_hash: Hash32,
}

/// A value/memo transfer from one service to another, generated by the
/// `transfer` host call and consumed by the destination in a later batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOperand {
    pub sender: ServiceId,
    pub destination: ServiceId,
    pub amount: u64,
    pub memo: Vec<u8>,
    pub gas_limit: u64,
}
