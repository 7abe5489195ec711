// Path: crates/jam-accumulate/src/operand.rs

use std::collections::BTreeMap;

use jam_types::{AccumulationOperand, ServiceId, WorkReport};

/// Distributes each work report's results by `service_id` into ordered
/// per-service operand sequences, preserving `(report, result)` order.
/// Deterministic with respect to the input report ordering.
pub fn group_operands(reports: &[WorkReport]) -> BTreeMap<ServiceId, Vec<AccumulationOperand>> {
    let mut groups: BTreeMap<ServiceId, Vec<AccumulationOperand>> = BTreeMap::new();
    for report in reports {
        for result in &report.results {
            groups
                .entry(result.service_id)
                .or_default()
                .push(AccumulationOperand {
                    service_id: result.service_id,
                    accumulate_gas: result.accumulate_gas,
                    payload_hash: result.payload_hash,
                    exec_result: result.exec_result.clone(),
                    package_hash: report.package_spec.hash,
                });
        }
    }
    groups
}

/// `calc_gas_limit = Σ accumulate_gas` for one service's operand group.
pub fn group_gas_limit(operands: &[AccumulationOperand]) -> u64 {
    operands.iter().map(|o| o.accumulate_gas).sum()
}
