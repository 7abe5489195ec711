// Path: crates/jam-accumulate/src/invoke.rs

use std::collections::{BTreeMap, BTreeSet};

use jam_state::AccumulationContext;
use jam_types::{AccumulationOperand, ProtocolParams, ServiceId, TransferOperand, WorkReport};
use jam_vm::{AccumulationResult, LinearMemory, ServiceVm};
use rayon::prelude::*;
use tracing::debug;

use crate::operand::{group_gas_limit, group_operands};

/// Caller-supplied memory given to each invocation; large enough for the
/// host-call argument/result traffic this engine exercises.
const INVOCATION_MEMORY_BYTES: usize = 1 << 16;

fn empty_result(context: AccumulationContext) -> AccumulationResult {
    AccumulationResult {
        gas_used: 0,
        collapsed_dimension: context,
        generated_transfers: Vec::new(),
        accumulation_output: None,
        provided_preimages: BTreeMap::new(),
    }
}

/// Prepares and runs one service's invocation against its own context:
/// credits incoming-transfer value, resolves the gas limit (an
/// always-accumulate allocation if one exists, else the sum of operand and
/// transfer gas), and calls into the external VM. Returns an empty result
/// without invoking the VM if the destination is absent or the resolved gas
/// limit is zero.
pub fn single_service_accumulation(
    vm: &dyn ServiceVm,
    params: &ProtocolParams,
    mut context: AccumulationContext,
    service_id: ServiceId,
    operands: &[AccumulationOperand],
    incoming_transfers: &[TransferOperand],
    next_free_service_id: ServiceId,
) -> AccumulationResult {
    if context.service_accounts.get_read_only(service_id).is_none() {
        return empty_result(context);
    }

    let transfers_total: u64 = incoming_transfers.iter().map(|t| t.amount).sum();
    let transfers_gas: u64 = incoming_transfers.iter().map(|t| t.gas_limit).sum();

    if transfers_total > 0 {
        if let Ok(account) = context.service_accounts.get_mutable(service_id) {
            account.balance = account.balance.saturating_add(transfers_total);
        }
    }

    let operands_gas = group_gas_limit(operands);
    let gas_limit = context
        .privileges
        .get_read_only()
        .always_accumulate
        .get(&service_id)
        .copied()
        .unwrap_or_else(|| operands_gas.saturating_add(transfers_gas));

    if gas_limit == 0 {
        return empty_result(context);
    }

    let mut memory = LinearMemory::new(INVOCATION_MEMORY_BYTES);
    vm.invoke(
        params,
        &mut memory,
        context,
        service_id,
        gas_limit,
        next_free_service_id,
        operands,
        incoming_transfers,
    )
}

fn push_unique(id: ServiceId, order: &mut Vec<ServiceId>, seen: &mut BTreeSet<ServiceId>) {
    if seen.insert(id) {
        order.push(id);
    }
}

/// Computes the set of services to invoke this batch — always-accumulate
/// services (first batch only), every service named in a report result, and
/// extant destinations of pending transfers — then runs each against an
/// independently deep-cloned context, in parallel once the service count
/// reaches `params.parallel_threshold`.
pub fn parallelized_accumulation(
    vm: &dyn ServiceVm,
    params: &ProtocolParams,
    context: &AccumulationContext,
    reports: &[WorkReport],
    pending_transfers: &[TransferOperand],
    include_privileged: bool,
    next_free_service_id: ServiceId,
) -> (BTreeMap<ServiceId, AccumulationResult>, Vec<ServiceId>) {
    let operand_groups = group_operands(reports);

    let mut transfers_by_dest: BTreeMap<ServiceId, Vec<TransferOperand>> = BTreeMap::new();
    for transfer in pending_transfers {
        if context
            .service_accounts
            .get_read_only(transfer.destination)
            .is_some()
        {
            transfers_by_dest
                .entry(transfer.destination)
                .or_default()
                .push(transfer.clone());
        }
    }

    let mut invoked = Vec::new();
    let mut seen = BTreeSet::new();
    if include_privileged {
        for id in context.privileges.get_read_only().always_accumulate.keys() {
            push_unique(*id, &mut invoked, &mut seen);
        }
    }
    for id in operand_groups.keys() {
        push_unique(*id, &mut invoked, &mut seen);
    }
    for id in transfers_by_dest.keys() {
        push_unique(*id, &mut invoked, &mut seen);
    }

    debug!(target: "accumulate", count = invoked.len(), include_privileged, "invoking services");

    let empty_operands: Vec<AccumulationOperand> = Vec::new();
    let empty_transfers: Vec<TransferOperand> = Vec::new();

    let run_one = |id: ServiceId| -> (ServiceId, AccumulationResult) {
        let operands = operand_groups.get(&id).map(Vec::as_slice).unwrap_or(&empty_operands);
        let transfers = transfers_by_dest
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&empty_transfers);
        let cloned = context.deep_clone();
        let result = single_service_accumulation(
            vm,
            params,
            cloned,
            id,
            operands,
            transfers,
            next_free_service_id,
        );
        (id, result)
    };

    let results: BTreeMap<ServiceId, AccumulationResult> = if invoked.len() >= params.parallel_threshold {
        invoked.par_iter().map(|&id| run_one(id)).collect()
    } else {
        invoked.iter().map(|&id| run_one(id)).collect()
    };

    (results, invoked)
}
