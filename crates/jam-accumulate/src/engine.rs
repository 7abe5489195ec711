// Path: crates/jam-accumulate/src/engine.rs

use std::collections::{BTreeMap, BTreeSet};

use jam_state::AccumulationContext;
use jam_types::{
    AccumulationHistory, Hash32, PreimageKey, PreimageStatus, Privileges, ProtocolParams,
    ServiceId, TransferOperand, WorkReport,
};
use jam_vm::ServiceVm;
use tracing::debug;

use crate::invoke::parallelized_accumulation;

/// Per-service statistics accumulated across every batch of one
/// `execute_accumulation` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub gas_used: u64,
    pub accumulated_count: u64,
}

/// Final outcome of driving a report list through the outer loop to
/// completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessAccumulationResult {
    pub accumulate_root: Hash32,
    pub accumulation_stats: BTreeMap<ServiceId, ServiceStats>,
    pub invoked_services: Vec<ServiceId>,
}

/// `R(o,a,b) = if a != o then a else b`, the protocol §12.17 three-way merge
/// used to reconcile a privileged-service field edited by both the manager
/// and the role's original owner within the same batch.
fn r_merge(o: ServiceId, a: ServiceId, b: ServiceId) -> ServiceId {
    if a != o {
        a
    } else {
        b
    }
}

/// Advances `id` past any service already present in `context`, the same
/// modular-stepping convention the `new` host call uses to derive an
/// auto-advancing service id (`jam_vm::host::new`), recomputed here because
/// the engine — not any single invocation — owns the running candidate that
/// seeds the next batch's `new` calls.
fn advance_past_occupied(context: &AccumulationContext, params: &ProtocolParams, mut id: ServiceId) -> ServiceId {
    let min_pub = params.min_public_service_id as u64;
    let modulus = (1u64 << 32) - 256 - min_pub;
    loop {
        if context.service_accounts.get_read_only(id).is_none() {
            return id;
        }
        id = (min_pub + ((id as u64 - min_pub + 1) % modulus)) as ServiceId;
    }
}

fn encode_leaf(service_id: ServiceId, output: Hash32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(36);
    buf.extend_from_slice(&service_id.to_le_bytes());
    buf.extend_from_slice(&output);
    buf
}

fn apply_r_merge(context: &mut AccumulationContext, role_posts: &BTreeMap<ServiceId, Privileges>, core_count: u32) {
    let Some(manager_post) = role_posts.get(&context.original_manager) else {
        return;
    };

    let mut merged = context.privileges.get_read_only().clone();
    merged.manager = manager_post.manager;
    merged.always_accumulate = manager_post.always_accumulate.clone();

    let registrar_b = role_posts
        .get(&context.original_registrar)
        .map(|p| p.registrar)
        .unwrap_or(context.original_registrar);
    merged.registrar = r_merge(context.original_registrar, manager_post.registrar, registrar_b);

    let delegator_b = role_posts
        .get(&context.original_delegator)
        .map(|p| p.designate)
        .unwrap_or(context.original_delegator);
    merged.designate = r_merge(context.original_delegator, manager_post.designate, delegator_b);

    for core in 0..core_count as usize {
        let o = context.original_assigners.get(core).copied().unwrap_or(0);
        let a = manager_post.assign.get(core).copied().unwrap_or(o);
        let b = role_posts
            .get(&o)
            .and_then(|p| p.assign.get(core).copied())
            .unwrap_or(o);
        if let Some(slot) = merged.assign.get_mut(core) {
            *slot = r_merge(o, a, b);
        }
    }

    *context.privileges.get_mutable() = merged;
    context.privileges.commit();
}

/// Materializes staged preimage provisions into the committed account map:
/// a `(service, hash, size)` entry is only realized if its lookup status is
/// still the empty "requested" shape at this point, and transitions it to
/// `[current_slot]`.
fn materialize_provisions(
    context: &mut AccumulationContext,
    provided: Vec<((ServiceId, PreimageKey), Vec<u8>)>,
) {
    let now = context.time.slot;
    for ((service_id, key), data) in provided {
        if let Ok(account) = context.service_accounts.get_mutable(service_id) {
            let still_requested = account
                .preimage_lookup
                .get(&key)
                .map(PreimageStatus::is_requested)
                .unwrap_or(false);
            if still_requested {
                account.preimages.insert(key.0, data);
                account.preimage_lookup.insert(key, PreimageStatus(vec![now]));
            }
        }
    }
    context.service_accounts.commit();
}

/// The sole entry point: drives `reports` through the gas-bounded batching
/// loop until reports and pending transfers are both exhausted or the gas
/// budget is spent, committing every batch's mutations into `context` and
/// its accumulation history as it goes.
pub fn execute_accumulation(
    vm: &dyn ServiceVm,
    params: &ProtocolParams,
    mut context: AccumulationContext,
    mut reports: &[WorkReport],
    history: &mut AccumulationHistory,
) -> (AccumulationContext, ProcessAccumulationResult) {
    let always_accumulate_total: u64 = context
        .privileges
        .get_read_only()
        .always_accumulate
        .values()
        .sum();
    let mut gas_limit: i64 = params.total_gas_alloc_accumulation.max(
        params
            .gas_alloc_accumulation
            .saturating_mul(params.core_count as u64)
            .saturating_add(always_accumulate_total),
    ) as i64;

    let mut pending_transfers: Vec<TransferOperand> = Vec::new();
    let mut first_batch = true;
    let mut next_free_service_id = advance_past_occupied(&context, params, params.min_public_service_id);

    let mut stats: BTreeMap<ServiceId, ServiceStats> = BTreeMap::new();
    let mut outputs: BTreeMap<ServiceId, Hash32> = BTreeMap::new();
    let mut invoked_services: Vec<ServiceId> = Vec::new();
    let mut invoked_seen: BTreeSet<ServiceId> = BTreeSet::new();
    let mut processed_hashes: Vec<Hash32> = Vec::new();

    while !(reports.is_empty() && pending_transfers.is_empty()) && gas_limit > 0 {
        let mut k = 0usize;
        let mut batch_gas: u64 = 0;
        for report in reports {
            let g = report.total_accumulate_gas();
            if batch_gas.saturating_add(g) > gas_limit as u64 {
                break;
            }
            batch_gas += g;
            k += 1;
        }

        if k == 0 && pending_transfers.is_empty() {
            break;
        }

        let batch = &reports[..k];
        debug!(target: "accumulate", k, batch_gas, first_batch, "selected batch");

        let (results, batch_invoked) = parallelized_accumulation(
            vm,
            params,
            &context,
            batch,
            &pending_transfers,
            first_batch,
            next_free_service_id,
        );

        for id in &batch_invoked {
            if invoked_seen.insert(*id) {
                invoked_services.push(*id);
            }
        }

        let mut role_posts: BTreeMap<ServiceId, Privileges> = BTreeMap::new();
        let mut all_provided = Vec::new();
        let mut batch_gas_used: u64 = 0;
        let mut next_pending: Vec<TransferOperand> = Vec::new();

        for (id, result) in results {
            if context.is_role_relevant(id) {
                role_posts.insert(id, result.collapsed_dimension.privileges.get_read_only().clone());
            }
            context.merge_result(id, &result.collapsed_dimension);

            let entry = stats.entry(id).or_default();
            entry.gas_used += result.gas_used;
            entry.accumulated_count += 1;
            batch_gas_used += result.gas_used;

            if let Some(output) = result.accumulation_output {
                outputs.insert(id, output);
            }
            next_pending.extend(result.generated_transfers);
            all_provided.extend(result.provided_preimages);
        }

        apply_r_merge(&mut context, &role_posts, params.core_count);
        materialize_provisions(&mut context, all_provided);

        for report in batch {
            processed_hashes.push(report.package_spec.hash);
        }

        let gas_refund: u64 = pending_transfers.iter().map(|t| t.gas_limit).sum();
        gas_limit = gas_limit
            .saturating_sub(batch_gas_used as i64)
            .saturating_add(gas_refund as i64);

        pending_transfers = next_pending;
        reports = &reports[k..];
        first_batch = false;
        next_free_service_id = advance_past_occupied(&context, params, next_free_service_id);
    }

    history.shift_down();
    for hash in processed_hashes {
        history.insert_current(hash);
    }

    let mut leaves: Vec<(ServiceId, Hash32)> = outputs.into_iter().collect();
    leaves.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    let hashed_leaves: Vec<[u8; 32]> = leaves
        .iter()
        .map(|(id, output)| jam_crypto::keccak256(&encode_leaf(*id, *output)))
        .collect();
    let accumulate_root = jam_crypto::merkle_root(&hashed_leaves);

    (
        context,
        ProcessAccumulationResult {
            accumulate_root,
            accumulation_stats: stats,
            invoked_services,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn r_merge_identity_when_manager_did_not_change_it() {
        assert_eq!(r_merge(7, 7, 99), 99);
    }

    #[test]
    fn r_merge_manager_override_when_changed() {
        assert_eq!(r_merge(7, 42, 99), 42);
    }

    #[test]
    fn r_merge_full_identity_when_nothing_changed() {
        assert_eq!(r_merge(7, 7, 7), 7);
    }

    #[test]
    fn r_merge_owner_value_wins_when_manager_and_owner_agree() {
        assert_eq!(r_merge(7, 99, 99), 99);
    }

    proptest! {
        #[test]
        fn r_merge_satisfies_the_protocol_algebra(o: u32, a: u32, b: u32) {
            let result = r_merge(o, a, b);
            if a != o {
                prop_assert_eq!(result, a);
            } else {
                prop_assert_eq!(result, b);
            }
        }

        #[test]
        fn r_merge_is_idempotent_when_a_equals_o(o: u32, b: u32) {
            prop_assert_eq!(r_merge(o, o, b), b);
        }
    }
}
