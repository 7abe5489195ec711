// Path: crates/jam-state/src/context.rs

use jam_types::{AuthorizerQueue, Hash32, Privileges, ServiceId, TimeInfo, ValidatorKeys};

use crate::cow::CowHandle;
use crate::delta::DeltaSnapshot;

/// Bundles the four CoW state dimensions plus the immutable inputs and the
/// privileged-service identities captured before accumulation began, used
/// later by the R-merge to decide which post-values win.
pub struct AccumulationContext {
    pub service_accounts: DeltaSnapshot,
    pub validator_keys: CowHandle<ValidatorKeys>,
    pub authorizer_queue: CowHandle<AuthorizerQueue>,
    pub privileges: CowHandle<Privileges>,
    pub time: TimeInfo,
    pub entropy: Hash32,
    pub original_manager: ServiceId,
    pub original_assigners: Vec<ServiceId>,
    pub original_delegator: ServiceId,
    pub original_registrar: ServiceId,
}

impl AccumulationContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service_accounts: DeltaSnapshot,
        validator_keys: ValidatorKeys,
        authorizer_queue: AuthorizerQueue,
        privileges: Privileges,
        time: TimeInfo,
        entropy: Hash32,
    ) -> Self {
        let original_manager = privileges.manager;
        let original_assigners = privileges.assign.clone();
        let original_delegator = privileges.designate;
        let original_registrar = privileges.registrar;
        Self {
            service_accounts,
            validator_keys: CowHandle::new(validator_keys),
            authorizer_queue: CowHandle::new(authorizer_queue),
            privileges: CowHandle::new(privileges),
            time,
            entropy,
            original_manager,
            original_assigners,
            original_delegator,
            original_registrar,
        }
    }

    /// Clones all four CoW handles so the result can be handed to an
    /// independent invocation task without aliasing this context's state.
    pub fn deep_clone(&self) -> Self {
        Self {
            service_accounts: self.service_accounts.deep_clone(),
            validator_keys: self.validator_keys.deep_clone(),
            authorizer_queue: self.authorizer_queue.deep_clone(),
            privileges: self.privileges.deep_clone(),
            time: self.time,
            entropy: self.entropy,
            original_manager: self.original_manager,
            original_assigners: self.original_assigners.clone(),
            original_delegator: self.original_delegator,
            original_registrar: self.original_registrar,
        }
    }

    /// Commits the dimensions owned by `id`: validator keys if `id` is the
    /// original delegator, the authorizer queue if `id` is one of the
    /// original per-core assigners, and always the service-account staging
    /// sets. Privileges are never committed here — §4.6's R-merge owns that.
    pub fn commit_for_service(&mut self, id: ServiceId) {
        tracing::debug!(target: "jam_state::context", service = id, "committing dimensions owned by service");
        if id == self.original_delegator {
            self.validator_keys.commit();
        }
        if self.original_assigners.contains(&id) {
            self.authorizer_queue.commit();
        }
        self.service_accounts.commit();
    }

    /// True if `id` holds (originally held, pre-batch) any privileged role
    /// whose post-accumulation view the R-merge or queue/key finalization
    /// needs to inspect.
    pub fn is_role_relevant(&self, id: ServiceId) -> bool {
        id == self.original_manager
            || id == self.original_registrar
            || id == self.original_delegator
            || self.original_assigners.contains(&id)
    }

    /// Folds one invoked service's cloned-and-mutated context back into this
    /// (the outer, batch-level) context: service-account staged changes
    /// always fold in; validator_keys/authorizer_queue fold in only when `id`
    /// is the dimension's original owner. Privileges are intentionally left
    /// untouched — the R-merge (run once per batch, after every service's
    /// result has been folded in) owns that dimension.
    pub fn merge_result(&mut self, id: ServiceId, collapsed: &AccumulationContext) {
        tracing::debug!(target: "jam_state::context", service = id, "merging invocation result into batch context");
        self.service_accounts.absorb(&collapsed.service_accounts);
        if id == self.original_delegator && collapsed.validator_keys.is_staged() {
            *self.validator_keys.get_mutable() = collapsed.validator_keys.get_read_only().clone();
        }
        if self.original_assigners.contains(&id) && collapsed.authorizer_queue.is_staged() {
            *self.authorizer_queue.get_mutable() = collapsed.authorizer_queue.get_read_only().clone();
        }
        self.commit_for_service(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ctx() -> AccumulationContext {
        let mut privileges = Privileges::new(2);
        privileges.manager = 10;
        privileges.designate = 20;
        privileges.registrar = 30;
        privileges.assign = vec![40, 41];
        AccumulationContext::new(
            DeltaSnapshot::new(BTreeMap::new()),
            Vec::new(),
            AuthorizerQueue::new(2),
            privileges,
            TimeInfo::new(1),
            [0u8; 32],
        )
    }

    #[test]
    fn captures_original_identities() {
        let c = ctx();
        assert_eq!(c.original_manager, 10);
        assert_eq!(c.original_delegator, 20);
        assert_eq!(c.original_registrar, 30);
        assert_eq!(c.original_assigners, vec![40, 41]);
    }

    #[test]
    fn commit_for_service_only_touches_owned_dimensions() {
        let mut c = ctx();
        c.validator_keys.get_mutable().push(jam_types::ValidatorKey(
            [1u8; jam_types::VALIDATOR_RECORD_SIZE],
        ));
        c.authorizer_queue.get_mutable().cores[0].push([9u8; 32]);
        c.privileges.get_mutable().manager = 99;

        // Not the delegator or an assigner: nothing commits.
        c.commit_for_service(999);
        assert!(c.validator_keys.is_staged());
        assert!(c.authorizer_queue.is_staged());
        assert!(c.privileges.is_staged());

        // The delegator: validator_keys commits, authorizer_queue does not.
        c.commit_for_service(20);
        assert!(!c.validator_keys.is_staged());
        assert!(c.authorizer_queue.is_staged());
        assert!(c.privileges.is_staged(), "privileges never commit here");
    }
}
