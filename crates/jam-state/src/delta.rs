// Path: crates/jam-state/src/delta.rs

use std::collections::{BTreeMap, BTreeSet};

use jam_types::{ServiceAccount, ServiceId, StateError};

/// CoW handle for the service-account dimension. Staged changes are tracked
/// as a `modifications` map and a `deletions` set rather than a full cloned
/// copy, so `accounts' = (accounts ∪ modifications) \ deletions` is realized
/// without ever cloning the whole account map on first write.
#[derive(Clone, Debug, Default)]
pub struct DeltaSnapshot {
    base: BTreeMap<ServiceId, ServiceAccount>,
    modifications: BTreeMap<ServiceId, ServiceAccount>,
    deletions: BTreeSet<ServiceId>,
}

impl DeltaSnapshot {
    pub fn new(base: BTreeMap<ServiceId, ServiceAccount>) -> Self {
        Self {
            base,
            modifications: BTreeMap::new(),
            deletions: BTreeSet::new(),
        }
    }

    /// Effective value: modifications ∪ (base \ deletions).
    pub fn get_read_only(&self, id: ServiceId) -> Option<&ServiceAccount> {
        if self.deletions.contains(&id) {
            return None;
        }
        self.modifications.get(&id).or_else(|| self.base.get(&id))
    }

    /// Stage-copies from base into modifications on first call for `id`.
    /// Fails with `ServiceGone` if `id` is staged for deletion or absent.
    pub fn get_mutable(&mut self, id: ServiceId) -> Result<&mut ServiceAccount, StateError> {
        if self.deletions.contains(&id) {
            return Err(StateError::ServiceGone);
        }
        if !self.modifications.contains_key(&id) {
            let account = self.base.get(&id).cloned().ok_or(StateError::ServiceGone)?;
            self.modifications.insert(id, account);
        }
        self.modifications.get_mut(&id).ok_or(StateError::ServiceGone)
    }

    /// Fails with `AlreadyExists` if `id` is present in base or staged as a
    /// modification. A pending deletion for `id` is cleared, allowing a
    /// fresh account to take its place.
    pub fn create_service(
        &mut self,
        id: ServiceId,
        account: ServiceAccount,
    ) -> Result<(), StateError> {
        let present = !self.deletions.contains(&id)
            && (self.modifications.contains_key(&id) || self.base.contains_key(&id));
        if present {
            return Err(StateError::AlreadyExists);
        }
        self.deletions.remove(&id);
        self.modifications.insert(id, account);
        Ok(())
    }

    /// Moves `id` out of modifications (if staged) and into deletions;
    /// removed from base only at commit time.
    pub fn remove_service(&mut self, id: ServiceId) {
        self.modifications.remove(&id);
        self.deletions.insert(id);
    }

    pub fn modifications(&self) -> &BTreeMap<ServiceId, ServiceAccount> {
        &self.modifications
    }

    pub fn deletions(&self) -> &BTreeSet<ServiceId> {
        &self.deletions
    }

    /// Merges staged modifications into base.
    pub fn apply_modifications(&mut self) {
        for (id, account) in std::mem::take(&mut self.modifications) {
            self.base.insert(id, account);
        }
    }

    /// Removes staged deletions from base.
    pub fn apply_deletions(&mut self) {
        for id in std::mem::take(&mut self.deletions) {
            self.base.remove(&id);
        }
    }

    /// Two-phase commit: modifications first, then deletions, per the set
    /// equation `accounts' = (accounts ∪ modifications) \ deletions`.
    pub fn commit(&mut self) {
        tracing::debug!(
            target: "jam_state::delta",
            modifications = self.modifications.len(),
            deletions = self.deletions.len(),
            "committing service-account delta"
        );
        self.apply_modifications();
        self.apply_deletions();
    }

    /// A deep-copied snapshot of the effective view with no staged changes,
    /// used so parallel invocations cannot observe each other's writes.
    pub fn deep_clone(&self) -> Self {
        let mut base = self.base.clone();
        for (id, account) in &self.modifications {
            base.insert(*id, account.clone());
        }
        for id in &self.deletions {
            base.remove(id);
        }
        Self {
            base,
            modifications: BTreeMap::new(),
            deletions: BTreeSet::new(),
        }
    }

    /// Folds another snapshot's staged modifications and deletions into this
    /// one, other's deletions taking precedence over other's modifications
    /// where both name the same id. Used by the engine to fold a per-service
    /// invocation's cloned-context edits back into the batch's outer context.
    pub fn absorb(&mut self, other: &DeltaSnapshot) {
        tracing::debug!(
            target: "jam_state::delta",
            modifications = other.modifications.len(),
            deletions = other.deletions.len(),
            "merging invocation delta into batch context"
        );
        for (id, account) in &other.modifications {
            self.deletions.remove(id);
            self.modifications.insert(*id, account.clone());
        }
        for id in &other.deletions {
            self.modifications.remove(id);
            self.deletions.insert(*id);
        }
    }

    pub fn into_base(self) -> BTreeMap<ServiceId, ServiceAccount> {
        self.base
    }

    pub fn base(&self) -> &BTreeMap<ServiceId, ServiceAccount> {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::Hash32;
    use proptest::prelude::*;

    fn account(hash: Hash32) -> ServiceAccount {
        ServiceAccount::new(hash, 0, 0)
    }

    #[test]
    fn create_then_commit_realizes_set_equation() {
        let mut snap = DeltaSnapshot::new(BTreeMap::new());
        snap.create_service(1, account([1; 32])).unwrap();
        assert!(snap.get_read_only(1).is_some());
        snap.commit();
        assert!(snap.modifications().is_empty());
        assert!(snap.deletions().is_empty());
        assert!(snap.base().contains_key(&1));
    }

    #[test]
    fn create_duplicate_fails() {
        let mut snap = DeltaSnapshot::new(BTreeMap::new());
        snap.create_service(1, account([1; 32])).unwrap();
        assert!(matches!(
            snap.create_service(1, account([2; 32])),
            Err(StateError::AlreadyExists)
        ));
    }

    #[test]
    fn get_mutable_on_deleted_service_fails() {
        let mut base = BTreeMap::new();
        base.insert(1, account([1; 32]));
        let mut snap = DeltaSnapshot::new(base);
        snap.remove_service(1);
        assert!(matches!(
            snap.get_mutable(1),
            Err(StateError::ServiceGone)
        ));
    }

    #[test]
    fn deep_clone_is_independent_of_later_mutation() {
        let mut base = BTreeMap::new();
        base.insert(1, account([1; 32]));
        let mut snap = DeltaSnapshot::new(base);
        let clone = snap.deep_clone();
        snap.get_mutable(1).unwrap().balance = 500;
        snap.commit();
        assert_eq!(snap.get_read_only(1).unwrap().balance, 500);
        assert_eq!(clone.get_read_only(1).unwrap().balance, 0);
    }

    #[test]
    fn remove_then_commit_drops_from_base() {
        let mut base = BTreeMap::new();
        base.insert(1, account([1; 32]));
        let mut snap = DeltaSnapshot::new(base);
        snap.remove_service(1);
        snap.commit();
        assert!(snap.get_read_only(1).is_none());
        assert!(!snap.base().contains_key(&1));
    }

    proptest! {
        /// `accounts' = (accounts ∪ modifications) \ deletions` holds after
        /// `commit` for an arbitrary base/modify/delete mix, regardless of
        /// whether a modified id was already in base or freshly created.
        #[test]
        fn commit_realizes_set_equation(
            base_ids in prop::collection::btree_set(0u32..16, 0..8),
            modified_ids in prop::collection::btree_set(0u32..16, 0..8),
            deleted_ids in prop::collection::btree_set(0u32..16, 0..8),
        ) {
            let mut base = BTreeMap::new();
            for id in &base_ids {
                base.insert(*id, account([*id as u8; 32]));
            }
            let mut snap = DeltaSnapshot::new(base.clone());

            for id in &modified_ids {
                if base.contains_key(id) {
                    snap.get_mutable(*id).unwrap().balance = 999;
                } else {
                    snap.create_service(*id, account([*id as u8; 32])).unwrap();
                }
            }
            for id in &deleted_ids {
                snap.remove_service(*id);
            }

            snap.commit();

            let expected: BTreeSet<ServiceId> = base_ids
                .union(&modified_ids)
                .copied()
                .collect::<BTreeSet<_>>()
                .difference(&deleted_ids)
                .copied()
                .collect();
            let actual: BTreeSet<ServiceId> = snap.base().keys().copied().collect();
            prop_assert_eq!(actual, expected);
            prop_assert!(snap.modifications().is_empty());
            prop_assert!(snap.deletions().is_empty());
        }

        /// `absorb` applied to a delta-snapshot commit is equivalent to
        /// replaying the same operations on the receiver directly: merging
        /// an invocation's isolated edits must not depend on whether the
        /// caller later folds them in via `absorb` or committed them itself.
        #[test]
        fn absorb_matches_direct_commit(
            base_ids in prop::collection::btree_set(0u32..16, 0..8),
            modified_ids in prop::collection::btree_set(0u32..16, 0..8),
            deleted_ids in prop::collection::btree_set(0u32..16, 0..8),
        ) {
            let mut base = BTreeMap::new();
            for id in &base_ids {
                base.insert(*id, account([*id as u8; 32]));
            }

            let mut direct = DeltaSnapshot::new(base.clone());
            let mut isolated = DeltaSnapshot::new(base.clone());

            for id in &modified_ids {
                if base.contains_key(id) {
                    direct.get_mutable(*id).unwrap().balance = 999;
                    isolated.get_mutable(*id).unwrap().balance = 999;
                } else {
                    direct.create_service(*id, account([*id as u8; 32])).unwrap();
                    isolated.create_service(*id, account([*id as u8; 32])).unwrap();
                }
            }
            for id in &deleted_ids {
                direct.remove_service(*id);
                isolated.remove_service(*id);
            }
            direct.commit();

            let mut outer = DeltaSnapshot::new(base);
            outer.absorb(&isolated);
            outer.commit();

            let direct_keys: BTreeSet<ServiceId> = direct.base().keys().copied().collect();
            let outer_keys: BTreeSet<ServiceId> = outer.base().keys().copied().collect();
            prop_assert_eq!(outer_keys, direct_keys);
        }
    }
}
