// Path: crates/jam-state/src/cow.rs

/// A copy-on-write wrapper over a single mutable state dimension
/// (validator keys, authorizer queue, or privileges). `get_mutable` clones
/// the base value on first use; later calls reuse the staged copy until
/// `commit` folds it back or `deinit` discards it.
#[derive(Clone, Debug)]
pub struct CowHandle<D> {
    base: D,
    staged: Option<D>,
}

impl<D: Clone> CowHandle<D> {
    pub fn new(base: D) -> Self {
        Self { base, staged: None }
    }

    /// The current effective value: staged if present, else base.
    pub fn get_read_only(&self) -> &D {
        self.staged.as_ref().unwrap_or(&self.base)
    }

    /// Lazily stages a clone of the base value and returns it mutably.
    /// Idempotent: subsequent calls reuse the same staged copy.
    pub fn get_mutable(&mut self) -> &mut D {
        self.staged.get_or_insert_with(|| self.base.clone())
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    /// Replaces base with the staged copy, if any, then clears staging.
    pub fn commit(&mut self) {
        if let Some(staged) = self.staged.take() {
            tracing::debug!(target: "jam_state::cow", "committing staged dimension");
            self.base = staged;
        }
    }

    /// Produces a handle whose base is a deep copy of the current effective
    /// value, with no staged copy of its own. Parallel invocations clone
    /// before mutating so they cannot observe each other's writes.
    pub fn deep_clone(&self) -> Self {
        Self::new(self.get_read_only().clone())
    }

    /// Releases any staged memory without committing it.
    pub fn deinit(&mut self) {
        self.staged = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_mutable_is_idempotent_and_commit_replaces_base() {
        let mut handle = CowHandle::new(vec![1, 2, 3]);
        assert!(!handle.is_staged());
        handle.get_mutable().push(4);
        handle.get_mutable().push(5);
        assert_eq!(handle.get_read_only(), &vec![1, 2, 3, 4, 5]);
        handle.commit();
        assert!(!handle.is_staged());
        assert_eq!(handle.get_read_only(), &vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn deep_clone_is_independent() {
        let mut handle = CowHandle::new(vec![1, 2, 3]);
        handle.get_mutable().push(4);
        let mut clone = handle.deep_clone();
        clone.get_mutable().push(99);
        assert_eq!(handle.get_read_only(), &vec![1, 2, 3, 4]);
        assert_eq!(clone.get_read_only(), &vec![1, 2, 3, 4, 99]);
    }

    #[test]
    fn deinit_discards_uncommitted_writes() {
        let mut handle = CowHandle::new(vec![1, 2, 3]);
        handle.get_mutable().push(4);
        handle.deinit();
        assert_eq!(handle.get_read_only(), &vec![1, 2, 3]);
    }
}
