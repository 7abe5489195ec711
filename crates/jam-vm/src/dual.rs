// Path: crates/jam-vm/src/dual.rs

use jam_state::AccumulationContext;

/// The dual-dimension context a service's sandboxed execution sees. Host
/// calls mutate `regular`; `checkpoint` replaces `exceptional` with a deep
/// clone of `regular`, giving the service an explicit, self-controlled
/// rollback point. If execution traps, the invocation yields `exceptional`
/// instead of `regular`.
pub struct DualDimension {
    pub regular: AccumulationContext,
    pub exceptional: AccumulationContext,
}

impl DualDimension {
    pub fn new(regular: AccumulationContext) -> Self {
        let exceptional = regular.deep_clone();
        Self {
            regular,
            exceptional,
        }
    }

    /// `imY' = imX`: exceptional becomes a deep clone of the current regular.
    pub fn checkpoint(&mut self) {
        self.exceptional = self.regular.deep_clone();
    }

    /// Resolves to the dimension the invocation should report: `regular` on
    /// normal completion, `exceptional` if execution trapped.
    pub fn collapse(self, trapped: bool) -> AccumulationContext {
        if trapped {
            self.exceptional
        } else {
            self.regular
        }
    }
}
