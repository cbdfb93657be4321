//! Document-level click interception.

use crate::event::TargetId;

/// One-shot capture-phase click swallowing.
///
/// Each [`ClickGate::swallow_next`] consumes exactly one later click,
/// whatever its target.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClickGate {
    pending: usize,
    swallowed: Vec<TargetId>,
}

impl ClickGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn swallow_next(&mut self) {
        self.pending += 1;
    }

    pub fn is_armed(&self) -> bool {
        self.pending > 0
    }

    /// Returns `true` if the click may proceed, `false` if it was swallowed.
    pub fn admit(&mut self, target: TargetId) -> bool {
        if self.pending == 0 {
            return true;
        }

        self.pending -= 1;
        self.swallowed.push(target);
        log::debug!("swallowed click on {target:?}");
        false
    }

    /// Targets of every click swallowed so far.
    pub fn swallowed(&self) -> &[TargetId] {
        &self.swallowed
    }

    /// Hand over the swallowed targets recorded since the last call.
    pub fn take_swallowed(&mut self) -> Vec<TargetId> {
        std::mem::take(&mut self.swallowed)
    }
}
