use super::normalize::WeekPlan;

/// The in-progress edit buffer paired with the snapshot it is compared
/// against. The comparison gates the save action only; saving an unchanged
/// plan would be a no-op write.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    current: WeekPlan,
    original: WeekPlan,
}

impl ScheduleDraft {
    /// Snapshot the plan as loaded
    pub fn new(plan: WeekPlan) -> Self {
        Self {
            original: plan.clone(),
            current: plan,
        }
    }

    pub fn current(&self) -> &WeekPlan {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut WeekPlan {
        &mut self.current
    }

    /// Deep, order-sensitive comparison against the snapshot. Must never
    /// miss a difference; flagging a no-op reordering is acceptable.
    pub fn has_changes(&self) -> bool {
        self.current != self.original
    }

    /// Re-snapshot after a successful save
    pub fn mark_saved(&mut self) {
        self.original = self.current.clone();
    }

    /// Throw away the in-progress edit
    pub fn revert(&mut self) {
        self.current = self.original.clone();
    }
}
