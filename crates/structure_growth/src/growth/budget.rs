//! The construction budget a run spends from.

/// Construction budget shared by every node of a run.
///
/// The remaining amount only ever decreases and never drops below zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstructionBudget {
    initial: f64,
    remaining: f64,
}

impl ConstructionBudget {
    pub fn new(initial: f64) -> Self {
        let initial = initial.max(0.0);
        Self {
            initial,
            remaining: initial,
        }
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn spent(&self) -> f64 {
        self.initial - self.remaining
    }

    pub fn can_afford(&self, cost: f64) -> bool {
        cost.is_finite() && self.remaining - cost >= 0.0
    }

    /// Deducts `cost` if affordable; returns whether it was.
    pub fn try_spend(&mut self, cost: f64) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.remaining -= cost.max(0.0);
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }
}
