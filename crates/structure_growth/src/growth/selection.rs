//! Choosing one continuation among admissible candidates.
//!
//! Candidates are described only by their placement cost:
//! - [`pick_inverse_cost`]: draws with probability inversely proportional to cost.
//! - [`pick_cheapest`]: picks the lowest cost, first one on ties.
//!
//! [`SelectionStrategy`] selects between the two for a run.
use rand::RngCore;

use crate::random::weighted_index;

/// Costs below this are treated as this value when inverting.
pub const MIN_SELECTION_COST: f64 = 1e-3;

/// Strategy for choosing among admissible candidates of one connector.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionStrategy {
    #[default]
    InverseCostWeighted,
    Cheapest,
}

/// Selection probabilities for `costs`: normalize, invert, renormalize.
///
/// Depends only on the multiset of costs; cheaper candidates get more weight.
pub fn inverse_cost_weights(costs: &[f64]) -> Vec<f64> {
    if costs.is_empty() {
        return Vec::new();
    }
    let floored: Vec<f64> = costs.iter().map(|c| c.max(MIN_SELECTION_COST)).collect();
    let total: f64 = floored.iter().sum();
    let inverted: Vec<f64> = floored.iter().map(|c| total / c).collect();
    let inverted_total: f64 = inverted.iter().sum();
    inverted.iter().map(|w| w / inverted_total).collect()
}

pub fn pick_inverse_cost<R: RngCore + ?Sized>(costs: &[f64], rng: &mut R) -> Option<usize> {
    weighted_index(rng, &inverse_cost_weights(costs))
}

pub fn pick_cheapest(costs: &[f64]) -> Option<usize> {
    costs
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

pub fn select<R: RngCore + ?Sized>(strategy: SelectionStrategy, costs: &[f64], rng: &mut R) -> Option<usize> {
    match strategy {
        SelectionStrategy::InverseCostWeighted => pick_inverse_cost(costs, rng),
        SelectionStrategy::Cheapest => pick_cheapest(costs),
    }
}
