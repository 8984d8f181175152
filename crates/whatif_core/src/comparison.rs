//! Field-by-field comparison of two parameter sets.

use serde::{Deserialize, Serialize};

use crate::metrics::{RiskBand, RiskThresholds, derive_metrics};
use crate::parameters::ParameterSet;
use crate::schema::Category;

/// What to compare a snapshot against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonTarget<'a> {
    Snapshot(&'a str),
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDelta {
    pub key: String,
    pub category: Category,
    pub before: f64,
    pub after: f64,
    /// `after - before`
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// One entry per schema key, in schema order
    pub deltas: Vec<ParameterDelta>,
    pub balance_before: f64,
    pub balance_after: f64,
    pub balance_delta: f64,
    pub risk_before: RiskBand,
    pub risk_after: RiskBand,
}

impl ComparisonResult {
    /// Deltas for keys whose value differs
    pub fn changed(&self) -> impl Iterator<Item = &ParameterDelta> {
        self.deltas.iter().filter(|d| d.delta != 0.0)
    }

    pub fn is_identical(&self) -> bool {
        self.changed().next().is_none()
    }

    pub fn delta(&self, key: &str) -> Option<&ParameterDelta> {
        self.deltas.iter().find(|d| d.key == key)
    }
}

/// Compare `before` with `after`. Both sets must come from the same schema.
///
/// Swapping the arguments negates every delta exactly.
pub fn compare(
    before: &ParameterSet,
    after: &ParameterSet,
    thresholds: &RiskThresholds,
) -> ComparisonResult {
    let deltas = before
        .iter()
        .zip(after.values().iter().copied())
        .map(|((spec, b), a)| ParameterDelta {
            key: spec.key.clone(),
            category: spec.category,
            before: b,
            after: a,
            delta: a - b,
        })
        .collect();

    let metrics_before = derive_metrics(before, thresholds);
    let metrics_after = derive_metrics(after, thresholds);

    ComparisonResult {
        deltas,
        balance_before: metrics_before.balance,
        balance_after: metrics_after.balance,
        balance_delta: metrics_after.balance - metrics_before.balance,
        risk_before: metrics_before.risk,
        risk_after: metrics_after.risk,
    }
}
