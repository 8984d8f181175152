use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};
use crate::metrics::{RiskBand, RiskThresholds, derive_metrics};
use crate::parameters::ParameterSet;
use crate::schema::ParameterSpec;

/// Upper bound on sweep steps so a single call stays bounded
pub const MAX_SWEEP_STEPS: usize = 10_000;

/// Outcome at one sweep step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f64,
    pub balance: f64,
    pub risk: RiskBand,
}

/// Balance swing of one parameter across its full range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensitivity {
    pub key: String,
    pub balance_at_min: f64,
    pub balance_at_max: f64,
    /// `balance_at_max - balance_at_min`
    pub swing: f64,
}

/// Evenly spaced values from `spec.min` to `spec.max`, endpoints included.
/// A single step yields just `min`.
pub fn sweep_values(spec: &ParameterSpec, steps: usize) -> Vec<f64> {
    if steps <= 1 {
        return vec![spec.min];
    }
    let step_size = (spec.max - spec.min) / (steps - 1) as f64;
    (0..steps)
        .map(|i| {
            if i == steps - 1 {
                spec.max
            } else {
                spec.min + step_size * i as f64
            }
        })
        .collect()
}

/// Evaluate `set` with `key` stepped across its range, all else held fixed
pub fn sweep(
    set: &ParameterSet,
    key: &str,
    steps: usize,
    thresholds: &RiskThresholds,
) -> Result<Vec<SweepPoint>> {
    let spec = set
        .schema()
        .spec(key)
        .ok_or_else(|| ScenarioError::UnknownParameter(key.to_string()))?;
    if steps > MAX_SWEEP_STEPS {
        return Err(ScenarioError::InvalidSweepSteps {
            steps,
            max: MAX_SWEEP_STEPS,
        });
    }

    sweep_values(spec, steps)
        .into_iter()
        .map(|value| -> Result<SweepPoint> {
            let metrics = derive_metrics(&set.with_change(key, value)?, thresholds);
            Ok(SweepPoint {
                value,
                balance: metrics.balance,
                risk: metrics.risk,
            })
        })
        .collect()
}

/// Rank parameters by absolute balance swing, largest first.
/// Ties keep schema order.
pub fn sensitivity(set: &ParameterSet, thresholds: &RiskThresholds) -> Vec<Sensitivity> {
    let mut ranking: Vec<Sensitivity> = set
        .iter()
        .enumerate()
        .map(|(i, (spec, _))| {
            let balance_with = |value: f64| {
                let mut values = set.values().to_vec();
                values[i] = value;
                let varied = ParameterSet::from_values(Arc::clone(set.schema()), &values);
                derive_metrics(&varied, thresholds).balance
            };
            let balance_at_min = balance_with(spec.min);
            let balance_at_max = balance_with(spec.max);
            Sensitivity {
                key: spec.key.clone(),
                balance_at_min,
                balance_at_max,
                swing: balance_at_max - balance_at_min,
            }
        })
        .collect();

    ranking.sort_by(|a, b| b.swing.abs().total_cmp(&a.swing.abs()));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn live() -> ParameterSet {
        let schema = Schema::builder()
            .parameter(
                ParameterSpec::income("sponsorship")
                    .range(0.0, 200_000.0)
                    .default_value(90_000.0),
            )
            .parameter(
                ParameterSpec::income("tickets")
                    .range(0.0, 20_000.0)
                    .default_value(5_000.0),
            )
            .parameter(
                ParameterSpec::expense("salaries")
                    .range(50_000.0, 100_000.0)
                    .default_value(80_000.0),
            )
            .build()
            .unwrap();
        ParameterSet::new(Arc::new(schema))
    }

    #[test]
    fn test_sweep_values_endpoints() {
        let spec = ParameterSpec::income("a").range(0.0, 1.0);
        assert_eq!(sweep_values(&spec, 5), [0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(sweep_values(&spec, 1), [0.0]);
        assert_eq!(sweep_values(&spec, 0), [0.0]);
    }

    #[test]
    fn test_sweep_reports_balance_and_risk() {
        let t = RiskThresholds::new(-5_000.0);
        let points = sweep(&live(), "sponsorship", 3, &t).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value, 0.0);
        assert_eq!(points[0].balance, -75_000.0);
        assert_eq!(points[0].risk, RiskBand::Critical);
        assert_eq!(points[2].value, 200_000.0);
        assert_eq!(points[2].balance, 125_000.0);
        assert_eq!(points[2].risk, RiskBand::Healthy);
    }

    #[test]
    fn test_sweep_unknown_key() {
        let t = RiskThresholds::new(0.0);
        assert_eq!(
            sweep(&live(), "nope", 3, &t),
            Err(ScenarioError::UnknownParameter("nope".to_string()))
        );
    }

    #[test]
    fn test_sweep_step_limit() {
        let t = RiskThresholds::new(0.0);
        let points = sweep(&live(), "tickets", MAX_SWEEP_STEPS, &t).unwrap();
        assert_eq!(points.len(), MAX_SWEEP_STEPS);
        assert_eq!(
            sweep(&live(), "tickets", usize::MAX, &t),
            Err(ScenarioError::InvalidSweepSteps {
                steps: usize::MAX,
                max: MAX_SWEEP_STEPS
            })
        );
    }

    #[test]
    fn test_sensitivity_ranking() {
        let t = RiskThresholds::new(-5_000.0);
        let ranking = sensitivity(&live(), &t);
        let keys: Vec<&str> = ranking.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["sponsorship", "salaries", "tickets"]);

        // Expenses lower the balance as they grow
        let salaries = &ranking[1];
        assert_eq!(salaries.swing, -50_000.0);
        assert!(salaries.balance_at_min > salaries.balance_at_max);
    }
}
