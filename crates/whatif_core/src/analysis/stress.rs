use std::sync::Arc;

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};
use crate::metrics::{RiskBand, RiskThresholds, derive_metrics};
use crate::parameters::ParameterSet;

/// Iterations per seeded batch
const MAX_BATCH_SIZE: usize = 100;
/// Upper bound on iterations so a single call stays bounded
pub const MAX_STRESS_ITERATIONS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressConfig {
    pub iterations: usize,
    /// Standard deviation of each perturbation as a fraction of the value
    pub relative_std_dev: f64,
    pub seed: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            relative_std_dev: 0.10,
            seed: 0,
        }
    }
}

impl StressConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ScenarioError::InvalidStressConfig(
                "iterations must be at least 1",
            ));
        }
        if self.iterations > MAX_STRESS_ITERATIONS {
            return Err(ScenarioError::InvalidStressConfig(
                "iterations exceed the supported maximum",
            ));
        }
        if !self.relative_std_dev.is_finite() || self.relative_std_dev < 0.0 {
            return Err(ScenarioError::InvalidStressConfig(
                "relative deviation must be a non-negative number",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancePercentiles {
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSummary {
    pub iterations: usize,
    pub mean_balance: f64,
    pub percentiles: BalancePercentiles,
    pub healthy_rate: f64,
    pub warning_rate: f64,
    pub critical_rate: f64,
}

/// Perturb every parameter of `set` with Gaussian noise and summarise the
/// resulting balances and risk bands. Perturbed values are clamped into
/// their declared ranges; parameters at zero stay at zero.
pub fn stress_test(
    set: &ParameterSet,
    thresholds: &RiskThresholds,
    config: &StressConfig,
) -> Result<StressSummary> {
    config.validate()?;

    let distributions = set
        .values()
        .iter()
        .map(|&value| {
            let std_dev = value.abs() * config.relative_std_dev;
            if std_dev == 0.0 {
                return Ok(None);
            }
            Normal::new(value, std_dev).map(Some).map_err(|_| {
                ScenarioError::InvalidStressConfig("deviation overflows the parameter range")
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let iterations = config.iterations;
    let num_batches = iterations.div_ceil(MAX_BATCH_SIZE);

    let run_batch = |i: usize| -> Vec<(f64, RiskBand)> {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(config.seed.wrapping_add(i as u64));

        let batch_size = if i == num_batches - 1 {
            iterations - i * MAX_BATCH_SIZE
        } else {
            MAX_BATCH_SIZE
        };

        let mut values = vec![0.0; distributions.len()];
        (0..batch_size)
            .map(|_| {
                for ((slot, dist), &base) in values
                    .iter_mut()
                    .zip(&distributions)
                    .zip(set.values())
                {
                    *slot = match dist {
                        Some(d) => d.sample(&mut rng),
                        None => base,
                    };
                }
                let perturbed = ParameterSet::from_values(Arc::clone(set.schema()), &values);
                let metrics = derive_metrics(&perturbed, thresholds);
                (metrics.balance, metrics.risk)
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<(f64, RiskBand)> = (0..num_batches)
        .into_par_iter()
        .flat_map(&run_batch)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<(f64, RiskBand)> = (0..num_batches).flat_map(&run_batch).collect();

    Ok(summarize(&outcomes))
}

fn summarize(outcomes: &[(f64, RiskBand)]) -> StressSummary {
    let n = outcomes.len();
    let mut balances: Vec<f64> = outcomes.iter().map(|(b, _)| *b).collect();
    balances.sort_by(f64::total_cmp);

    let rate = |band: RiskBand| {
        outcomes.iter().filter(|(_, r)| *r == band).count() as f64 / n as f64
    };

    StressSummary {
        iterations: n,
        mean_balance: balances.iter().sum::<f64>() / n as f64,
        percentiles: BalancePercentiles {
            p5: percentile(&balances, 0.05),
            p50: percentile(&balances, 0.50),
            p95: percentile(&balances, 0.95),
        },
        healthy_rate: rate(RiskBand::Healthy),
        warning_rate: rate(RiskBand::Warning),
        critical_rate: rate(RiskBand::Critical),
    }
}

/// Nearest-rank percentile of a sorted, non-empty slice
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ParameterSpec, Schema};

    fn live() -> ParameterSet {
        let schema = Schema::builder()
            .parameter(
                ParameterSpec::income("sponsorship")
                    .range(0.0, 200_000.0)
                    .default_value(90_000.0),
            )
            .parameter(
                ParameterSpec::expense("salaries")
                    .range(0.0, 200_000.0)
                    .default_value(80_000.0),
            )
            .build()
            .unwrap();
        ParameterSet::new(Arc::new(schema))
    }

    fn config(iterations: usize, relative_std_dev: f64, seed: u64) -> StressConfig {
        StressConfig {
            iterations,
            relative_std_dev,
            seed,
        }
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let t = RiskThresholds::new(-5_000.0);
        let set = live();
        assert!(stress_test(&set, &t, &config(0, 0.1, 0)).is_err());
        assert!(stress_test(&set, &t, &config(10, -0.1, 0)).is_err());
        assert!(stress_test(&set, &t, &config(10, f64::NAN, 0)).is_err());
        assert!(stress_test(&set, &t, &config(MAX_STRESS_ITERATIONS + 1, 0.1, 0)).is_err());
    }

    #[test]
    fn test_zero_deviation_reproduces_baseline() {
        let t = RiskThresholds::new(-5_000.0);
        let summary = stress_test(&live(), &t, &config(250, 0.0, 7)).unwrap();

        assert_eq!(summary.iterations, 250);
        assert_eq!(summary.mean_balance, 10_000.0);
        assert_eq!(summary.percentiles.p5, 10_000.0);
        assert_eq!(summary.percentiles.p95, 10_000.0);
        assert_eq!(summary.healthy_rate, 1.0);
        assert_eq!(summary.critical_rate, 0.0);
    }

    #[test]
    fn test_same_seed_same_summary() {
        let t = RiskThresholds::new(-5_000.0);
        let a = stress_test(&live(), &t, &config(350, 0.2, 42)).unwrap();
        let b = stress_test(&live(), &t, &config(350, 0.2, 42)).unwrap();
        assert_eq!(a, b);

        let c = stress_test(&live(), &t, &config(350, 0.2, 43)).unwrap();
        assert_ne!(a.mean_balance, c.mean_balance);
    }

    #[test]
    fn test_rates_and_percentiles_are_consistent() {
        let t = RiskThresholds::new(-5_000.0);
        let s = stress_test(&live(), &t, &config(1_000, 0.25, 3)).unwrap();

        let total = s.healthy_rate + s.warning_rate + s.critical_rate;
        assert!((total - 1.0).abs() < 1e-9);
        assert!(s.percentiles.p5 <= s.percentiles.p50);
        assert!(s.percentiles.p50 <= s.percentiles.p95);
        // Wide noise around a small surplus lands in every band
        assert!(s.healthy_rate > 0.0 && s.critical_rate > 0.0);
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 0.5), 3.0);
        assert_eq!(percentile(&sorted, 1.0), 5.0);
    }
}
