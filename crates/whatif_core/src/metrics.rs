//! Derived metrics pipeline
//!
//! `derive_metrics` maps a `ParameterSet` to totals per category, totals per
//! polarity, the signed balance and a risk band. It is pure and cheap, but
//! `MetricsCalculator` still memoizes the last result so that bursts of reads
//! against the same live state do not recompute.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, CachedValue};
use crate::error::SchemaError;
use crate::parameters::ParameterSet;
use crate::schema::{Category, Polarity};

/// Qualitative classification of the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Healthy,
    Warning,
    Critical,
}

impl RiskBand {
    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Healthy => "Healthy",
            RiskBand::Warning => "Warning",
            RiskBand::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Balance cut-offs for the risk bands.
///
/// `balance >= healthy_floor` is Healthy, `balance > low_threshold` is
/// Warning, anything else is Critical. The same engine serves currency
/// balances and score variances, so both cut-offs are configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default)]
    pub healthy_floor: f64,
    pub low_threshold: f64,
}

impl RiskThresholds {
    /// Thresholds with a healthy floor of zero
    #[must_use]
    pub fn new(low_threshold: f64) -> Self {
        Self {
            healthy_floor: 0.0,
            low_threshold,
        }
    }

    #[must_use]
    pub fn with_healthy_floor(mut self, healthy_floor: f64) -> Self {
        self.healthy_floor = healthy_floor;
        self
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if !self.healthy_floor.is_finite()
            || !self.low_threshold.is_finite()
            || self.low_threshold > self.healthy_floor
        {
            return Err(SchemaError::InvalidThresholds {
                healthy_floor: self.healthy_floor,
                low_threshold: self.low_threshold,
            });
        }
        Ok(())
    }

    pub fn classify(&self, balance: f64) -> RiskBand {
        if balance >= self.healthy_floor {
            RiskBand::Healthy
        } else if balance > self.low_threshold {
            RiskBand::Warning
        } else {
            RiskBand::Critical
        }
    }
}

/// Aggregate over the parameters in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    /// Mean value across the category's line items; None when it has none
    pub average: Option<f64>,
}

/// Computed, read-only view of a parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// One entry per category, in `Category::ALL` order
    pub categories: Vec<CategoryTotal>,
    pub positive_total: f64,
    pub negative_total: f64,
    /// `positive_total - negative_total`
    pub balance: f64,
    /// `positive_total / negative_total`; None when nothing is negative
    pub coverage_ratio: Option<f64>,
    pub risk: RiskBand,
}

impl DerivedMetrics {
    pub fn category(&self, category: Category) -> Option<&CategoryTotal> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Sum of the category's values, zero when it has no parameters
    pub fn total(&self, category: Category) -> f64 {
        self.category(category).map_or(0.0, |c| c.total)
    }
}

/// Run the metrics pipeline over `set` without caching
pub fn derive_metrics(set: &ParameterSet, thresholds: &RiskThresholds) -> DerivedMetrics {
    let mut totals = [0.0_f64; Category::ALL.len()];
    let mut counts = [0_usize; Category::ALL.len()];
    let mut positive_total = 0.0;
    let mut negative_total = 0.0;

    for (spec, value) in set.iter() {
        let i = spec.category.index();
        totals[i] += value;
        counts[i] += 1;
        match spec.polarity {
            Polarity::Positive => positive_total += value,
            Polarity::Negative => negative_total += value,
        }
    }

    let categories = Category::ALL
        .iter()
        .map(|&category| {
            let i = category.index();
            CategoryTotal {
                category,
                total: totals[i],
                count: counts[i],
                average: (counts[i] > 0).then(|| totals[i] / counts[i] as f64),
            }
        })
        .collect();

    let balance = positive_total - negative_total;
    let coverage_ratio = (negative_total != 0.0).then(|| positive_total / negative_total);

    DerivedMetrics {
        categories,
        positive_total,
        negative_total,
        balance,
        coverage_ratio,
        risk: thresholds.classify(balance),
    }
}

/// Metrics pipeline bound to a store's thresholds, memoizing the last result
#[derive(Debug)]
pub struct MetricsCalculator {
    thresholds: RiskThresholds,
    cache: CachedValue<ParameterSet, DerivedMetrics>,
}

impl MetricsCalculator {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self {
            thresholds,
            cache: CachedValue::new(),
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Metrics for `set`; a structurally equal set returns the cached result
    pub fn compute(&mut self, set: &ParameterSet) -> &DerivedMetrics {
        let thresholds = self.thresholds;
        self.cache
            .get_or_compute(set, |s| derive_metrics(s, &thresholds))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{ParameterSpec, Schema};

    fn club_schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder()
                .parameter(
                    ParameterSpec::income("sponsorship")
                        .range(0.0, 200_000.0)
                        .default_value(90_000.0),
                )
                .parameter(
                    ParameterSpec::income("tickets")
                        .range(0.0, 50_000.0)
                        .default_value(10_000.0),
                )
                .parameter(
                    ParameterSpec::expense("salaries")
                        .range(0.0, 200_000.0)
                        .default_value(80_000.0),
                )
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_classify_bands() {
        let t = RiskThresholds::new(-5_000.0);
        assert_eq!(t.classify(0.0), RiskBand::Healthy);
        assert_eq!(t.classify(10_000.0), RiskBand::Healthy);
        assert_eq!(t.classify(-1.0), RiskBand::Warning);
        assert_eq!(t.classify(-4_999.0), RiskBand::Warning);
        assert_eq!(t.classify(-5_000.0), RiskBand::Critical);
        assert_eq!(t.classify(-30_000.0), RiskBand::Critical);
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(RiskThresholds::new(-5.0).validate().is_ok());
        assert!(RiskThresholds::new(0.0).validate().is_ok());
        assert!(RiskThresholds::new(5.0).validate().is_err());
        assert!(RiskThresholds::new(f64::NAN).validate().is_err());
        assert!(
            RiskThresholds::new(2.0)
                .with_healthy_floor(3.0)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_derive_metrics_totals() {
        let set = ParameterSet::new(club_schema());
        let metrics = derive_metrics(&set, &RiskThresholds::new(-5_000.0));

        assert_eq!(metrics.total(Category::Income), 100_000.0);
        assert_eq!(metrics.total(Category::Expense), 80_000.0);
        assert_eq!(metrics.total(Category::Score), 0.0);
        assert_eq!(metrics.positive_total, 100_000.0);
        assert_eq!(metrics.negative_total, 80_000.0);
        assert_eq!(metrics.balance, 20_000.0);
        assert_eq!(metrics.coverage_ratio, Some(1.25));
        assert_eq!(metrics.risk, RiskBand::Healthy);

        let income = metrics.category(Category::Income).unwrap();
        assert_eq!(income.count, 2);
        assert_eq!(income.average, Some(50_000.0));
        assert_eq!(metrics.category(Category::Weight).unwrap().average, None);
    }

    #[test]
    fn test_polarity_drives_balance_not_category() {
        let schema = Arc::new(
            Schema::builder()
                .parameter(ParameterSpec::score("target").range(0.0, 10.0).default_value(8.0))
                .parameter(
                    ParameterSpec::score("actual")
                        .range(0.0, 10.0)
                        .default_value(6.0)
                        .polarity(Polarity::Negative),
                )
                .build()
                .unwrap(),
        );
        let metrics = derive_metrics(&ParameterSet::new(schema), &RiskThresholds::new(-2.0));
        assert_eq!(metrics.total(Category::Score), 14.0);
        assert_eq!(metrics.balance, 2.0);
    }

    #[test]
    fn test_calculator_memoizes_structurally_equal_sets() {
        let schema = club_schema();
        let mut calc = MetricsCalculator::new(RiskThresholds::new(-5_000.0));

        let a = ParameterSet::new(Arc::clone(&schema));
        let b = a.with_change("tickets", 0.0).unwrap();
        let a_again = b.with_change("tickets", 10_000.0).unwrap();

        assert_eq!(calc.compute(&a).balance, 20_000.0);
        assert_eq!(calc.compute(&a_again).balance, 20_000.0);
        assert_eq!(calc.cache_stats(), CacheStats { hits: 1, misses: 1 });

        assert_eq!(calc.compute(&b).balance, 10_000.0);
        assert_eq!(calc.cache_stats().misses, 2);
    }
}
