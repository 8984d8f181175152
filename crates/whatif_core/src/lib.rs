//! Scenario simulation engine
//!
//! This crate provides the state engine behind interactive "what-if" tools:
//! a user adjusts numeric parameters, sees derived metrics recompute, and can
//! undo, snapshot and compare scenarios. It supports:
//! - Schema-declared parameters with ranges, categories and polarity
//! - Memoized derived metrics with configurable risk bands
//! - Bounded linear undo/redo history
//! - Named snapshots and field-by-field comparison
//! - Parameter sweeps, sensitivity ranking and seeded stress tests
//!
//! # Example
//!
//! ```ignore
//! use whatif_core::{ParameterSpec, RiskThresholds, ScenarioStore, Schema};
//!
//! let schema = Schema::builder()
//!     .parameter(ParameterSpec::income("sponsorship").range(0.0, 200_000.0).default_value(90_000.0))
//!     .parameter(ParameterSpec::expense("salaries").range(0.0, 200_000.0).default_value(80_000.0))
//!     .build()?;
//!
//! let mut store = ScenarioStore::new();
//! store.initialize(schema, RiskThresholds::new(-5_000.0))?;
//! store.save_snapshot("baseline")?;
//! store.set_parameter("sponsorship", 50_000.0)?;
//! assert_eq!(store.derived_metrics()?.balance, -30_000.0);
//! store.undo()?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod cache;
pub mod clock;
pub mod comparison;
pub mod error;
pub mod history;
pub mod metrics;
pub mod snapshots;
pub mod store;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod parameters;
pub mod report;
pub mod schema;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{
    BalancePercentiles, MAX_STRESS_ITERATIONS, MAX_SWEEP_STEPS, Sensitivity, StressConfig,
    StressSummary, SweepPoint,
};
pub use clock::{Clock, SystemClock};
pub use comparison::{ComparisonResult, ComparisonTarget, ParameterDelta};
pub use error::{Result, ScenarioError, SchemaError};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryInfo};
pub use metrics::{CategoryTotal, DerivedMetrics, RiskBand, RiskThresholds};
pub use parameters::ParameterSet;
pub use report::{ParameterRow, ParameterValue, ScenarioReport, SnapshotReport};
pub use schema::{Category, ParameterSpec, Polarity, Schema, SchemaBuilder};
pub use snapshots::SnapshotInfo;
pub use store::{ChangeEvent, ScenarioStore, StoreMode, StoreOptions, SubscriptionId};
