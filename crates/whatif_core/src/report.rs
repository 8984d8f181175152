//! Plain-data export view of a scenario store.
//!
//! A `ScenarioReport` is fully owned and detached from the store: export
//! collaborators can serialize or reshape it freely without any path back
//! into engine state.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::history::HistoryInfo;
use crate::metrics::{DerivedMetrics, RiskBand, RiskThresholds, derive_metrics};
use crate::parameters::ParameterSet;
use crate::schema::{Category, Polarity};
use crate::snapshots::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub key: String,
    pub label: String,
    pub category: Category,
    pub polarity: Polarity,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    pub key: String,
    pub category: Category,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub name: String,
    pub saved_at: Timestamp,
    pub balance: f64,
    pub risk: RiskBand,
    pub values: Vec<ParameterValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub generated_at: Timestamp,
    pub thresholds: RiskThresholds,
    pub parameters: Vec<ParameterRow>,
    pub metrics: DerivedMetrics,
    pub snapshots: Vec<SnapshotReport>,
    pub history: HistoryInfo,
}

pub(crate) fn parameter_rows(set: &ParameterSet) -> Vec<ParameterRow> {
    set.iter()
        .map(|(spec, value)| ParameterRow {
            key: spec.key.clone(),
            label: spec.display_name().to_string(),
            category: spec.category,
            polarity: spec.polarity,
            value,
            min: spec.min,
            max: spec.max,
        })
        .collect()
}

pub(crate) fn snapshot_report(snapshot: &Snapshot, thresholds: &RiskThresholds) -> SnapshotReport {
    let metrics = derive_metrics(&snapshot.parameter_set, thresholds);
    SnapshotReport {
        name: snapshot.name.clone(),
        saved_at: snapshot.saved_at,
        balance: metrics.balance,
        risk: metrics.risk,
        values: snapshot
            .parameter_set
            .iter()
            .map(|(spec, value)| ParameterValue {
                key: spec.key.clone(),
                category: spec.category,
                value,
            })
            .collect(),
    }
}
