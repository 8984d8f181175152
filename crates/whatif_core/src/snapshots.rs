//! Named snapshot archive
//!
//! Snapshots are kept in insertion order. Saving under an existing name
//! replaces the stored set but keeps the snapshot's original position, so
//! lists shown to the user never reshuffle.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::comparison::{ComparisonResult, ComparisonTarget, compare};
use crate::error::{Result, ScenarioError};
use crate::metrics::RiskThresholds;
use crate::parameters::ParameterSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub name: String,
    pub parameter_set: ParameterSet,
    pub saved_at: Timestamp,
}

/// Name and save time of an archived snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub name: String,
    pub saved_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotArchive {
    snapshots: Vec<Snapshot>,
    index: FxHashMap<String, usize>,
}

impl SnapshotArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`. Returns true when an existing snapshot
    /// was replaced.
    pub fn save(&mut self, name: &str, set: ParameterSet, saved_at: Timestamp) -> Result<bool> {
        if name.trim().is_empty() {
            return Err(ScenarioError::InvalidSnapshotName);
        }

        let snapshot = Snapshot {
            name: name.to_string(),
            parameter_set: set,
            saved_at,
        };

        match self.index.get(name) {
            Some(&i) => {
                self.snapshots[i] = snapshot;
                Ok(true)
            }
            None => {
                self.index.insert(name.to_string(), self.snapshots.len());
                self.snapshots.push(snapshot);
                Ok(false)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Snapshot> {
        self.index.get(name).map(|&i| &self.snapshots[i])
    }

    pub fn load(&self, name: &str) -> Result<&ParameterSet> {
        self.get(name)
            .map(|s| &s.parameter_set)
            .ok_or_else(|| ScenarioError::SnapshotNotFound(name.to_string()))
    }

    /// Remove `name` if present
    pub fn remove(&mut self, name: &str) -> Option<Snapshot> {
        let i = self.index.remove(name)?;
        let removed = self.snapshots.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Names and save times in insertion order
    pub fn list(&self) -> Vec<SnapshotInfo> {
        self.snapshots
            .iter()
            .map(|s| SnapshotInfo {
                name: s.name.clone(),
                saved_at: s.saved_at,
            })
            .collect()
    }

    /// Compare snapshot `name` (before) with `target` (after).
    /// `live` is used when the target is `ComparisonTarget::Live`.
    pub fn compare(
        &self,
        name: &str,
        target: ComparisonTarget<'_>,
        live: &ParameterSet,
        thresholds: &RiskThresholds,
    ) -> Result<ComparisonResult> {
        let before = self.load(name)?;
        let after = match target {
            ComparisonTarget::Snapshot(other) => self.load(other)?,
            ComparisonTarget::Live => live,
        };
        Ok(compare(before, after, thresholds))
    }
}
