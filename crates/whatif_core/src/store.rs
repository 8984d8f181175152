//! Scenario store
//!
//! `ScenarioStore` owns the live parameter set and coordinates the metrics
//! calculator, the undo/redo history and the snapshot archive. It moves
//! through three modes:
//!
//! - **Idle** until `initialize` is called; every operation fails with
//!   `StoreNotInitialized`.
//! - **Editing**, the default once initialized.
//! - **Comparing**, entered with `enter_comparison_mode`. The live set and the
//!   named snapshot are both readable, but anything that would change the
//!   live set fails with `ComparisonModeActive` until `exit_comparison_mode`.
//!
//! Listeners registered with `subscribe` receive a `ChangeEvent` after every
//! successful mutation. That is the only side effect; the store performs no
//! I/O and is meant to be owned by a single session.

use std::fmt;
use std::sync::Arc;

use crate::analysis::{Sensitivity, StressConfig, StressSummary, SweepPoint};
use crate::cache::CacheStats;
use crate::clock::{Clock, SystemClock};
use crate::comparison::{ComparisonResult, ComparisonTarget};
use crate::error::{Result, ScenarioError};
use crate::history::{DEFAULT_HISTORY_CAPACITY, HistoryEntry, HistoryInfo, HistoryStack};
use crate::metrics::{DerivedMetrics, MetricsCalculator, RiskThresholds};
use crate::parameters::ParameterSet;
use crate::report::{ScenarioReport, parameter_rows, snapshot_report};
use crate::schema::Schema;
use crate::snapshots::{SnapshotArchive, SnapshotInfo};

/// Store-level configuration that survives re-initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maximum retained history entries, live entry included
    pub history_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Idle,
    Editing,
    Comparing,
}

/// Notification sent to listeners after a successful mutation
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Initialized,
    /// `value` is the value actually stored, after clamping
    ParameterChanged {
        key: String,
        value: f64,
    },
    ParametersChanged {
        keys: Vec<String>,
    },
    SnapshotLoaded {
        name: String,
    },
    Undone,
    Redone,
    SnapshotSaved {
        name: String,
        replaced: bool,
    },
    SnapshotDeleted {
        name: String,
    },
    ComparisonEntered {
        snapshot: String,
    },
    ComparisonExited,
}

impl ChangeEvent {
    /// Whether the live parameter set changed
    pub fn changes_live_state(&self) -> bool {
        matches!(
            self,
            ChangeEvent::Initialized
                | ChangeEvent::ParameterChanged { .. }
                | ChangeEvent::ParametersChanged { .. }
                | ChangeEvent::SnapshotLoaded { .. }
                | ChangeEvent::Undone
                | ChangeEvent::Redone
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

type Listener = Box<dyn FnMut(&ChangeEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    fn notify(&mut self, event: &ChangeEvent) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }
}

/// State that exists only between `initialize` calls
struct Session {
    schema: Arc<Schema>,
    calculator: MetricsCalculator,
    history: HistoryStack,
    archive: SnapshotArchive,
    /// Snapshot under comparison; Some means Comparing mode
    comparing: Option<String>,
}

pub struct ScenarioStore {
    session: Option<Session>,
    listeners: Listeners,
    clock: Box<dyn Clock>,
    options: StoreOptions,
}

impl Default for ScenarioStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScenarioStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioStore")
            .field("mode", &self.mode())
            .field("options", &self.options)
            .field("listeners", &self.listeners.entries.len())
            .finish_non_exhaustive()
    }
}

impl ScenarioStore {
    /// Create an idle store with default options
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            session: None,
            listeners: Listeners::default(),
            clock: Box::new(SystemClock),
            options,
        }
    }

    /// Replace the timestamp source
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load a schema and thresholds, discarding any previous history and
    /// snapshots. On failure the store keeps its previous state.
    pub fn initialize(&mut self, schema: Schema, thresholds: RiskThresholds) -> Result<()> {
        thresholds.validate()?;

        let schema = Arc::new(schema);
        let initial = HistoryEntry {
            parameter_set: ParameterSet::new(Arc::clone(&schema)),
            timestamp: self.clock.now(),
        };
        let history = HistoryStack::new(initial, self.options.history_capacity)?;

        let reinitialized = self.session.is_some();
        tracing::info!(
            parameters = schema.len(),
            capacity = self.options.history_capacity,
            reinitialized,
            "Scenario store initialized"
        );

        self.session = Some(Session {
            schema,
            calculator: MetricsCalculator::new(thresholds),
            history,
            archive: SnapshotArchive::new(),
            comparing: None,
        });
        self.listeners.notify(&ChangeEvent::Initialized);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> StoreMode {
        match &self.session {
            None => StoreMode::Idle,
            Some(s) if s.comparing.is_some() => StoreMode::Comparing,
            Some(_) => StoreMode::Editing,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(ScenarioError::StoreNotInitialized)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(ScenarioError::StoreNotInitialized)
    }

    /// Session access for operations that change the live set
    fn editable(&mut self) -> Result<&mut Session> {
        let session = self.session_mut()?;
        if let Some(snapshot) = &session.comparing {
            return Err(ScenarioError::ComparisonModeActive {
                snapshot: snapshot.clone(),
            });
        }
        Ok(session)
    }

    // =========================================================================
    // Live state
    // =========================================================================

    pub fn schema(&self) -> Result<Arc<Schema>> {
        Ok(Arc::clone(&self.session()?.schema))
    }

    pub fn thresholds(&self) -> Result<RiskThresholds> {
        Ok(*self.session()?.calculator.thresholds())
    }

    /// The live parameter set
    pub fn current(&self) -> Result<ParameterSet> {
        Ok(self.session()?.history.current().clone())
    }

    pub fn get(&self, key: &str) -> Result<f64> {
        self.session()?
            .history
            .current()
            .get(key)
            .ok_or_else(|| ScenarioError::UnknownParameter(key.to_string()))
    }

    /// Set `key` to `value` clamped into its range, recording the previous
    /// state for undo. Returns the value actually stored.
    pub fn set_parameter(&mut self, key: &str, value: f64) -> Result<f64> {
        let timestamp = self.clock.now();
        let session = self.editable()?;

        let (_, applied) = session.schema.resolve(key, value)?;
        let next = session.history.current().with_change(key, applied)?;
        let trimmed = session.history.push(HistoryEntry {
            parameter_set: next,
            timestamp,
        });

        tracing::debug!(key, requested = value, applied, trimmed, "Parameter changed");
        self.listeners.notify(&ChangeEvent::ParameterChanged {
            key: key.to_string(),
            value: applied,
        });
        Ok(applied)
    }

    /// Apply several edits as a single history entry. Either every key is
    /// applied or, on an unknown key, nothing is.
    pub fn set_parameters<'a, I>(&mut self, changes: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let changes: Vec<(&str, f64)> = changes.into_iter().collect();
        let timestamp = self.clock.now();
        let session = self.editable()?;

        let next = session
            .history
            .current()
            .with_changes(changes.iter().copied())?;
        session.history.push(HistoryEntry {
            parameter_set: next,
            timestamp,
        });

        let keys: Vec<String> = changes.iter().map(|(k, _)| k.to_string()).collect();
        tracing::debug!(count = keys.len(), "Parameters changed");
        self.listeners.notify(&ChangeEvent::ParametersChanged { keys });
        Ok(())
    }

    /// Step back one edit. At the oldest retained entry this is a no-op that
    /// returns the unchanged live set.
    pub fn undo(&mut self) -> Result<ParameterSet> {
        let session = self.editable()?;
        if !session.history.can_undo() {
            return Ok(session.history.current().clone());
        }

        let set = session.history.undo().clone();
        tracing::debug!(depth = session.history.len(), "Undo");
        self.listeners.notify(&ChangeEvent::Undone);
        Ok(set)
    }

    /// Re-apply the last undone edit. A no-op when nothing was undone.
    pub fn redo(&mut self) -> Result<ParameterSet> {
        let session = self.editable()?;
        if !session.history.can_redo() {
            return Ok(session.history.current().clone());
        }

        let set = session.history.redo().clone();
        tracing::debug!(depth = session.history.len(), "Redo");
        self.listeners.notify(&ChangeEvent::Redone);
        Ok(set)
    }

    pub fn history_info(&self) -> Result<HistoryInfo> {
        Ok(self.session()?.history.info())
    }

    /// Metrics for the live set, memoized on its structural identity
    pub fn derived_metrics(&mut self) -> Result<DerivedMetrics> {
        let Session {
            calculator,
            history,
            ..
        } = self.session_mut()?;
        Ok(calculator.compute(history.current()).clone())
    }

    pub fn metrics_cache_stats(&self) -> Result<CacheStats> {
        Ok(self.session()?.calculator.cache_stats())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Archive the live set under `name`, replacing any snapshot of that name.
    /// Allowed in comparison mode since the live set is untouched.
    pub fn save_snapshot(&mut self, name: &str) -> Result<()> {
        let saved_at = self.clock.now();
        let session = self.session_mut()?;

        let set = session.history.current().clone();
        let replaced = session.archive.save(name, set, saved_at)?;

        tracing::info!(snapshot = name, replaced, "Snapshot saved");
        self.listeners.notify(&ChangeEvent::SnapshotSaved {
            name: name.to_string(),
            replaced,
        });
        Ok(())
    }

    /// Make snapshot `name` the live set. Recorded in history like any edit,
    /// so it can be undone.
    pub fn load_snapshot(&mut self, name: &str) -> Result<ParameterSet> {
        let timestamp = self.clock.now();
        let session = self.editable()?;

        let set = session.archive.load(name)?.clone();
        session.history.push(HistoryEntry {
            parameter_set: set.clone(),
            timestamp,
        });

        tracing::info!(snapshot = name, "Snapshot loaded");
        self.listeners.notify(&ChangeEvent::SnapshotLoaded {
            name: name.to_string(),
        });
        Ok(set)
    }

    /// Delete snapshot `name`. The snapshot under comparison cannot be
    /// deleted until comparison mode is exited.
    pub fn delete_snapshot(&mut self, name: &str) -> Result<()> {
        let session = self.session_mut()?;
        if session.comparing.as_deref() == Some(name) {
            return Err(ScenarioError::ComparisonModeActive {
                snapshot: name.to_string(),
            });
        }
        session
            .archive
            .remove(name)
            .ok_or_else(|| ScenarioError::SnapshotNotFound(name.to_string()))?;

        tracing::info!(snapshot = name, "Snapshot deleted");
        self.listeners.notify(&ChangeEvent::SnapshotDeleted {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Snapshot names and save times in insertion order
    pub fn snapshots(&self) -> Result<Vec<SnapshotInfo>> {
        Ok(self.session()?.archive.list())
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    pub fn enter_comparison_mode(&mut self, name: &str) -> Result<()> {
        let session = self.session_mut()?;
        if !session.archive.contains(name) {
            return Err(ScenarioError::SnapshotNotFound(name.to_string()));
        }
        session.comparing = Some(name.to_string());

        tracing::debug!(snapshot = name, "Comparison mode entered");
        self.listeners.notify(&ChangeEvent::ComparisonEntered {
            snapshot: name.to_string(),
        });
        Ok(())
    }

    /// Return to editing. A no-op when not comparing.
    pub fn exit_comparison_mode(&mut self) -> Result<()> {
        let session = self.session_mut()?;
        if session.comparing.take().is_some() {
            tracing::debug!("Comparison mode exited");
            self.listeners.notify(&ChangeEvent::ComparisonExited);
        }
        Ok(())
    }

    /// Name of the snapshot under comparison, None while editing
    pub fn comparing(&self) -> Result<Option<&str>> {
        Ok(self.session()?.comparing.as_deref())
    }

    /// Snapshot under comparison (before) against the live set (after).
    /// None while editing.
    pub fn comparison(&self) -> Result<Option<ComparisonResult>> {
        let session = self.session()?;
        let Some(name) = &session.comparing else {
            return Ok(None);
        };
        session
            .archive
            .compare(
                name,
                ComparisonTarget::Live,
                session.history.current(),
                session.calculator.thresholds(),
            )
            .map(Some)
    }

    /// The compared snapshot's set and the live set, for side-by-side display
    pub fn comparison_sets(&self) -> Result<Option<(ParameterSet, ParameterSet)>> {
        let session = self.session()?;
        let Some(name) = &session.comparing else {
            return Ok(None);
        };
        let snapshot = session.archive.load(name)?.clone();
        Ok(Some((snapshot, session.history.current().clone())))
    }

    /// Compare snapshot `name` with another snapshot or the live set.
    /// Available in any mode.
    pub fn compare(&self, name: &str, target: ComparisonTarget<'_>) -> Result<ComparisonResult> {
        let session = self.session()?;
        session.archive.compare(
            name,
            target,
            session.history.current(),
            session.calculator.thresholds(),
        )
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    pub fn sweep(&self, key: &str, steps: usize) -> Result<Vec<SweepPoint>> {
        let session = self.session()?;
        crate::analysis::sweep(
            session.history.current(),
            key,
            steps,
            session.calculator.thresholds(),
        )
    }

    pub fn sensitivity(&self) -> Result<Vec<Sensitivity>> {
        let session = self.session()?;
        Ok(crate::analysis::sensitivity(
            session.history.current(),
            session.calculator.thresholds(),
        ))
    }

    pub fn stress_test(&self, config: &StressConfig) -> Result<StressSummary> {
        let session = self.session()?;
        let summary = crate::analysis::stress_test(
            session.history.current(),
            session.calculator.thresholds(),
            config,
        )?;
        tracing::debug!(
            iterations = summary.iterations,
            seed = config.seed,
            "Stress test completed"
        );
        Ok(summary)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Owned plain-data view of the live state, snapshots and history
    pub fn report(&mut self) -> Result<ScenarioReport> {
        let generated_at = self.clock.now();
        let session = self.session_mut()?;

        let thresholds = *session.calculator.thresholds();
        let live = session.history.current();
        let metrics = session.calculator.compute(live).clone();

        Ok(ScenarioReport {
            generated_at,
            thresholds,
            parameters: parameter_rows(live),
            metrics,
            snapshots: session
                .archive
                .iter()
                .map(|s| snapshot_report(s, &thresholds))
                .collect(),
            history: session.history.info(),
        })
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Register a listener for change notifications. Works in any mode.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.listeners.add(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}
