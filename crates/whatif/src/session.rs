//! Interactive command session
//!
//! A `Session` owns one `ScenarioStore` initialized from a `ScenarioFile`
//! and executes parsed commands against it. Output goes to any `Write`;
//! command and engine errors are printed and the session carries on.

use std::cell::Cell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use whatif_core::{ComparisonTarget, ScenarioStore, StoreMode, StressConfig};

use crate::command::{Command, HELP};
use crate::config::{ConfigError, ScenarioFile};
use crate::export;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    scenario: ScenarioFile,
    store: ScenarioStore,
    /// Set by the store listener whenever the live parameters change
    live_changed: Rc<Cell<bool>>,
}

impl Session {
    pub fn new(scenario: ScenarioFile) -> Result<Self, ConfigError> {
        let store = ScenarioStore::with_options(scenario.store_options());
        Self::with_store(scenario, store)
    }

    /// Start a session on a caller-supplied (idle) store
    pub fn with_store(
        scenario: ScenarioFile,
        mut store: ScenarioStore,
    ) -> Result<Self, ConfigError> {
        let live_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&live_changed);
        store.subscribe(move |event| {
            tracing::trace!(?event, "Store changed");
            if event.changes_live_state() {
                flag.set(true);
            }
        });

        let mut session = Self {
            scenario,
            store,
            live_changed,
        };
        session.initialize()?;
        Ok(session)
    }

    fn initialize(&mut self) -> Result<(), ConfigError> {
        self.scenario.validate()?;
        let schema = self.scenario.schema()?;
        self.store
            .initialize(schema, self.scenario.thresholds)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.live_changed.set(false);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.scenario.name
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    /// Read commands from `input` until it ends or `quit` is seen
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
        prompt: bool,
    ) -> color_eyre::Result<()> {
        writeln!(
            out,
            "{} ({} parameters). Type 'help' for commands.",
            self.scenario.name,
            self.scenario.parameters.len()
        )?;
        writeln!(out, "{}", render::status(&self.store.derived_metrics()?))?;

        if prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
        for line in input.lines() {
            if self.run_line(&line?, out)? == Flow::Quit {
                break;
            }
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
        }
        Ok(())
    }

    /// Parse and execute one line, printing any error
    pub fn run_line<W: Write>(&mut self, line: &str, out: &mut W) -> std::io::Result<Flow> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                writeln!(out, "error: {e}")?;
                return Ok(Flow::Continue);
            }
        };

        match self.execute(&command, out) {
            Ok(flow) => Ok(flow),
            Err(e) => {
                tracing::warn!(?command, error = %e, "Command failed");
                writeln!(out, "error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute<W: Write>(
        &mut self,
        command: &Command,
        out: &mut W,
    ) -> color_eyre::Result<Flow> {
        tracing::debug!(?command, "Executing command");
        match command {
            Command::Set { key, value } => {
                let applied = self.store.set_parameter(key, *value)?;
                if applied == *value {
                    writeln!(out, "{key} = {}", render::number(applied))?;
                } else {
                    writeln!(
                        out,
                        "{key} = {} (clamped from {})",
                        render::number(applied),
                        render::number(*value)
                    )?;
                }
            }
            Command::Undo => {
                let could = self.store.history_info()?.can_undo();
                self.store.undo()?;
                writeln!(out, "{}", if could { "undone" } else { "nothing to undo" })?;
            }
            Command::Redo => {
                let could = self.store.history_info()?.can_redo();
                self.store.redo()?;
                writeln!(out, "{}", if could { "redone" } else { "nothing to redo" })?;
            }
            Command::Save { name } => {
                self.store.save_snapshot(name)?;
                writeln!(out, "saved snapshot '{name}'")?;
            }
            Command::Load { name } => {
                self.store.load_snapshot(name)?;
                writeln!(out, "loaded snapshot '{name}'")?;
            }
            Command::Delete { name } => {
                self.store.delete_snapshot(name)?;
                writeln!(out, "deleted snapshot '{name}'")?;
            }
            Command::Snapshots => {
                write!(out, "{}", render::snapshots(&self.store.snapshots()?))?;
            }
            Command::Metrics => {
                write!(out, "{}", render::metrics(&self.store.derived_metrics()?))?;
            }
            Command::History => {
                write!(out, "{}", render::history(&self.store.history_info()?))?;
            }
            Command::Compare { name, other } => {
                let target = match other {
                    Some(other) => ComparisonTarget::Snapshot(other),
                    None => ComparisonTarget::Live,
                };
                let result = self.store.compare(name, target)?;
                let after = other.as_deref().unwrap_or("live");
                write!(out, "{}", render::comparison(name, after, &result))?;
            }
            Command::Enter { name } => {
                self.store.enter_comparison_mode(name)?;
                writeln!(
                    out,
                    "comparing '{name}' with live parameters; edits disabled until 'exit'"
                )?;
                self.write_diff(out)?;
            }
            Command::Exit => {
                let was_comparing = self.store.mode() == StoreMode::Comparing;
                self.store.exit_comparison_mode()?;
                writeln!(
                    out,
                    "{}",
                    if was_comparing { "back to editing" } else { "not comparing" }
                )?;
            }
            Command::Diff => self.write_diff(out)?,
            Command::Sweep { key, steps } => {
                write!(out, "{}", render::sweep(key, &self.store.sweep(key, *steps)?))?;
            }
            Command::Sensitivity => {
                write!(out, "{}", render::sensitivity(&self.store.sensitivity()?))?;
            }
            Command::Stress {
                iterations,
                relative_std_dev,
                seed,
            } => {
                let config = StressConfig {
                    iterations: *iterations,
                    relative_std_dev: *relative_std_dev,
                    seed: *seed,
                };
                write!(out, "{}", render::stress(&self.store.stress_test(&config)?))?;
            }
            Command::Export { format, path } => {
                let report = self.store.report()?;
                export::write_report(&report, *format, &self.scenario.name, path)?;
                writeln!(out, "wrote {}", path.display())?;
            }
            Command::Report => {
                let report = self.store.report()?;
                write!(out, "{}", export::to_text(&report, &self.scenario.name))?;
            }
            Command::Reset => {
                self.initialize()?;
                tracing::info!(scenario = %self.scenario.name, "Session reset");
                writeln!(out, "reset to defaults; history and snapshots cleared")?;
                // Reset clears the flag, so show the fresh state explicitly
                writeln!(out, "{}", render::status(&self.store.derived_metrics()?))?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }

        if self.live_changed.take() {
            writeln!(out, "{}", render::status(&self.store.derived_metrics()?))?;
        }
        Ok(Flow::Continue)
    }

    fn write_diff<W: Write>(&self, out: &mut W) -> color_eyre::Result<()> {
        match (self.store.comparing()?, self.store.comparison()?) {
            (Some(name), Some(result)) => {
                write!(out, "{}", render::comparison(name, "live", &result))?
            }
            _ => writeln!(out, "not comparing; use 'enter NAME'")?,
        }
        Ok(())
    }
}
