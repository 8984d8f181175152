//! Command-driven front end for the whatif scenario engine
//!
//! Loads a scenario from YAML or a built-in preset, runs a line-oriented
//! command session against a `ScenarioStore`, and exports reports as CSV or
//! plain text.

// ============================================================================
// Session and commands
// ============================================================================

pub mod command;
pub mod session;

// ============================================================================
// Configuration
// ============================================================================

pub mod config;
pub mod presets;

// ============================================================================
// Output
// ============================================================================

pub mod export;
pub mod render;

// ============================================================================
// Infrastructure
// ============================================================================

pub mod logging;
pub mod util;

pub use command::{Command, CommandError, ExportFormat};
pub use config::{ConfigError, ParameterEntry, ScenarioFile};
pub use logging::init_logging;
pub use session::{Flow, Session};
