use std::fmt;

/// Errors raised while validating a schema or store configuration
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A schema must declare at least one parameter
    Empty,
    DuplicateKey(String),
    /// `min` is greater than `max`
    InvalidRange {
        key: String,
        min: f64,
        max: f64,
    },
    /// `min`, `max` or `default` is NaN or infinite
    NonFiniteBound {
        key: String,
    },
    InvalidThresholds {
        healthy_floor: f64,
        low_threshold: f64,
    },
    ZeroHistoryCapacity,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Empty => write!(f, "schema declares no parameters"),
            SchemaError::DuplicateKey(key) => write!(f, "parameter '{key}' is declared twice"),
            SchemaError::InvalidRange { key, min, max } => {
                write!(f, "parameter '{key}' has min {min} greater than max {max}")
            }
            SchemaError::NonFiniteBound { key } => {
                write!(f, "parameter '{key}' has a non-finite min, max or default")
            }
            SchemaError::InvalidThresholds {
                healthy_floor,
                low_threshold,
            } => write!(
                f,
                "low threshold {low_threshold} must be finite and not above healthy floor {healthy_floor}"
            ),
            SchemaError::ZeroHistoryCapacity => write!(f, "history capacity must be at least 1"),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Errors returned by scenario store operations.
///
/// Every variant is a local, recoverable condition. An operation that
/// returns an error leaves the store exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    /// Operation attempted before `initialize`
    StoreNotInitialized,
    /// Key is not declared in the schema
    UnknownParameter(String),
    /// No snapshot is archived under this name
    SnapshotNotFound(String),
    /// Live state cannot change while comparing against a snapshot
    ComparisonModeActive { snapshot: String },
    /// NaN was supplied as a parameter value
    NonFiniteValue { key: String },
    /// Snapshot names must contain at least one non-whitespace character
    InvalidSnapshotName,
    InvalidStressConfig(&'static str),
    /// Sweep step count above `MAX_SWEEP_STEPS`
    InvalidSweepSteps { steps: usize, max: usize },
    Schema(SchemaError),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::StoreNotInitialized => write!(f, "scenario store is not initialized"),
            ScenarioError::UnknownParameter(key) => write!(f, "unknown parameter '{key}'"),
            ScenarioError::SnapshotNotFound(name) => write!(f, "snapshot '{name}' not found"),
            ScenarioError::ComparisonModeActive { snapshot } => write!(
                f,
                "comparing against snapshot '{snapshot}'; exit comparison mode before editing"
            ),
            ScenarioError::NonFiniteValue { key } => {
                write!(f, "value for parameter '{key}' is not a number")
            }
            ScenarioError::InvalidSnapshotName => write!(f, "snapshot name cannot be empty"),
            ScenarioError::InvalidStressConfig(reason) => {
                write!(f, "invalid stress test configuration: {reason}")
            }
            ScenarioError::InvalidSweepSteps { steps, max } => {
                write!(f, "sweep of {steps} steps exceeds the maximum of {max}")
            }
            ScenarioError::Schema(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemaError> for ScenarioError {
    fn from(err: SchemaError) -> Self {
        ScenarioError::Schema(err)
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
