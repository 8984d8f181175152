//! YAML scenario definitions
//!
//! A scenario file names the scenario and supplies everything
//! `ScenarioStore::initialize` needs:
//!
//! ```yaml
//! name: Club finances
//! history_capacity: 200
//! thresholds: { healthy_floor: 0, low_threshold: -5000 }
//! parameters:
//!   - { key: sponsorship, min: 0, max: 200000, default: 90000, category: income }
//!   - { key: salaries, min: 0, max: 200000, default: 80000, category: expense }
//! ```
//!
//! `polarity` is optional and defaults from the category.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use whatif_core::{
    Category, DEFAULT_HISTORY_CAPACITY, ParameterSpec, Polarity, RiskThresholds, Schema,
    StoreOptions,
};

/// Error types for scenario file loading
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid scenario: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_thresholds() -> RiskThresholds {
    RiskThresholds::new(0.0)
}

/// One parameter as written in a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
}

impl ParameterEntry {
    fn to_spec(&self) -> ParameterSpec {
        let mut spec = ParameterSpec::new(self.key.clone(), self.category)
            .range(self.min, self.max)
            .default_value(self.default);
        if let Some(polarity) = self.polarity {
            spec = spec.polarity(polarity);
        }
        if let Some(label) = &self.label {
            spec = spec.label(label.clone());
        }
        spec
    }
}

/// Contents of a scenario YAML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub name: String,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_thresholds")]
    pub thresholds: RiskThresholds,
    pub parameters: Vec<ParameterEntry>,
}

impl ScenarioFile {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.display(),
            scenario = %file.name,
            parameters = file.parameters.len(),
            "Loaded scenario file"
        );
        Ok(file)
    }

    /// Validated schema built from the parameter entries
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        Schema::new(self.parameters.iter().map(ParameterEntry::to_spec).collect())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Check everything `initialize` would reject, without building a store
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schema()?;
        self.thresholds
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            history_capacity: self.history_capacity,
        }
    }
}
