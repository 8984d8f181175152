//! Parameter schema
//!
//! A `Schema` declares every adjustable input of a scenario: its key, the
//! allowed `[min, max]` range, the default value, a display category and the
//! polarity with which it feeds the aggregate balance. It is validated once
//! when built and then shared immutably by every `ParameterSet` created from it.
//!
//! # Example
//!
//! ```ignore
//! use whatif_core::schema::{ParameterSpec, Schema};
//!
//! let schema = Schema::builder()
//!     .parameter(ParameterSpec::income("sponsorship").range(0.0, 200_000.0).default_value(90_000.0))
//!     .parameter(ParameterSpec::expense("salaries").range(0.0, 200_000.0).default_value(80_000.0))
//!     .build()?;
//! ```

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, SchemaError};

/// Display grouping for a parameter. Not used for arithmetic; see `Polarity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Income,
    Expense,
    Score,
    Weight,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Income,
        Category::Expense,
        Category::Score,
        Category::Weight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Expense => "Expense",
            Category::Score => "Score",
            Category::Weight => "Weight",
        }
    }

    /// Polarity assumed when a parameter does not declare one explicitly
    pub fn default_polarity(&self) -> Polarity {
        match self {
            Category::Income | Category::Score => Polarity::Positive,
            Category::Expense | Category::Weight => Polarity::Negative,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Category::Income => 0,
            Category::Expense => 1,
            Category::Score => 2,
            Category::Weight => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a parameter adds to or subtracts from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn name(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declaration of a single adjustable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub key: String,
    /// Human-readable name; falls back to the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub category: Category,
    pub polarity: Polarity,
}

impl ParameterSpec {
    /// Create a parameter in `category` with the category's default polarity.
    /// The range starts as `[0, f64::MAX]` with a default of 0.
    #[must_use]
    pub fn new(key: impl Into<String>, category: Category) -> Self {
        Self {
            key: key.into(),
            label: None,
            min: 0.0,
            max: f64::MAX,
            default: 0.0,
            category,
            polarity: category.default_polarity(),
        }
    }

    #[must_use]
    pub fn income(key: impl Into<String>) -> Self {
        Self::new(key, Category::Income)
    }

    #[must_use]
    pub fn expense(key: impl Into<String>) -> Self {
        Self::new(key, Category::Expense)
    }

    #[must_use]
    pub fn score(key: impl Into<String>) -> Self {
        Self::new(key, Category::Score)
    }

    #[must_use]
    pub fn weight(key: impl Into<String>) -> Self {
        Self::new(key, Category::Weight)
    }

    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: f64) -> Self {
        self.default = value;
        self
    }

    #[must_use]
    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Display name for the parameter
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }

    /// Clamp `value` into `[min, max]`. Only valid on a validated spec.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if !self.min.is_finite() || !self.max.is_finite() || !self.default.is_finite() {
            return Err(SchemaError::NonFiniteBound {
                key: self.key.clone(),
            });
        }
        if self.min > self.max {
            return Err(SchemaError::InvalidRange {
                key: self.key.clone(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Validated, immutable set of parameter declarations in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    specs: Vec<ParameterSpec>,
    index: FxHashMap<String, usize>,
}

impl Schema {
    /// Validate `specs` and build a schema.
    ///
    /// Fails if the list is empty, a key repeats, or any bound is non-finite
    /// or inverted. Defaults outside the range are accepted and clamped when
    /// a `ParameterSet` is seeded.
    pub fn new(specs: Vec<ParameterSpec>) -> Result<Self, SchemaError> {
        if specs.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = FxHashMap::default();
        for (i, spec) in specs.iter().enumerate() {
            spec.validate()?;
            if index.insert(spec.key.clone(), i).is_some() {
                return Err(SchemaError::DuplicateKey(spec.key.clone()));
            }
        }

        Ok(Self { specs, index })
    }

    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn spec(&self, key: &str) -> Option<&ParameterSpec> {
        self.index.get(key).map(|&i| &self.specs[i])
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.key.as_str())
    }

    /// Resolve `key` and clamp `value` into its range.
    ///
    /// Returns the parameter's position along with the clamped value.
    pub fn resolve(&self, key: &str, value: f64) -> Result<(usize, f64), ScenarioError> {
        let i = self
            .index_of(key)
            .ok_or_else(|| ScenarioError::UnknownParameter(key.to_string()))?;
        if value.is_nan() {
            return Err(ScenarioError::NonFiniteValue {
                key: key.to_string(),
            });
        }
        Ok((i, self.specs[i].clamp(value)))
    }
}

/// Fluent builder for `Schema`
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    specs: Vec<ParameterSpec>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::new(self.specs)
    }
}
