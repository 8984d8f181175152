//! Immutable parameter sets
//!
//! A `ParameterSet` is one instant of every adjustable input declared by a
//! `Schema`. It is never mutated: each edit produces a new set, so history
//! entries and snapshots holding older sets stay exactly as they were.

use std::sync::Arc;

use crate::error::Result;
use crate::schema::{ParameterSpec, Schema};

/// Values for every key in a schema, clamped to their declared ranges.
///
/// Cloning is cheap: the schema and the value slice are shared.
/// Equality is structural (same schema, same values).
#[derive(Debug, Clone)]
pub struct ParameterSet {
    schema: Arc<Schema>,
    values: Arc<[f64]>,
}

impl PartialEq for ParameterSet {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.values == other.values
    }
}

impl ParameterSet {
    /// Seed a set with each parameter's default, clamped to its range
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = schema.specs().iter().map(|s| s.clamp(s.default)).collect();
        Self { schema, values }
    }

    /// Build a set from raw values in schema order, clamping each one.
    /// Missing trailing values fall back to defaults; NaN becomes the default.
    pub(crate) fn from_values(schema: Arc<Schema>, raw: &[f64]) -> Self {
        let values = schema
            .specs()
            .iter()
            .enumerate()
            .map(|(i, spec)| match raw.get(i) {
                Some(v) if !v.is_nan() => spec.clamp(*v),
                _ => spec.clamp(spec.default),
            })
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.schema.index_of(key).map(|i| self.values[i])
    }

    /// Values in schema declaration order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(spec, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&ParameterSpec, f64)> {
        self.schema.specs().iter().zip(self.values.iter().copied())
    }

    /// Return a new set with `key` set to `value` clamped into its range.
    ///
    /// Fails with `UnknownParameter` if `key` is not declared.
    pub fn with_change(&self, key: &str, value: f64) -> Result<Self> {
        self.with_changes([(key, value)])
    }

    /// Apply several edits at once. Every key is resolved before anything is
    /// applied, so an unknown key leaves no partial result.
    pub fn with_changes<'a, I>(&self, changes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let resolved = changes
            .into_iter()
            .map(|(key, value)| self.schema.resolve(key, value))
            .collect::<Result<Vec<_>>>()?;

        let mut values = self.values.to_vec();
        for (i, value) in resolved {
            values[i] = value;
        }

        Ok(Self {
            schema: Arc::clone(&self.schema),
            values: values.into(),
        })
    }
}
