//! Read-only what-if analysis over a parameter set.
//!
//! Nothing in this module touches history or snapshots; every function takes
//! a `ParameterSet` and returns freshly computed plain data.
//!
//! # Sensitivity
//!
//! `sweep` steps one parameter evenly across its declared range and reports
//! the balance and risk band at each point. `sensitivity` evaluates every
//! parameter at its range endpoints and ranks parameters by how far they can
//! swing the balance.
//!
//! ```ignore
//! let points = sweep(&live, "sponsorship", 5, &thresholds)?;
//! let ranking = sensitivity(&live, &thresholds);
//! ```
//!
//! # Stress testing
//!
//! `stress_test` perturbs every parameter with seeded Gaussian noise and
//! summarises the distribution of outcomes. Runs are batched with a
//! deterministic seed per batch, so the result depends only on the inputs
//! and the seed (with or without the `parallel` feature).

mod stress;
mod sweep;

pub use stress::*;
pub use sweep::*;
