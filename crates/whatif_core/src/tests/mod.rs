//! Integration tests for the scenario engine
//!
//! Tests are organized by topic:
//! - `fixtures` - Shared schemas, a manual clock and a recording listener
//! - `example_scenario` - The sponsorship/salaries walkthrough end to end
//! - `history` - Undo boundary, inverse law, redo invalidation, bounded capacity
//! - `snapshots` - Round-trips, overwrite ordering and comparison symmetry
//! - `notifications` - Change events and failure atomicity
//! - `analysis` - Sweeps, sensitivity and stress runs through the store

mod example_scenario;
mod history;
