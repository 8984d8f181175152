//! Built-in scenarios
//!
//! - `finance` - club budget: income streams against running costs
//! - `alignment` - 0-10 fit scores against weighted concerns
//! - `resources` - weekly team hours available against hours committed

use whatif_core::{Category, DEFAULT_HISTORY_CAPACITY, RiskThresholds};

use crate::config::{ParameterEntry, ScenarioFile};

pub const PRESET_NAMES: [&str; 3] = ["finance", "alignment", "resources"];

fn entry(
    key: &str,
    label: &str,
    category: Category,
    range: (f64, f64),
    default: f64,
) -> ParameterEntry {
    ParameterEntry {
        key: key.to_string(),
        label: Some(label.to_string()),
        min: range.0,
        max: range.1,
        default,
        category,
        polarity: None,
    }
}

pub fn preset(name: &str) -> Option<ScenarioFile> {
    match name {
        "finance" => Some(finance()),
        "alignment" => Some(alignment()),
        "resources" => Some(resources()),
        _ => None,
    }
}

fn finance() -> ScenarioFile {
    use Category::{Expense, Income};
    ScenarioFile {
        name: "Club finances".to_string(),
        history_capacity: DEFAULT_HISTORY_CAPACITY,
        thresholds: RiskThresholds::new(-5_000.0),
        parameters: vec![
            entry("sponsorship", "Sponsorship", Income, (0.0, 200_000.0), 90_000.0),
            entry("tickets", "Ticket sales", Income, (0.0, 100_000.0), 25_000.0),
            entry("merchandise", "Merchandise", Income, (0.0, 50_000.0), 8_000.0),
            entry("salaries", "Salaries", Expense, (0.0, 200_000.0), 80_000.0),
            entry("venue", "Venue hire", Expense, (0.0, 60_000.0), 24_000.0),
            entry("travel", "Travel", Expense, (0.0, 40_000.0), 12_000.0),
        ],
    }
}

fn alignment() -> ScenarioFile {
    use Category::{Score, Weight};
    ScenarioFile {
        name: "Partner alignment".to_string(),
        history_capacity: DEFAULT_HISTORY_CAPACITY,
        thresholds: RiskThresholds::new(-3.0),
        parameters: vec![
            entry("mission_fit", "Mission fit", Score, (0.0, 10.0), 7.0),
            entry("audience_fit", "Audience fit", Score, (0.0, 10.0), 6.0),
            entry("budget_fit", "Budget fit", Score, (0.0, 10.0), 5.0),
            entry("reputation_risk", "Reputation risk", Weight, (0.0, 10.0), 4.0),
            entry("delivery_risk", "Delivery risk", Weight, (0.0, 10.0), 5.0),
            entry("exclusivity_cost", "Exclusivity cost", Weight, (0.0, 10.0), 3.0),
        ],
    }
}

fn resources() -> ScenarioFile {
    use Category::{Expense, Income};
    ScenarioFile {
        name: "Team capacity".to_string(),
        history_capacity: DEFAULT_HISTORY_CAPACITY,
        thresholds: RiskThresholds::new(-10.0),
        parameters: vec![
            entry("staff_hours", "Staff hours", Income, (0.0, 400.0), 160.0),
            entry("volunteer_hours", "Volunteer hours", Income, (0.0, 200.0), 40.0),
            entry("coaching", "Coaching", Expense, (0.0, 200.0), 80.0),
            entry("events", "Matchday events", Expense, (0.0, 200.0), 60.0),
            entry("admin", "Administration", Expense, (0.0, 100.0), 45.0),
        ],
    }
}
