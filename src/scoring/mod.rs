pub mod aggregate;
pub mod coefficient;

pub use aggregate::{recompute, select_winner, standings, valid_count};
pub use coefficient::{compute_coefficient, Trend};

// Derived view of a whole collection
#[derive(Debug, Clone, PartialEq)]
pub struct Standings {
    pub winner_id: Option<String>,
    pub winner_name: Option<String>,
    pub winner_average: Option<f64>,
    pub rows: Vec<StandingRow>,
}

// One line of the per-group summary
#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    pub group_id: String,
    pub name: String,
    pub valid_count: usize,
    pub total: f64,
    pub average: f64,
    pub is_winner: bool,
}

/// Rounds to the four decimals used for display and export.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
