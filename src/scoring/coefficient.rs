/// Normalized progress between two ranks, where a lower rank is better.
///
/// `z = 2 * (previous - current) / (previous + current)`, positive when the
/// rank number went down. Defined as `0` when both ranks sum to zero.
pub fn compute_coefficient(previous_rank: f64, current_rank: f64) -> f64 {
    let sum = previous_rank + current_rank;
    if sum == 0.0 {
        return 0.0;
    }
    2.0 * (previous_rank - current_rank) / sum
}

/// Direction of a single coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Progress,
    Regression,
    Steady,
    Unrated,
}

impl Trend {
    pub fn of(coefficient: Option<f64>) -> Self {
        match coefficient {
            None => Trend::Unrated,
            Some(z) if z > 0.0 => Trend::Progress,
            Some(z) if z < 0.0 => Trend::Regression,
            Some(_) => Trend::Steady,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Trend::Progress => "▲",
            Trend::Regression => "▼",
            Trend::Steady => "=",
            Trend::Unrated => "·",
        }
    }
}
