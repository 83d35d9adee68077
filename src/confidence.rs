use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfidenceDowngrade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    fn rank(self) -> i32 {
        match self {
            ConfidenceLevel::Low => 0,
            ConfidenceLevel::Medium => 1,
            ConfidenceLevel::High => 2,
        }
    }

    fn from_rank(rank: i32) -> Self {
        match rank.clamp(0, 2) {
            0 => ConfidenceLevel::Low,
            1 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

pub fn calculate_confidence(
    base: ConfidenceLevel,
    swing: f64,
    adjustment_count: usize,
    thresholds: &ConfidenceDowngrade,
) -> ConfidenceLevel {
    let swing = swing.abs();
    let mut rank = base.rank();
    if swing > thresholds.large_swing_threshold {
        rank -= 2;
    } else if swing > thresholds.medium_swing_threshold {
        rank -= 1;
    }
    if adjustment_count > thresholds.many_adjustments_threshold {
        rank -= 1;
    }
    ConfidenceLevel::from_rank(rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn high(swing: f64, count: usize) -> ConfidenceLevel {
        calculate_confidence(
            ConfidenceLevel::High,
            swing,
            count,
            &ConfidenceDowngrade::default(),
        )
    }

    #[test]
    fn downgrade_steps() {
        assert_eq!(high(5.0, 2), ConfidenceLevel::High);
        assert_eq!(high(18.0, 2), ConfidenceLevel::Low);
        assert_eq!(high(5.0, 7), ConfidenceLevel::Medium);
        assert_eq!(high(10.0, 2), ConfidenceLevel::Medium);
        assert_eq!(high(-18.0, 2), ConfidenceLevel::Low);
    }

    #[test]
    fn never_drops_below_low() {
        let level = calculate_confidence(
            ConfidenceLevel::Medium,
            19.0,
            9,
            &ConfidenceDowngrade::default(),
        );
        assert_eq!(level, ConfidenceLevel::Low);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(high(8.0, 5), ConfidenceLevel::High);
        assert_eq!(high(15.0, 5), ConfidenceLevel::Medium);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(ConfidenceLevel::Low < ConfidenceLevel::Medium);
        assert!(ConfidenceLevel::Medium < ConfidenceLevel::High);
        assert_eq!(
            serde_json::to_string(&ConfidenceLevel::Medium).unwrap(),
            "\"MEDIUM\""
        );
    }
}
