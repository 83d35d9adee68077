use std::collections::BTreeMap;

use tracing::debug;

use crate::adjustment::{Adjustment, AdjustmentCategory};
use crate::config::CumulativeCaps;

pub const CAPPED_NOTE: &str = " (capped)";

#[derive(Debug, Clone)]
pub struct CumulativeOutcome {
    pub adjustments: Vec<Adjustment>,
    pub capped_categories: Vec<AdjustmentCategory>,
}

impl CumulativeOutcome {
    pub fn was_capped(&self) -> bool {
        !self.capped_categories.is_empty()
    }
}

pub fn apply_cumulative_caps(
    adjustments: &[Adjustment],
    caps: &CumulativeCaps,
) -> CumulativeOutcome {
    let mut totals: BTreeMap<AdjustmentCategory, f64> = BTreeMap::new();
    for adj in adjustments {
        *totals.entry(adj.category()).or_insert(0.0) += adj.value();
    }

    let mut factors: BTreeMap<AdjustmentCategory, f64> = BTreeMap::new();
    for (&category, &total) in &totals {
        let cap = caps.cap_for(category);
        if total.abs() > cap {
            let factor = cap / total.abs();
            debug!(%category, total, cap, factor, "category total over cumulative cap");
            factors.insert(category, factor);
        }
    }

    let adjustments = adjustments
        .iter()
        .map(|adj| match factors.get(&adj.category()) {
            Some(&factor) => adj.scaled(factor).annotated(CAPPED_NOTE),
            None => adj.clone(),
        })
        .collect();

    CumulativeOutcome {
        adjustments,
        capped_categories: factors.into_keys().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::net_total;

    fn adj(name: &str, value: f64) -> Adjustment {
        Adjustment::new(name, value, "test").unwrap()
    }

    #[test]
    fn group_over_cap_lands_on_cap() {
        let input = vec![adj("formation_a", 10.0), adj("formation_b", 10.0)];
        let out = apply_cumulative_caps(&input, &CumulativeCaps::default());
        assert!((net_total(&out.adjustments) - 15.0).abs() < 1e-9);
        assert!((out.adjustments[0].value() - 7.5).abs() < 1e-9);
        assert_eq!(out.capped_categories, vec![AdjustmentCategory::Formation]);
        assert!(out.adjustments[0].reason().ends_with(" (capped)"));
    }

    #[test]
    fn negative_group_keeps_sign() {
        let input = vec![adj("rest_days", -6.0), adj("fatigue", -6.0)];
        let out = apply_cumulative_caps(&input, &CumulativeCaps::default());
        assert!((net_total(&out.adjustments) + 8.0).abs() < 1e-9);
    }

    #[test]
    fn groups_within_cap_pass_through() {
        let input = vec![
            adj("formation_a", 10.0),
            adj("injuries_home", -14.0),
            adj("h2h_goals", 4.0),
        ];
        let out = apply_cumulative_caps(&input, &CumulativeCaps::default());
        assert!(!out.was_capped());
        assert_eq!(out.adjustments, input);
    }

    #[test]
    fn only_the_offending_category_is_rescaled() {
        let input = vec![
            adj("dna_a", 8.0),
            adj("home_scoring_rate", 3.0),
            adj("dna_b", 8.0),
        ];
        let out = apply_cumulative_caps(&input, &CumulativeCaps::default());
        assert_eq!(out.adjustments[1], input[1]);
        assert!((out.adjustments[0].value() + out.adjustments[2].value() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_signs_are_judged_on_net_total() {
        // 12 - 6 = 6 stays under the 15 cap even though the gross movement is 18.
        let input = vec![adj("formation_a", 12.0), adj("formation_b", -6.0)];
        let out = apply_cumulative_caps(&input, &CumulativeCaps::default());
        assert!(!out.was_capped());
    }
}
