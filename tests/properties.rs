use proptest::prelude::*;

use wc26_calibrate::{
    Adjustment, CalibrationMode, ConfidenceLevel, ScenarioType, apply_capped_adjustments,
    calibrate, default_config,
};

const NAMES: [&str; 10] = [
    "formation_shape",
    "injuries_home",
    "dna_late_goals",
    "regression_risk",
    "fatigue_away",
    "momentum_home",
    "h2h_goals",
    "derby_context",
    "home_scoring_rate",
    "away_defensive_form",
];

const SCENARIOS: [ScenarioType; 4] = [
    ScenarioType::BothTeamsToScore,
    ScenarioType::TotalGoalsOverUnder,
    ScenarioType::MatchOutcome,
    ScenarioType::FirstHalfActivity,
];

fn adjustments() -> impl Strategy<Value = Vec<Adjustment>> {
    prop::collection::vec((0..NAMES.len(), -12.0f64..12.0), 0..14).prop_map(|raw| {
        raw.into_iter()
            .map(|(idx, value)| Adjustment::new(NAMES[idx], value, "generated").unwrap())
            .collect()
    })
}

fn confidence() -> impl Strategy<Value = ConfidenceLevel> {
    prop_oneof![
        Just(ConfidenceLevel::Low),
        Just(ConfidenceLevel::Medium),
        Just(ConfidenceLevel::High),
    ]
}

proptest! {
    #[test]
    fn final_probability_stays_in_bounds(
        base in -20.0f64..120.0,
        adjs in adjustments(),
        scenario in 0..SCENARIOS.len(),
        conf in confidence(),
    ) {
        let caps = &default_config().probability_caps;
        let result = apply_capped_adjustments(base, &adjs, SCENARIOS[scenario], None, conf);
        prop_assert!(result.final_probability >= caps.min_prob);
        prop_assert!(result.final_probability <= caps.max_prob);
    }

    #[test]
    fn net_swing_never_exceeds_cap(
        base in 0.0f64..100.0,
        adjs in adjustments(),
        scenario in 0..SCENARIOS.len(),
    ) {
        let max_swing = default_config().probability_caps.max_swing;
        let result =
            apply_capped_adjustments(base, &adjs, SCENARIOS[scenario], None, ConfidenceLevel::High);
        prop_assert!(result.total_adjustment.abs() <= max_swing + 1e-9);
    }

    #[test]
    fn reported_adjustments_sum_to_total(
        base in 0.0f64..100.0,
        adjs in adjustments(),
        scenario in 0..SCENARIOS.len(),
    ) {
        let result =
            apply_capped_adjustments(base, &adjs, SCENARIOS[scenario], None, ConfidenceLevel::High);
        let sum: f64 = result.capped_adjustments.iter().map(Adjustment::value).sum();
        prop_assert!((sum - result.total_adjustment).abs() < 1e-6);
        prop_assert_eq!(result.capped_adjustments.len(), adjs.len());
        prop_assert_eq!(result.adjustment_summary.adjustment_count, adjs.len());
        let by_category: f64 = result.adjustment_summary.by_category.values().sum();
        prop_assert!((by_category - sum).abs() < 1e-6);
    }

    #[test]
    fn confidence_is_never_upgraded(
        base in 0.0f64..100.0,
        adjs in adjustments(),
        conf in confidence(),
        uncapped in any::<bool>(),
    ) {
        let mode = if uncapped { CalibrationMode::Uncapped } else { CalibrationMode::Capped };
        let result = calibrate(base, &adjs, ScenarioType::MatchOutcome, None, conf, mode);
        prop_assert!(result.confidence_level <= conf);
    }

    #[test]
    fn uncapped_stays_within_soft_bounds(base in -50.0f64..150.0, adjs in adjustments()) {
        let soft = &default_config().uncapped;
        let result = calibrate(
            base,
            &adjs,
            ScenarioType::BothTeamsToScore,
            None,
            ConfidenceLevel::Medium,
            CalibrationMode::Uncapped,
        );
        prop_assert!(result.final_probability >= soft.min_prob);
        prop_assert!(result.final_probability <= soft.max_prob);
    }
}
