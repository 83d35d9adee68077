use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adjustment::{Adjustment, AdjustmentCategory, net_total};
use crate::asymmetric::apply_asymmetric_caps;
use crate::bounds::{cap_swing, clamp_probability, rescale_to_swing};
use crate::confidence::{ConfidenceLevel, calculate_confidence};
use crate::config::{AlgorithmConfig, default_config};
use crate::cumulative::apply_cumulative_caps;
use crate::overcorrection::{DirectionalTotals, dampen, detect_overcorrection};
use crate::scenario::ScenarioType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationMode {
    #[default]
    Capped,
    Uncapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapFlags {
    pub cumulative: bool,
    pub overcorrection: bool,
    pub asymmetric: bool,
    pub swing: bool,
    pub bounds: bool,
}

impl CapFlags {
    pub fn any(&self) -> bool {
        self.cumulative || self.overcorrection || self.asymmetric || self.swing || self.bounds
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentSummary {
    pub total_positive: f64,
    pub total_negative: f64,
    pub adjustment_count: usize,
    pub by_category: BTreeMap<AdjustmentCategory, f64>,
}

impl AdjustmentSummary {
    pub fn from_adjustments(adjustments: &[Adjustment]) -> Self {
        let totals = DirectionalTotals::of(adjustments);
        let mut by_category = BTreeMap::new();
        for adj in adjustments {
            *by_category.entry(adj.category()).or_insert(0.0) += adj.value();
        }
        Self {
            total_positive: totals.total_positive,
            total_negative: totals.total_negative,
            adjustment_count: totals.count,
            by_category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CappedAdjustmentResult {
    pub final_probability: f64,
    pub base_probability: f64,
    pub total_adjustment: f64,
    pub total_adjustment_before_swing_cap: f64,
    /// Always sums to `total_adjustment`.
    pub capped_adjustments: Vec<Adjustment>,
    pub was_capped: bool,
    pub overcorrection_warning: Option<String>,
    pub confidence_level: ConfidenceLevel,
    pub adjustment_summary: AdjustmentSummary,
    pub mode: CalibrationMode,
    pub stages: CapFlags,
}

pub fn apply_capped_adjustments(
    base_probability: f64,
    adjustments: &[Adjustment],
    scenario: ScenarioType,
    config: Option<&AlgorithmConfig>,
    base_confidence: ConfidenceLevel,
) -> CappedAdjustmentResult {
    calibrate(
        base_probability,
        adjustments,
        scenario,
        config,
        base_confidence,
        CalibrationMode::Capped,
    )
}

pub fn calibrate(
    base_probability: f64,
    adjustments: &[Adjustment],
    scenario: ScenarioType,
    config: Option<&AlgorithmConfig>,
    base_confidence: ConfidenceLevel,
    mode: CalibrationMode,
) -> CappedAdjustmentResult {
    let config = config.unwrap_or_else(|| default_config());
    match mode {
        CalibrationMode::Capped => run_capped(
            base_probability,
            adjustments,
            scenario,
            config,
            base_confidence,
        ),
        CalibrationMode::Uncapped => {
            run_uncapped(base_probability, adjustments, config, base_confidence)
        }
    }
}

fn run_capped(
    base_probability: f64,
    adjustments: &[Adjustment],
    scenario: ScenarioType,
    config: &AlgorithmConfig,
    base_confidence: ConfidenceLevel,
) -> CappedAdjustmentResult {
    let mut stages = CapFlags::default();

    let cumulative = apply_cumulative_caps(adjustments, &config.cumulative_caps);
    stages.cumulative = cumulative.was_capped();

    let overcorrection = detect_overcorrection(&cumulative.adjustments);
    let dampened = match &overcorrection {
        Some(found) => {
            stages.overcorrection = true;
            dampen(&cumulative.adjustments, found.factor)
        }
        None => cumulative.adjustments,
    };

    let profile = config.asymmetric_weighting.profile_for(scenario);
    let asymmetric = apply_asymmetric_caps(&dampened, profile);
    stages.asymmetric = asymmetric.was_capped();

    let caps = &config.probability_caps;
    let swing = cap_swing(net_total(&asymmetric.adjustments), caps.max_swing);
    stages.swing = swing.fired;
    let capped_adjustments = rescale_to_swing(asymmetric.adjustments, &swing);

    let (final_probability, bound_fired) =
        clamp_probability(base_probability + swing.total, caps.min_prob, caps.max_prob);
    stages.bounds = bound_fired;

    let confidence_level = calculate_confidence(
        base_confidence,
        swing.total,
        adjustments.len(),
        &config.confidence_downgrade,
    );

    debug!(
        %scenario,
        base_probability,
        final_probability,
        total = swing.total,
        ?stages,
        %confidence_level,
        "calibrated"
    );

    CappedAdjustmentResult {
        final_probability,
        base_probability,
        total_adjustment: swing.total,
        total_adjustment_before_swing_cap: swing.before,
        adjustment_summary: AdjustmentSummary::from_adjustments(&capped_adjustments),
        capped_adjustments,
        was_capped: stages.any(),
        overcorrection_warning: overcorrection.map(|found| found.message),
        confidence_level,
        mode: CalibrationMode::Capped,
        stages,
    }
}

fn run_uncapped(
    base_probability: f64,
    adjustments: &[Adjustment],
    config: &AlgorithmConfig,
    base_confidence: ConfidenceLevel,
) -> CappedAdjustmentResult {
    let total = net_total(adjustments);
    let bounds = &config.uncapped;
    let (final_probability, bound_fired) =
        clamp_probability(base_probability + total, bounds.min_prob, bounds.max_prob);
    let stages = CapFlags {
        bounds: bound_fired,
        ..CapFlags::default()
    };
    let confidence_level = calculate_confidence(
        base_confidence,
        total,
        adjustments.len(),
        &config.confidence_downgrade,
    );

    CappedAdjustmentResult {
        final_probability,
        base_probability,
        total_adjustment: total,
        total_adjustment_before_swing_cap: total,
        capped_adjustments: adjustments.to_vec(),
        was_capped: stages.any(),
        overcorrection_warning: None,
        confidence_level,
        adjustment_summary: AdjustmentSummary::from_adjustments(adjustments),
        mode: CalibrationMode::Uncapped,
        stages,
    }
}
