use std::env;

use once_cell::sync::OnceCell;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adjustment::Adjustment;
use crate::confidence::ConfidenceLevel;
use crate::config::AlgorithmConfig;
use crate::pipeline::{CalibrationMode, CappedAdjustmentResult, calibrate};
use crate::scenario::ScenarioType;

pub const GOAL_LINES: [f64; 6] = [0.5, 1.5, 2.5, 3.5, 4.5, 5.5];

static POOL: OnceCell<Option<rayon::ThreadPool>> = OnceCell::new();

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRequest {
    pub scenario: ScenarioType,
    #[serde(default)]
    pub line: Option<f64>,
    pub base_probability: f64,
    pub base_confidence: ConfidenceLevel,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

impl MarketRequest {
    pub fn new(scenario: ScenarioType, base_probability: f64) -> Self {
        Self {
            scenario,
            line: None,
            base_probability,
            base_confidence: ConfidenceLevel::Medium,
            adjustments: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: f64) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.base_confidence = confidence;
        self
    }

    pub fn with_adjustments(mut self, adjustments: Vec<Adjustment>) -> Self {
        self.adjustments = adjustments;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOutcome {
    pub scenario: ScenarioType,
    pub line: Option<f64>,
    pub target_label: String,
    pub complement_label: String,
    pub target: f64,
    pub complement: f64,
    pub result: CappedAdjustmentResult,
}

impl MarketOutcome {
    pub fn from_result(
        scenario: ScenarioType,
        line: Option<f64>,
        result: CappedAdjustmentResult,
    ) -> Self {
        let (target_label, complement_label) = labels(scenario, line);
        let target = result.final_probability;
        Self {
            scenario,
            line,
            target_label,
            complement_label,
            target,
            complement: 100.0 - target,
            result,
        }
    }
}

fn labels(scenario: ScenarioType, line: Option<f64>) -> (String, String) {
    match scenario {
        ScenarioType::BothTeamsToScore => ("BTTS Yes".to_string(), "BTTS No".to_string()),
        ScenarioType::TotalGoalsOverUnder => {
            let line = line.unwrap_or(2.5);
            (format!("Over {line:.1}"), format!("Under {line:.1}"))
        }
        ScenarioType::MatchOutcome => ("Target".to_string(), "Field".to_string()),
        ScenarioType::FirstHalfActivity => (
            "First Half Goal".to_string(),
            "No First Half Goal".to_string(),
        ),
    }
}

pub fn calibrate_market(
    request: &MarketRequest,
    config: &AlgorithmConfig,
    mode: CalibrationMode,
) -> MarketOutcome {
    let result = calibrate(
        request.base_probability,
        &request.adjustments,
        request.scenario,
        Some(config),
        request.base_confidence,
        mode,
    );
    MarketOutcome::from_result(request.scenario, request.line, result)
}

/// Calibrate every market of a fixture in parallel. Output order follows `requests`.
pub fn calibrate_markets(
    requests: &[MarketRequest],
    config: &AlgorithmConfig,
    mode: CalibrationMode,
) -> Vec<MarketOutcome> {
    debug!(markets = requests.len(), ?mode, "calibrating fixture markets");
    let run = || {
        requests
            .par_iter()
            .map(|request| calibrate_market(request, config, mode))
            .collect::<Vec<_>>()
    };
    match POOL.get_or_init(build_pool) {
        Some(pool) => pool.install(run),
        None => run(),
    }
}

fn build_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(calibration_parallelism())
        .thread_name(|idx| format!("calibrate-{idx}"))
        .build()
        .ok()
}

fn calibration_parallelism() -> usize {
    env::var("CALIBRATION_PARALLELISM")
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 32)
}
