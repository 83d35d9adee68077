use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wc26_calibrate::markets::{GOAL_LINES, MarketOutcome, MarketRequest, calibrate_markets};
use wc26_calibrate::{Adjustment, AlgorithmConfig, CalibrationMode, ConfidenceLevel, ScenarioType};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalibrateCase {
    #[serde(default)]
    fixture: Option<String>,
    #[serde(default)]
    mode: CalibrationMode,
    markets: Vec<CaseMarket>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaseMarket {
    market: String,
    #[serde(default)]
    line: Option<f64>,
    base_probability: f64,
    #[serde(default = "default_confidence")]
    base_confidence: ConfidenceLevel,
    #[serde(default)]
    adjustments: Vec<Adjustment>,
}

fn default_confidence() -> ConfidenceLevel {
    ConfidenceLevel::Medium
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/calibrate_case.json"));

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let case: CalibrateCase =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    let config = AlgorithmConfig::from_env()?;

    let requests: Vec<MarketRequest> = case
        .markets
        .into_iter()
        .map(|m| {
            let scenario = ScenarioType::from_key(&m.market);
            if let Some(line) = m.line {
                if !GOAL_LINES.contains(&line) {
                    warn!(market = %m.market, line, "non-standard goal line");
                }
            }
            MarketRequest {
                scenario,
                line: m.line,
                base_probability: m.base_probability,
                base_confidence: m.base_confidence,
                adjustments: m.adjustments,
            }
        })
        .collect();

    info!(
        fixture = case.fixture.as_deref().unwrap_or("-"),
        markets = requests.len(),
        mode = ?case.mode,
        "calibrating"
    );

    for outcome in calibrate_markets(&requests, &config, case.mode) {
        print_outcome(&outcome);
    }

    Ok(())
}

fn print_outcome(outcome: &MarketOutcome) {
    let result = &outcome.result;
    println!("== {}", outcome.scenario);
    println!(
        "{}: {:.1}%  {}: {:.1}%",
        outcome.target_label, outcome.target, outcome.complement_label, outcome.complement
    );
    println!(
        "Base: {:.1}%  Net: {:+.1}  Confidence: {}  Capped: {}",
        result.base_probability,
        result.total_adjustment,
        result.confidence_level,
        result.was_capped
    );
    if let Some(warning) = &result.overcorrection_warning {
        println!("Warning: {warning}");
    }
    for (category, value) in &result.adjustment_summary.by_category {
        println!("  {category:<10} {value:+.2}");
    }
}
