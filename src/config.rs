use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::adjustment::AdjustmentCategory;
use crate::scenario::ScenarioType;

pub const DEFAULT_CATEGORY_CAP: f64 = 15.0;

pub const CONFIG_ENV: &str = "WC26_CALIBRATION_CONFIG";
const CONFIG_DIR: &str = "wc26_calibrate";
const CONFIG_FILE: &str = "config.json";

static DEFAULT_CONFIG: Lazy<AlgorithmConfig> = Lazy::new(AlgorithmConfig::default);

pub fn default_config() -> &'static AlgorithmConfig {
    &DEFAULT_CONFIG
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CumulativeCaps {
    pub formation: f64,
    pub injuries: f64,
    pub dna: f64,
    pub safety: f64,
    pub rest: f64,
}

impl Default for CumulativeCaps {
    fn default() -> Self {
        Self {
            formation: 15.0,
            injuries: 15.0,
            dna: 10.0,
            safety: 12.0,
            rest: 8.0,
        }
    }
}

impl CumulativeCaps {
    pub fn cap_for(&self, category: AdjustmentCategory) -> f64 {
        match category {
            AdjustmentCategory::Formation => self.formation,
            AdjustmentCategory::Injuries => self.injuries,
            AdjustmentCategory::Dna => self.dna,
            AdjustmentCategory::Safety => self.safety,
            AdjustmentCategory::Rest => self.rest,
            AdjustmentCategory::Motivation
            | AdjustmentCategory::H2h
            | AdjustmentCategory::Context
            | AdjustmentCategory::Other => DEFAULT_CATEGORY_CAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsymmetricProfile {
    pub up_max: f64,
    pub down_max: f64,
    pub up_risk_multiplier: f64,
    pub down_risk_multiplier: f64,
}

impl AsymmetricProfile {
    pub fn btts() -> Self {
        Self {
            up_max: 12.0,
            down_max: 15.0,
            up_risk_multiplier: 0.9,
            down_risk_multiplier: 1.0,
        }
    }

    pub fn over_under_goals() -> Self {
        Self::btts()
    }

    // Over-predicting a favourite costs more than under-predicting it.
    pub fn match_result() -> Self {
        Self {
            up_max: 10.0,
            down_max: 15.0,
            up_risk_multiplier: 0.85,
            down_risk_multiplier: 1.0,
        }
    }

    pub fn first_half() -> Self {
        Self {
            up_max: 10.0,
            down_max: 12.0,
            up_risk_multiplier: 0.85,
            down_risk_multiplier: 1.0,
        }
    }
}

impl Default for AsymmetricProfile {
    fn default() -> Self {
        Self::btts()
    }
}

// A profile in a file may name only the fields it changes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialProfile {
    up_max: Option<f64>,
    down_max: Option<f64>,
    up_risk_multiplier: Option<f64>,
    down_risk_multiplier: Option<f64>,
}

impl PartialProfile {
    fn over(self, base: AsymmetricProfile) -> AsymmetricProfile {
        AsymmetricProfile {
            up_max: self.up_max.unwrap_or(base.up_max),
            down_max: self.down_max.unwrap_or(base.down_max),
            up_risk_multiplier: self.up_risk_multiplier.unwrap_or(base.up_risk_multiplier),
            down_risk_multiplier: self
                .down_risk_multiplier
                .unwrap_or(base.down_risk_multiplier),
        }
    }
}

fn btts_profile<'de, D>(deserializer: D) -> Result<AsymmetricProfile, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PartialProfile::deserialize(deserializer)?.over(AsymmetricProfile::btts()))
}

fn partial_over<'de, D>(
    deserializer: D,
    base: AsymmetricProfile,
) -> Result<Option<AsymmetricProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PartialProfile>::deserialize(deserializer)?.map(|partial| partial.over(base)))
}

fn over_under_profile<'de, D>(deserializer: D) -> Result<Option<AsymmetricProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    partial_over(deserializer, AsymmetricProfile::over_under_goals())
}

fn match_result_profile<'de, D>(deserializer: D) -> Result<Option<AsymmetricProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    partial_over(deserializer, AsymmetricProfile::match_result())
}

fn first_half_profile<'de, D>(deserializer: D) -> Result<Option<AsymmetricProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    partial_over(deserializer, AsymmetricProfile::first_half())
}

/// Per-market profiles. A missing entry resolves to `btts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsymmetricWeighting {
    #[serde(default, deserialize_with = "btts_profile")]
    pub btts: AsymmetricProfile,
    #[serde(
        default,
        deserialize_with = "over_under_profile",
        skip_serializing_if = "Option::is_none"
    )]
    pub over_under_goals: Option<AsymmetricProfile>,
    #[serde(
        default,
        deserialize_with = "match_result_profile",
        skip_serializing_if = "Option::is_none"
    )]
    pub match_result: Option<AsymmetricProfile>,
    #[serde(
        default,
        deserialize_with = "first_half_profile",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_half: Option<AsymmetricProfile>,
}

impl Default for AsymmetricWeighting {
    fn default() -> Self {
        Self {
            btts: AsymmetricProfile::btts(),
            over_under_goals: Some(AsymmetricProfile::over_under_goals()),
            match_result: Some(AsymmetricProfile::match_result()),
            first_half: Some(AsymmetricProfile::first_half()),
        }
    }
}

impl AsymmetricWeighting {
    pub fn profile_for(&self, scenario: ScenarioType) -> &AsymmetricProfile {
        let entry = match scenario {
            ScenarioType::BothTeamsToScore => None,
            ScenarioType::TotalGoalsOverUnder => self.over_under_goals.as_ref(),
            ScenarioType::MatchOutcome => self.match_result.as_ref(),
            ScenarioType::FirstHalfActivity => self.first_half.as_ref(),
        };
        entry.unwrap_or(&self.btts)
    }

    fn profiles(&self) -> impl Iterator<Item = (&'static str, &AsymmetricProfile)> {
        [
            ("btts", Some(&self.btts)),
            ("overUnderGoals", self.over_under_goals.as_ref()),
            ("matchResult", self.match_result.as_ref()),
            ("firstHalf", self.first_half.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, profile)| profile.map(|p| (key, p)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbabilityCaps {
    pub max_swing: f64,
    pub min_prob: f64,
    pub max_prob: f64,
}

impl Default for ProbabilityCaps {
    fn default() -> Self {
        Self {
            max_swing: 20.0,
            min_prob: 10.0,
            max_prob: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfidenceDowngrade {
    pub large_swing_threshold: f64,
    pub medium_swing_threshold: f64,
    pub many_adjustments_threshold: usize,
}

impl Default for ConfidenceDowngrade {
    fn default() -> Self {
        Self {
            large_swing_threshold: 15.0,
            medium_swing_threshold: 8.0,
            many_adjustments_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoftBounds {
    pub min_prob: f64,
    pub max_prob: f64,
}

impl Default for SoftBounds {
    fn default() -> Self {
        Self {
            min_prob: 2.0,
            max_prob: 98.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlgorithmConfig {
    pub cumulative_caps: CumulativeCaps,
    pub asymmetric_weighting: AsymmetricWeighting,
    pub probability_caps: ProbabilityCaps,
    pub confidence_downgrade: ConfidenceDowngrade,
    pub uncapped: SoftBounds,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidMagnitude { field: String, value: f64 },

    #[error("{field}: minProb {min} is above maxProb {max}")]
    InvertedBounds { field: String, min: f64, max: f64 },

    #[error(
        "confidenceDowngrade: mediumSwingThreshold {medium} is above largeSwingThreshold {large}"
    )]
    ThresholdOrder { medium: f64, large: f64 },
}

impl AlgorithmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let caps = &self.cumulative_caps;
        for (field, value) in [
            ("cumulativeCaps.formation", caps.formation),
            ("cumulativeCaps.injuries", caps.injuries),
            ("cumulativeCaps.dna", caps.dna),
            ("cumulativeCaps.safety", caps.safety),
            ("cumulativeCaps.rest", caps.rest),
            ("probabilityCaps.maxSwing", self.probability_caps.max_swing),
            (
                "confidenceDowngrade.largeSwingThreshold",
                self.confidence_downgrade.large_swing_threshold,
            ),
            (
                "confidenceDowngrade.mediumSwingThreshold",
                self.confidence_downgrade.medium_swing_threshold,
            ),
        ] {
            check_magnitude(field, value)?;
        }

        for (key, profile) in self.asymmetric_weighting.profiles() {
            for (name, value) in [
                ("upMax", profile.up_max),
                ("downMax", profile.down_max),
                ("upRiskMultiplier", profile.up_risk_multiplier),
                ("downRiskMultiplier", profile.down_risk_multiplier),
            ] {
                check_magnitude(&format!("asymmetricWeighting.{key}.{name}"), value)?;
            }
        }

        check_bounds(
            "probabilityCaps",
            self.probability_caps.min_prob,
            self.probability_caps.max_prob,
        )?;
        check_bounds("uncapped", self.uncapped.min_prob, self.uncapped.max_prob)?;

        let downgrade = &self.confidence_downgrade;
        if downgrade.medium_swing_threshold > downgrade.large_swing_threshold {
            return Err(ConfigError::ThresholdOrder {
                medium: downgrade.medium_swing_threshold,
                large: downgrade.large_swing_threshold,
            });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read calibration config {}", path.display()))?;
        let config: AlgorithmConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse calibration config {}", path.display()))?;
        if let Err(err) = config.validate() {
            warn!(path = %path.display(), %err, "rejecting calibration config");
            return Err(err).with_context(|| format!("validate {}", path.display()));
        }
        debug!(path = %path.display(), "loaded calibration config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize calibration config")?;
        fs::write(&tmp, json).context("write calibration config")?;
        fs::rename(&tmp, path).context("swap calibration config")?;
        Ok(())
    }

    // An explicitly named file must exist; the XDG file is optional.
    pub fn from_env() -> Result<Self> {
        if let Ok(raw) = std::env::var(CONFIG_ENV) {
            if !raw.trim().is_empty() {
                return Self::load(Path::new(raw.trim()));
            }
        }
        match config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

fn check_magnitude(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMagnitude {
            field: field.to_string(),
            value,
        })
    }
}

fn check_bounds(field: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    check_magnitude(&format!("{field}.minProb"), min)?;
    check_magnitude(&format!("{field}.maxProb"), max)?;
    if min > max {
        return Err(ConfigError::InvertedBounds {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

pub fn config_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CONFIG_DIR).join(CONFIG_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR)
            .join(CONFIG_FILE),
    )
}
