use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentCategory {
    Formation,
    Injuries,
    Dna,
    Safety,
    Rest,
    Motivation,
    H2h,
    Context,
    Other,
}

impl AdjustmentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentCategory::Formation => "formation",
            AdjustmentCategory::Injuries => "injuries",
            AdjustmentCategory::Dna => "dna",
            AdjustmentCategory::Safety => "safety",
            AdjustmentCategory::Rest => "rest",
            AdjustmentCategory::Motivation => "motivation",
            AdjustmentCategory::H2h => "h2h",
            AdjustmentCategory::Context => "context",
            AdjustmentCategory::Other => "other",
        }
    }
}

impl fmt::Display for AdjustmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// Priority order matters: "injuries_context_home" has to land in Injuries.
const KEYWORDS: &[(&str, AdjustmentCategory)] = &[
    ("formation", AdjustmentCategory::Formation),
    ("injur", AdjustmentCategory::Injuries),
    ("dna", AdjustmentCategory::Dna),
    ("genetic", AdjustmentCategory::Dna),
    ("safety", AdjustmentCategory::Safety),
    ("regression", AdjustmentCategory::Safety),
    ("risk", AdjustmentCategory::Safety),
    ("rest", AdjustmentCategory::Rest),
    ("fatigue", AdjustmentCategory::Rest),
    ("congestion", AdjustmentCategory::Rest),
    ("motivation", AdjustmentCategory::Motivation),
    ("momentum", AdjustmentCategory::Motivation),
    ("h2h", AdjustmentCategory::H2h),
    ("head", AdjustmentCategory::H2h),
    ("context", AdjustmentCategory::Context),
    ("derby", AdjustmentCategory::Context),
    ("venue", AdjustmentCategory::Context),
];

pub fn categorize(name: &str) -> AdjustmentCategory {
    let lowered = name.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(AdjustmentCategory::Other)
}

#[derive(Debug, Error, PartialEq)]
pub enum AdjustmentError {
    #[error("adjustment {name:?} has a non-finite value ({value})")]
    NonFiniteValue { name: String, value: f64 },

    #[error("adjustment {name:?} moves the probability by {value} but has no reason")]
    MissingReason { name: String, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAdjustment")]
pub struct Adjustment {
    category: AdjustmentCategory,
    name: String,
    value: f64,
    reason: String,
}

impl Adjustment {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Result<Self, AdjustmentError> {
        let name = name.into();
        let category = categorize(&name);
        Self::with_category(category, name, value, reason)
    }

    pub fn with_category(
        category: AdjustmentCategory,
        name: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Result<Self, AdjustmentError> {
        let name = name.into();
        let reason = reason.into();
        if !value.is_finite() {
            return Err(AdjustmentError::NonFiniteValue { name, value });
        }
        if value != 0.0 && reason.trim().is_empty() {
            return Err(AdjustmentError::MissingReason { name, value });
        }
        Ok(Self {
            category,
            name,
            value,
            reason,
        })
    }

    pub fn category(&self) -> AdjustmentCategory {
        self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub(crate) fn scaled(&self, factor: f64) -> Self {
        self.with_value(self.value * factor)
    }

    pub(crate) fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    pub(crate) fn annotated(mut self, note: &str) -> Self {
        self.reason.push_str(note);
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawAdjustment {
    #[serde(default)]
    category: Option<AdjustmentCategory>,
    // Older producers send `type` instead of `name`.
    #[serde(alias = "type")]
    name: String,
    value: f64,
    #[serde(default)]
    reason: String,
}

impl TryFrom<RawAdjustment> for Adjustment {
    type Error = AdjustmentError;

    fn try_from(raw: RawAdjustment) -> Result<Self, Self::Error> {
        match raw.category {
            Some(category) => Adjustment::with_category(category, raw.name, raw.value, raw.reason),
            None => Adjustment::new(raw.name, raw.value, raw.reason),
        }
    }
}

pub fn net_total(adjustments: &[Adjustment]) -> f64 {
    adjustments.iter().map(Adjustment::value).sum()
}
