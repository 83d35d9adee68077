pub mod adjustment;
pub mod asymmetric;
pub mod bounds;
pub mod confidence;
pub mod config;
pub mod cumulative;
pub mod markets;
pub mod overcorrection;
pub mod pipeline;
pub mod scenario;

pub use adjustment::{Adjustment, AdjustmentCategory, AdjustmentError, categorize};
pub use confidence::{ConfidenceLevel, calculate_confidence};
pub use config::{AlgorithmConfig, ConfigError, default_config};
pub use pipeline::{
    AdjustmentSummary, CalibrationMode, CappedAdjustmentResult, apply_capped_adjustments, calibrate,
};
pub use scenario::ScenarioType;
