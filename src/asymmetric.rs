use tracing::trace;

use crate::adjustment::Adjustment;
use crate::config::AsymmetricProfile;

#[derive(Debug, Clone)]
pub struct AsymmetricOutcome {
    pub adjustments: Vec<Adjustment>,
    /// Number of adjustments that exceeded their directional ceiling.
    /// Risk multipliers alone do not count as clamping.
    pub clamped: usize,
}

impl AsymmetricOutcome {
    pub fn was_capped(&self) -> bool {
        self.clamped > 0
    }
}

pub fn apply_asymmetric_caps(
    adjustments: &[Adjustment],
    profile: &AsymmetricProfile,
) -> AsymmetricOutcome {
    let mut clamped = 0usize;
    let adjustments = adjustments
        .iter()
        .map(|adj| {
            let raw = adj.value();
            let value = if raw > 0.0 {
                if raw > profile.up_max {
                    clamped += 1;
                }
                raw.min(profile.up_max) * profile.up_risk_multiplier
            } else if raw < 0.0 {
                if raw < -profile.down_max {
                    clamped += 1;
                }
                raw.max(-profile.down_max) * profile.down_risk_multiplier
            } else {
                raw
            };
            trace!(name = adj.name(), raw, value, "asymmetric cap");
            adj.with_value(value)
        })
        .collect();

    AsymmetricOutcome {
        adjustments,
        clamped,
    }
}
