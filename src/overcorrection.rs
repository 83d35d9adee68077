use tracing::debug;

use crate::adjustment::Adjustment;

const MANY_ADJUSTMENTS_COUNT: usize = 5;
const MANY_ADJUSTMENTS_MIN_SWING: f64 = 8.0;
const LARGE_SWING: f64 = 18.0;
const CONFLICT_SIDE_TOTAL: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvercorrectionKind {
    TooManyAdjustments,
    LargeSwing,
    Conflicting,
}

impl OvercorrectionKind {
    pub fn dampening(self) -> f64 {
        match self {
            OvercorrectionKind::TooManyAdjustments => 0.85,
            OvercorrectionKind::LargeSwing => 0.8,
            OvercorrectionKind::Conflicting => 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionalTotals {
    pub total_positive: f64,
    pub total_negative: f64,
    pub count: usize,
}

impl DirectionalTotals {
    pub fn of(adjustments: &[Adjustment]) -> Self {
        let mut out = Self {
            count: adjustments.len(),
            ..Self::default()
        };
        for adj in adjustments {
            let v = adj.value();
            if v > 0.0 {
                out.total_positive += v;
            } else if v < 0.0 {
                out.total_negative += -v;
            }
        }
        out
    }

    pub fn swing(&self) -> f64 {
        (self.total_positive - self.total_negative).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overcorrection {
    pub kind: OvercorrectionKind,
    pub factor: f64,
    pub message: String,
}

// Many small same-direction signals are not penalized unless they also move the needle,
// so the volume rule needs both count and net swing.
pub fn detect_overcorrection(adjustments: &[Adjustment]) -> Option<Overcorrection> {
    let totals = DirectionalTotals::of(adjustments);
    let swing = totals.swing();

    let (kind, message) =
        if totals.count > MANY_ADJUSTMENTS_COUNT && swing >= MANY_ADJUSTMENTS_MIN_SWING {
            (
                OvercorrectionKind::TooManyAdjustments,
                format!(
                    "Too many adjustments ({}) with a net swing of {:.1} points",
                    totals.count, swing
                ),
            )
        } else if swing > LARGE_SWING {
            (
                OvercorrectionKind::LargeSwing,
                format!("Large total swing of {swing:.1} points"),
            )
        } else if totals.total_positive > CONFLICT_SIDE_TOTAL
            && totals.total_negative > CONFLICT_SIDE_TOTAL
        {
            (
                OvercorrectionKind::Conflicting,
                format!(
                    "Conflicting adjustments (+{:.1} / -{:.1})",
                    totals.total_positive, totals.total_negative
                ),
            )
        } else {
            return None;
        };

    let factor = kind.dampening();
    debug!(?kind, factor, swing, count = totals.count, "overcorrection detected");
    Some(Overcorrection {
        kind,
        factor,
        message: format!("{message}; dampened by {:.0}%", (1.0 - factor) * 100.0),
    })
}

pub fn dampen(adjustments: &[Adjustment], factor: f64) -> Vec<Adjustment> {
    adjustments.iter().map(|adj| adj.scaled(factor)).collect()
}
