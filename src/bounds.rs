use tracing::debug;

use crate::adjustment::Adjustment;

pub const SWING_CAPPED_NOTE: &str = " (swing capped)";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingCap {
    pub before: f64,
    pub total: f64,
    pub fired: bool,
}

pub fn cap_swing(total: f64, max_swing: f64) -> SwingCap {
    let max_swing = max_swing.max(0.0);
    if total.abs() > max_swing {
        let capped = total.signum() * max_swing;
        debug!(total, max_swing, capped, "swing cap fired");
        SwingCap {
            before: total,
            total: capped,
            fired: true,
        }
    } else {
        SwingCap {
            before: total,
            total,
            fired: false,
        }
    }
}

pub fn rescale_to_swing(adjustments: Vec<Adjustment>, swing: &SwingCap) -> Vec<Adjustment> {
    if !swing.fired || swing.before == 0.0 {
        return adjustments;
    }
    let factor = swing.total / swing.before;
    adjustments
        .into_iter()
        .map(|adj| adj.scaled(factor).annotated(SWING_CAPPED_NOTE))
        .collect()
}

pub fn clamp_probability(probability: f64, min_prob: f64, max_prob: f64) -> (f64, bool) {
    // max/min instead of f64::clamp: never panics on an unvalidated config.
    let clamped = probability.max(min_prob).min(max_prob);
    let fired = clamped != probability;
    if fired {
        debug!(probability, min_prob, max_prob, "probability bound fired");
    }
    (clamped, fired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::net_total;

    #[test]
    fn swing_cap_keeps_sign() {
        let up = cap_swing(26.0, 20.0);
        assert!(up.fired);
        assert_eq!(up.total, 20.0);
        assert_eq!(up.before, 26.0);

        let down = cap_swing(-31.5, 20.0);
        assert_eq!(down.total, -20.0);

        let inside = cap_swing(-20.0, 20.0);
        assert!(!inside.fired);
    }

    #[test]
    fn negative_limit_never_flips_direction() {
        let up = cap_swing(3.0, -5.0);
        assert!(up.fired);
        assert_eq!(up.total, 0.0);

        let down = cap_swing(-3.0, -5.0);
        assert_eq!(down.total, 0.0);
    }

    #[test]
    fn rescaled_list_sums_to_capped_total() {
        let adjustments = vec![
            Adjustment::new("a", 12.0, "x").unwrap(),
            Adjustment::new("b", 18.0, "y").unwrap(),
            Adjustment::new("c", -5.0, "z").unwrap(),
        ];
        let swing = cap_swing(net_total(&adjustments), 20.0);
        let out = rescale_to_swing(adjustments, &swing);
        assert!((net_total(&out) - 20.0).abs() < 1e-9);
        assert!(out[2].reason().ends_with(SWING_CAPPED_NOTE));
        assert!(out[2].value() < 0.0);
    }

    #[test]
    fn untouched_when_swing_cap_did_not_fire() {
        let adjustments = vec![Adjustment::new("a", 3.0, "x").unwrap()];
        let swing = cap_swing(3.0, 20.0);
        assert_eq!(rescale_to_swing(adjustments.clone(), &swing), adjustments);
    }

    #[test]
    fn probability_clamp_reports_firing() {
        assert_eq!(clamp_probability(95.0, 10.0, 90.0), (90.0, true));
        assert_eq!(clamp_probability(4.0, 10.0, 90.0), (10.0, true));
        assert_eq!(clamp_probability(55.0, 10.0, 90.0), (55.0, false));
    }
}
