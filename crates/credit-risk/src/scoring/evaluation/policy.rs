use super::super::domain::{Decision, RiskLabel};

/// Scores below this are High risk.
pub const HIGH_RISK_CEILING: f64 = 0.4;
/// Scores at or above this are Low risk.
pub const LOW_RISK_FLOOR: f64 = 0.7;

/// Maps a clamped score onto its tier and recommended decision.
pub fn classify(score: f64) -> (RiskLabel, Decision) {
    let label = if score < HIGH_RISK_CEILING {
        RiskLabel::High
    } else if score < LOW_RISK_FLOOR {
        RiskLabel::Medium
    } else {
        RiskLabel::Low
    };

    (label, label.decision())
}
