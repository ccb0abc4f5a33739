//! Reviewer-facing factor ranking.
//!
//! These impacts are a coarse display heuristic with their own calibration;
//! they do not decompose the rubric score.

use super::super::domain::{ApplicantFeatures, FeatureContribution};

pub const MIN_EXPLANATION_DEPTH: usize = 2;
pub const MAX_EXPLANATION_DEPTH: usize = 5;

/// All factor impacts, in input field order.
pub(crate) fn factor_impacts(features: &ApplicantFeatures) -> Vec<FeatureContribution> {
    vec![
        FeatureContribution {
            name: "Income",
            raw_value: features.income,
            weighted_impact: (features.income / 10_000.0) * 0.3,
        },
        FeatureContribution {
            name: "Credit History",
            raw_value: features.credit_history,
            weighted_impact: -(features.credit_history / 100.0) * 0.2,
        },
        FeatureContribution {
            name: "Employment Length",
            raw_value: features.employment_length,
            weighted_impact: (features.employment_length / 10.0) * 0.1,
        },
        FeatureContribution {
            name: "Debt Ratio",
            raw_value: features.debt_to_income,
            weighted_impact: -(features.debt_to_income / 10.0) * 0.15,
        },
    ]
}

/// Top `depth` impacts by magnitude. The sort is stable, so equal magnitudes
/// keep field order.
pub fn explain(features: &ApplicantFeatures, depth: usize) -> Vec<FeatureContribution> {
    let depth = depth.clamp(MIN_EXPLANATION_DEPTH, MAX_EXPLANATION_DEPTH);
    let mut impacts = factor_impacts(features);
    impacts.sort_by(|a, b| {
        b.weighted_impact
            .abs()
            .total_cmp(&a.weighted_impact.abs())
    });
    impacts.truncate(depth);
    impacts
}
