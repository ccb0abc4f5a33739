mod explanation;
mod policy;
mod rules;

pub use explanation::{explain, MAX_EXPLANATION_DEPTH, MIN_EXPLANATION_DEPTH};
pub use policy::{classify, HIGH_RISK_CEILING, LOW_RISK_FLOOR};

use super::domain::{ApplicantRecord, ScoredApplicant};

/// Error raised when a record slips past validation with inputs the rubric
/// cannot evaluate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("row {row}: income must be greater than zero to derive loan-to-income")]
    Division { row: usize },
}

/// Clamped rubric score in `[0, 1]`. Higher is safer.
///
/// Income must be strictly positive: loan-to-income is undefined otherwise.
pub fn score(record: &ApplicantRecord) -> Result<f64, ScoringError> {
    let income = record.features.income;
    if !(income.is_finite() && income > 0.0) {
        return Err(ScoringError::Division { row: record.row });
    }

    let raw = rules::raw_score(&record.features);
    if !raw.is_finite() {
        return Err(ScoringError::Division { row: record.row });
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// Stateless evaluator applying the rubric, tiers and explanation heuristic.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    explanation_depth: usize,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(MIN_EXPLANATION_DEPTH)
    }
}

impl ScoringEngine {
    pub fn new(explanation_depth: usize) -> Self {
        Self {
            explanation_depth: explanation_depth.clamp(MIN_EXPLANATION_DEPTH, MAX_EXPLANATION_DEPTH),
        }
    }

    pub fn evaluate(&self, record: ApplicantRecord) -> Result<ScoredApplicant, ScoringError> {
        let score = score(&record)?;
        let (risk_label, decision) = classify(score);
        let explanation = explain(&record.features, self.explanation_depth);

        Ok(ScoredApplicant {
            record,
            score,
            risk_label,
            decision,
            explanation,
        })
    }

    /// Scores every record, stopping at the first failure.
    pub fn evaluate_all(
        &self,
        records: Vec<ApplicantRecord>,
    ) -> Result<Vec<ScoredApplicant>, ScoringError> {
        records
            .into_iter()
            .map(|record| self.evaluate(record))
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn raw_score_for_tests(features: &super::domain::ApplicantFeatures) -> f64 {
    rules::raw_score(features)
}

#[cfg(test)]
pub(crate) fn factor_impacts_for_tests(
    features: &super::domain::ApplicantFeatures,
) -> Vec<super::domain::FeatureContribution> {
    explanation::factor_impacts(features)
}
