use super::domain::{RiskLabel, ScoredApplicant};
use serde::Serialize;

/// Aggregate tier counts for a scored batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows_processed: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
}

impl BatchSummary {
    pub fn from_scored(scored: &[ScoredApplicant]) -> Self {
        scored
            .iter()
            .fold(Self::default(), |mut summary, applicant| {
                summary.rows_processed += 1;
                match applicant.risk_label {
                    RiskLabel::High => summary.high_risk += 1,
                    RiskLabel::Medium => summary.medium_risk += 1,
                    RiskLabel::Low => summary.low_risk += 1,
                }
                summary
            })
    }

    pub fn count(&self, label: RiskLabel) -> usize {
        match label {
            RiskLabel::High => self.high_risk,
            RiskLabel::Medium => self.medium_risk,
            RiskLabel::Low => self.low_risk,
        }
    }

    pub fn share(&self, label: RiskLabel) -> f64 {
        if self.rows_processed == 0 {
            return 0.0;
        }
        self.count(label) as f64 / self.rows_processed as f64
    }
}
