use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names every applicant batch must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "age",
    "income",
    "loan_amount",
    "credit_history",
    "employment_length",
    "debt_to_income",
];

/// Numeric inputs to the scoring rubric.
///
/// `debt_to_income` is a fraction in `[0, 1]`; `credit_history` is a bureau
/// score nominally between 300 and 850.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicantFeatures {
    pub age: f64,
    pub income: f64,
    pub loan_amount: f64,
    pub credit_history: f64,
    pub employment_length: f64,
    pub debt_to_income: f64,
}

impl ApplicantFeatures {
    pub fn loan_to_income(&self) -> f64 {
        self.loan_amount / self.income
    }
}

/// One validated row of an applicant batch.
///
/// `columns` keeps every original cell verbatim, in header order, so an
/// export reproduces the upload unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    pub row: usize,
    pub features: ApplicantFeatures,
    pub columns: Vec<(String, String)>,
}

impl ApplicantRecord {
    /// Builds a record whose columns are the canonical formatting of `features`.
    pub fn from_features(row: usize, features: ApplicantFeatures) -> Self {
        let columns = vec![
            ("age".to_string(), features.age.to_string()),
            ("income".to_string(), features.income.to_string()),
            ("loan_amount".to_string(), features.loan_amount.to_string()),
            (
                "credit_history".to_string(),
                features.credit_history.to_string(),
            ),
            (
                "employment_length".to_string(),
                features.employment_length.to_string(),
            ),
            (
                "debt_to_income".to_string(),
                features.debt_to_income.to_string(),
            ),
        ];

        Self {
            row,
            features,
            columns,
        }
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Discrete risk tier derived from the clamped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            RiskLabel::Low => Decision::Approve,
            RiskLabel::Medium => Decision::Review,
            RiskLabel::High => Decision::Reject,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recommended action for a scored applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approve,
    Review,
    Reject,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Approve => "Approve",
            Decision::Review => "Review",
            Decision::Reject => "Reject",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Signed influence of one input factor, used for reviewer-facing summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub name: &'static str,
    pub raw_value: f64,
    pub weighted_impact: f64,
}

impl FeatureContribution {
    /// Renders as `Income (+2.25)`; only strictly positive impacts get a `+`.
    /// Zero impacts render unsigned, never as `-0.00`.
    pub fn render(&self) -> String {
        let impact = if self.weighted_impact == 0.0 {
            0.0
        } else {
            self.weighted_impact
        };
        let sign = if impact > 0.0 { "+" } else { "" };
        format!("{} ({}{:.2})", self.name, sign, impact)
    }
}

/// Applicant paired with its score, tier, decision and explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredApplicant {
    pub record: ApplicantRecord,
    pub score: f64,
    pub risk_label: RiskLabel,
    pub decision: Decision,
    pub explanation: Vec<FeatureContribution>,
}

impl ScoredApplicant {
    pub fn explanation_summary(&self) -> String {
        let factors = self
            .explanation
            .iter()
            .map(FeatureContribution::render)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Key factors: {factors}")
    }

    pub fn view(&self) -> ScoredApplicantView {
        ScoredApplicantView {
            row: self.record.row,
            score: self.score,
            risk_label: self.risk_label.label(),
            decision: self.decision.label(),
            explanation: self.explanation_summary(),
        }
    }
}

/// Per-row payload returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredApplicantView {
    pub row: usize,
    pub score: f64,
    pub risk_label: &'static str,
    pub decision: &'static str,
    pub explanation: String,
}
