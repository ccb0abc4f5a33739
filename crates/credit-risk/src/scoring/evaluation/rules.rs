use super::super::domain::ApplicantFeatures;

const INCOME_CEILING: f64 = 150_000.0;
const CREDIT_FLOOR: f64 = 300.0;
const CREDIT_SPAN: f64 = 550.0;
const EMPLOYMENT_CEILING_YEARS: f64 = 10.0;
const AGE_FLOOR: f64 = 18.0;
const AGE_SPAN: f64 = 50.0;
const DEBT_RATIO_CEILING: f64 = 0.5;

const INCOME_WEIGHT: f64 = 0.30;
const CREDIT_WEIGHT: f64 = 0.30;
const EMPLOYMENT_WEIGHT: f64 = 0.20;
const AGE_WEIGHT: f64 = 0.10;
const DEBT_WEIGHT: f64 = 0.10;

/// Loan-to-income thresholds and the multiplier applied above each. Both
/// apply once the ratio exceeds the second threshold.
const LOAN_PENALTIES: [(f64, f64); 2] = [(0.5, 0.8), (1.0, 0.7)];

/// Weighted per-factor terms before penalties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WeightedTerms {
    pub income: f64,
    pub credit: f64,
    pub employment: f64,
    pub age: f64,
    pub debt: f64,
}

impl WeightedTerms {
    pub(crate) fn total(&self) -> f64 {
        self.income + self.credit + self.employment + self.age + self.debt
    }
}

pub(crate) fn weighted_terms(features: &ApplicantFeatures) -> WeightedTerms {
    WeightedTerms {
        income: (features.income / INCOME_CEILING).min(1.0) * INCOME_WEIGHT,
        credit: ((features.credit_history - CREDIT_FLOOR) / CREDIT_SPAN) * CREDIT_WEIGHT,
        employment: (features.employment_length / EMPLOYMENT_CEILING_YEARS).min(1.0)
            * EMPLOYMENT_WEIGHT,
        age: ((features.age - AGE_FLOOR) / AGE_SPAN).min(1.0) * AGE_WEIGHT,
        debt: (1.0 - (features.debt_to_income / DEBT_RATIO_CEILING).min(1.0)) * DEBT_WEIGHT,
    }
}

pub(crate) fn apply_loan_penalties(raw_score: f64, loan_to_income: f64) -> f64 {
    LOAN_PENALTIES
        .iter()
        .filter(|(threshold, _)| loan_to_income > *threshold)
        .fold(raw_score, |score, (_, multiplier)| score * multiplier)
}

/// Unclamped score after penalties.
pub(crate) fn raw_score(features: &ApplicantFeatures) -> f64 {
    let terms = weighted_terms(features);
    apply_loan_penalties(terms.total(), features.loan_to_income())
}
