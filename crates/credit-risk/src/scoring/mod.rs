//! Batch credit scoring: CSV intake, rubric scoring, risk tiers, factor
//! explanations and CSV export.
//!
//! Records flow parser → evaluation → serializer. Each applicant is scored
//! independently; a batch is accepted or rejected as a whole.

pub mod domain;
pub(crate) mod evaluation;
pub mod parser;
pub mod router;
pub mod serializer;
pub mod service;
pub mod store;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantFeatures, ApplicantRecord, Decision, FeatureContribution, RiskLabel,
    ScoredApplicant, ScoredApplicantView, REQUIRED_COLUMNS,
};
pub use evaluation::{
    classify, explain, score, ScoringEngine, ScoringError, HIGH_RISK_CEILING, LOW_RISK_FLOOR,
    MAX_EXPLANATION_DEPTH, MIN_EXPLANATION_DEPTH,
};
pub use parser::{parse_records, validate_features, ParseError};
pub use router::{scoring_router, PredictRequest, PredictResponse, Prediction, MODEL_VERSION};
pub use serializer::{serialize, write_csv, SerializeError, RESULT_COLUMNS};
pub use service::{BatchOutcome, BatchScoringService, BatchServiceError};
pub use store::{FileSystemResultStore, ResultStore, StagedUpload, StoreError};
pub use summary::BatchSummary;
