use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{ApplicantFeatures, ApplicantRecord, ScoredApplicant, ScoredApplicantView};
use super::evaluation::{ScoringEngine, ScoringError};
use super::parser::{self, ParseError};
use super::serializer::{self, SerializeError};
use super::store::{ResultStore, StoreError};
use super::summary::BatchSummary;
use crate::config::ScoringConfig;

/// Result of scoring one uploaded batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    #[serde(flatten)]
    pub summary: BatchSummary,
    pub result_file: String,
    pub results: Vec<ScoredApplicantView>,
}

/// Service composing the parser, scoring engine, serializer and result store.
pub struct BatchScoringService<S> {
    store: Arc<S>,
    engine: ScoringEngine,
    max_batch_rows: usize,
    batch_timeout: Duration,
}

impl<S> BatchScoringService<S>
where
    S: ResultStore + 'static,
{
    pub fn new(store: Arc<S>, config: &ScoringConfig) -> Self {
        Self {
            store,
            engine: ScoringEngine::new(config.explanation_depth),
            max_batch_rows: config.max_batch_rows,
            batch_timeout: config.batch_timeout,
        }
    }

    /// Parses and scores a CSV batch without touching storage.
    pub fn score_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<Vec<ScoredApplicant>, BatchServiceError> {
        let records = parser::parse_records(reader, self.max_batch_rows)?;
        debug!(rows = records.len(), "applicant batch parsed");
        Ok(self.engine.evaluate_all(records)?)
    }

    /// Scores applicants submitted as structured data.
    pub fn score_applicants(
        &self,
        applicants: Vec<ApplicantFeatures>,
    ) -> Result<Vec<ScoredApplicant>, BatchServiceError> {
        if applicants.is_empty() {
            return Err(BatchServiceError::EmptyRequest);
        }
        if applicants.len() > self.max_batch_rows {
            return Err(ParseError::BatchTooLarge {
                limit: self.max_batch_rows,
            }
            .into());
        }

        let records = applicants
            .into_iter()
            .enumerate()
            .map(|(index, features)| -> Result<ApplicantRecord, ParseError> {
                parser::validate_features(index + 1, &features)?;
                Ok(ApplicantRecord::from_features(index + 1, features))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.engine.evaluate_all(records)?)
    }

    /// Scores a CSV file on disk and stores the scored export. Work finishing
    /// after `deadline` is discarded instead of stored.
    pub fn score_file(
        &self,
        path: &Path,
        deadline: Option<Instant>,
    ) -> Result<BatchOutcome, BatchServiceError> {
        let file = File::open(path)?;
        let scored = self.score_reader(file)?;
        let csv = serializer::serialize(&scored)?;

        if deadline.is_some_and(|deadline| Instant::now() > deadline) {
            return Err(BatchServiceError::Timeout(self.batch_timeout));
        }

        let result_file = self.store.save_result(&csv)?;
        let summary = BatchSummary::from_scored(&scored);
        info!(
            rows = summary.rows_processed,
            high = summary.high_risk,
            medium = summary.medium_risk,
            low = summary.low_risk,
            %result_file,
            "batch scored"
        );

        Ok(BatchOutcome {
            summary,
            result_file,
            results: scored.iter().map(ScoredApplicant::view).collect(),
        })
    }

    /// Stages an uploaded CSV, scores it on the blocking pool and removes the
    /// upload once the batch succeeds, fails or times out.
    pub async fn score_upload(
        self: Arc<Self>,
        contents: &[u8],
    ) -> Result<BatchOutcome, BatchServiceError> {
        let upload = self.store.stage_upload(contents)?;
        let path = upload.path().to_path_buf();
        let timeout = self.batch_timeout;
        let deadline = Instant::now() + timeout;

        let service = Arc::clone(&self);
        let task = tokio::task::spawn_blocking(move || service.score_file(&path, Some(deadline)));

        let outcome = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(BatchServiceError::Task(join_error.to_string())),
            Err(_) => Err(BatchServiceError::Timeout(timeout)),
        };

        drop(upload);
        outcome
    }

    pub fn load_result(&self, file_name: &str) -> Result<Vec<u8>, BatchServiceError> {
        Ok(self.store.load_result(file_name)?)
    }
}

/// Error raised by the batch scoring service.
#[derive(Debug, thiserror::Error)]
pub enum BatchServiceError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to read batch: {0}")]
    Io(#[from] std::io::Error),
    #[error("no applicants provided")]
    EmptyRequest,
    #[error("batch scoring exceeded the {}s limit", .0.as_secs())]
    Timeout(Duration),
    #[error("batch scoring task failed: {0}")]
    Task(String),
}
