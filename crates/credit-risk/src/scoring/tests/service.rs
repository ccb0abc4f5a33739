use super::common::*;
use crate::config::ScoringConfig;
use crate::scoring::domain::RiskLabel;
use crate::scoring::parser::ParseError;
use crate::scoring::serializer::SerializeError;
use crate::scoring::service::{BatchScoringService, BatchServiceError};
use crate::scoring::store::{ResultStore, StoreError};
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn large_batch(rows: usize) -> String {
    format!("{HEADER}\n{}", "35,75000,15000,720,5,0.25\n".repeat(rows))
}

#[test]
fn score_reader_scores_every_row() {
    let (_store, service) = memory_service();
    let scored = service
        .score_reader(Cursor::new(sample_csv()))
        .expect("scores");

    assert_eq!(scored.len(), 3);
    assert_eq!(scored[2].risk_label, RiskLabel::Low);
}

#[tokio::test]
async fn upload_is_scored_stored_and_cleaned_up() {
    let (store, service) = memory_service();

    let outcome = service
        .clone()
        .score_upload(sample_csv().as_bytes())
        .await
        .expect("batch scores");

    assert_eq!(outcome.summary.rows_processed, 3);
    assert_eq!(outcome.summary.high_risk, 1);
    assert_eq!(outcome.summary.medium_risk, 1);
    assert_eq!(outcome.summary.low_risk, 1);
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.results[1].decision, "Reject");

    let stored = service
        .load_result(&outcome.result_file)
        .expect("result stored");
    let text = String::from_utf8(stored).expect("utf-8");
    assert!(text.starts_with(HEADER));
    assert_eq!(text.lines().count(), 4);

    assert!(store.scratch_is_empty(), "upload should be removed");
}

#[tokio::test]
async fn failed_upload_is_cleaned_up_and_nothing_is_stored() {
    let (store, service) = memory_service();
    let csv = format!("{HEADER}\n35,75000,15000,720,5,0.25\n35,75000,15000,abc,5,0.25\n");

    let error = service
        .clone()
        .score_upload(csv.as_bytes())
        .await
        .expect_err("type error");

    assert!(matches!(
        error,
        BatchServiceError::Parse(ParseError::Type { row: 2, .. })
    ));
    assert!(store.results.lock().expect("results").is_empty());
    assert_eq!(store.staged.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(store.scratch_is_empty());
}

#[tokio::test]
async fn header_only_upload_fails_at_serialization() {
    let (store, service) = memory_service();
    let error = service
        .clone()
        .score_upload(format!("{HEADER}\n").as_bytes())
        .await
        .expect_err("empty dataset");

    assert!(matches!(
        error,
        BatchServiceError::Serialize(SerializeError::EmptyDataset)
    ));
    assert!(store.scratch_is_empty());
}

#[tokio::test]
async fn filesystem_store_removes_uploads() {
    let (dir, service) = fs_service();
    let outcome = service
        .clone()
        .score_upload(sample_csv().as_bytes())
        .await
        .expect("batch scores");

    let uploads = std::fs::read_dir(dir.path().join("uploads"))
        .expect("upload dir exists")
        .count();
    assert_eq!(uploads, 0);
    assert!(dir.path().join("results").join(&outcome.result_file).exists());
}

#[tokio::test]
async fn unavailable_store_surfaces_storage_errors() {
    let service = Arc::new(BatchScoringService::new(
        Arc::new(UnavailableStore),
        &scoring_config(),
    ));

    let error = service
        .score_upload(sample_csv().as_bytes())
        .await
        .expect_err("store offline");
    assert!(matches!(
        error,
        BatchServiceError::Store(StoreError::Unavailable(_))
    ));
}

#[test]
fn structured_applicants_are_validated_and_scored() {
    let (_store, service) = memory_service();
    let scored = service
        .score_applicants(vec![medium_applicant(), low_risk_applicant()])
        .expect("scores");
    assert_eq!(scored[0].record.row, 1);
    assert_eq!(scored[1].risk_label, RiskLabel::Low);

    let mut invalid = medium_applicant();
    invalid.income = -1.0;
    let error = service
        .score_applicants(vec![medium_applicant(), invalid])
        .expect_err("division");
    assert!(matches!(
        error,
        BatchServiceError::Parse(ParseError::Division { row: 2, .. })
    ));
}

#[test]
fn structured_requests_respect_bounds() {
    let (_store, service) = memory_service();
    assert!(matches!(
        service.score_applicants(Vec::new()),
        Err(BatchServiceError::EmptyRequest)
    ));

    let oversized = vec![medium_applicant(); 101];
    assert!(matches!(
        service.score_applicants(oversized),
        Err(BatchServiceError::Parse(ParseError::BatchTooLarge { limit: 100 }))
    ));
}

#[tokio::test]
async fn timed_out_upload_is_removed_and_never_stored() {
    let store = Arc::new(MemoryStore::default());
    let config = ScoringConfig {
        max_batch_rows: 50_000,
        batch_timeout: Duration::ZERO,
        ..scoring_config()
    };
    let service = Arc::new(BatchScoringService::new(store.clone(), &config));

    let error = service
        .score_upload(large_batch(20_000).as_bytes())
        .await
        .expect_err("timeout");

    assert!(matches!(error, BatchServiceError::Timeout(_)));
    assert!(store.scratch_is_empty(), "upload should be removed on timeout");

    // Give the abandoned worker time to run past its deadline check.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(store.results.lock().expect("results").is_empty());
}

#[test]
fn work_finishing_after_the_deadline_is_discarded() {
    let (store, service) = memory_service();
    let upload = store
        .stage_upload(sample_csv().as_bytes())
        .expect("staged");
    let deadline = Instant::now()
        .checked_sub(Duration::from_millis(1))
        .expect("deadline in the past");

    let error = service
        .score_file(upload.path(), Some(deadline))
        .expect_err("late result");

    assert!(matches!(error, BatchServiceError::Timeout(_)));
    assert!(store.results.lock().expect("results").is_empty());

    drop(upload);
    assert!(store.scratch_is_empty());
}
