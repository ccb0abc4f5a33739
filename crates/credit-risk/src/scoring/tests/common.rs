use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::scoring::domain::{ApplicantFeatures, ApplicantRecord};
use crate::scoring::service::BatchScoringService;
use crate::scoring::store::{FileSystemResultStore, ResultStore, StagedUpload, StoreError};

pub(super) const HEADER: &str =
    "age,income,loan_amount,credit_history,employment_length,debt_to_income";

pub(super) fn medium_applicant() -> ApplicantFeatures {
    ApplicantFeatures {
        age: 35.0,
        income: 75_000.0,
        loan_amount: 15_000.0,
        credit_history: 720.0,
        employment_length: 5.0,
        debt_to_income: 0.25,
    }
}

pub(super) fn high_risk_applicant() -> ApplicantFeatures {
    ApplicantFeatures {
        age: 25.0,
        income: 35_000.0,
        loan_amount: 50_000.0,
        credit_history: 580.0,
        employment_length: 1.0,
        debt_to_income: 0.65,
    }
}

pub(super) fn low_risk_applicant() -> ApplicantFeatures {
    ApplicantFeatures {
        age: 52.0,
        income: 160_000.0,
        loan_amount: 40_000.0,
        credit_history: 810.0,
        employment_length: 12.0,
        debt_to_income: 0.1,
    }
}

pub(super) fn record(row: usize, features: ApplicantFeatures) -> ApplicantRecord {
    ApplicantRecord::from_features(row, features)
}

pub(super) fn sample_csv() -> String {
    format!(
        "{HEADER}\n\
35,75000,15000,720,5,0.25\n\
25,35000,50000,580,1,0.65\n\
52,160000,40000,810,12,0.1\n"
    )
}

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig {
        max_batch_rows: 100,
        batch_timeout: Duration::from_secs(5),
        ..ScoringConfig::default()
    }
}

pub(super) fn fs_service() -> (
    tempfile::TempDir,
    Arc<BatchScoringService<FileSystemResultStore>>,
) {
    let dir = tempfile::tempdir().expect("tmpdir");
    let store = FileSystemResultStore::new(dir.path().join("uploads"), dir.path().join("results"));
    let service = BatchScoringService::new(Arc::new(store), &scoring_config());
    (dir, Arc::new(service))
}

pub(super) fn memory_service() -> (
    Arc<MemoryStore>,
    Arc<BatchScoringService<MemoryStore>>,
) {
    let store = Arc::new(MemoryStore::default());
    let service = BatchScoringService::new(store.clone(), &scoring_config());
    (store, Arc::new(service))
}

/// Keeps results in memory; uploads still go to a scratch directory because
/// scoring reads them back from disk.
#[derive(Default)]
pub(super) struct MemoryStore {
    scratch: Mutex<Option<tempfile::TempDir>>,
    pub(super) staged: AtomicUsize,
    pub(super) results: Mutex<Vec<(String, String)>>,
}

impl ResultStore for MemoryStore {
    fn stage_upload(&self, contents: &[u8]) -> Result<StagedUpload, StoreError> {
        let mut scratch = self.scratch.lock().expect("scratch mutex poisoned");
        if scratch.is_none() {
            *scratch = Some(tempfile::tempdir()?);
        }
        let dir = scratch.as_ref().map(|dir| dir.path().to_path_buf());
        let index = self.staged.fetch_add(1, Ordering::SeqCst);
        let path = dir
            .ok_or_else(|| StoreError::Unavailable("no scratch dir".to_string()))?
            .join(format!("upload-{index}.csv"));
        std::fs::write(&path, contents)?;
        Ok(StagedUpload::new(path))
    }

    fn save_result(&self, contents: &str) -> Result<String, StoreError> {
        let mut results = self.results.lock().expect("results mutex poisoned");
        let name = format!("scored_{}.csv", results.len());
        results.push((name.clone(), contents.to_string()));
        Ok(name)
    }

    fn load_result(&self, file_name: &str) -> Result<Vec<u8>, StoreError> {
        self.results
            .lock()
            .expect("results mutex poisoned")
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, contents)| contents.clone().into_bytes())
            .ok_or(StoreError::NotFound)
    }
}

impl MemoryStore {
    pub(super) fn scratch_is_empty(&self) -> bool {
        let scratch = self.scratch.lock().expect("scratch mutex poisoned");
        match scratch.as_ref() {
            Some(dir) => std::fs::read_dir(dir.path())
                .expect("scratch readable")
                .next()
                .is_none(),
            None => true,
        }
    }
}

pub(super) struct UnavailableStore;

impl ResultStore for UnavailableStore {
    fn stage_upload(&self, _contents: &[u8]) -> Result<StagedUpload, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn save_result(&self, _contents: &str) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn load_result(&self, _file_name: &str) -> Result<Vec<u8>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
