use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

const RESULT_PREFIX: &str = "scored_";
const RESULT_SUFFIX: &str = ".csv";

/// Transient file storage for uploads and scored results.
pub trait ResultStore: Send + Sync {
    /// Persists an upload for the duration of one batch. The file is removed
    /// when the returned guard drops.
    fn stage_upload(&self, contents: &[u8]) -> Result<StagedUpload, StoreError>;
    /// Stores a scored CSV and returns the file name clients download it by.
    fn save_result(&self, contents: &str) -> Result<String, StoreError>;
    fn load_result(&self, file_name: &str) -> Result<Vec<u8>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("result file not found")]
    NotFound,
    #[error("invalid result file name '{0}'")]
    InvalidName(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

/// Uploaded batch on disk; deleted on drop, whatever the batch outcome.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
}

impl StagedUpload {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed staged upload"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to remove staged upload")
            }
        }
    }
}

/// Filesystem-backed store writing uploads and results to two directories.
#[derive(Debug, Clone)]
pub struct FileSystemResultStore {
    upload_dir: PathBuf,
    results_dir: PathBuf,
}

impl FileSystemResultStore {
    pub fn new(upload_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            results_dir: results_dir.into(),
        }
    }
}

impl ResultStore for FileSystemResultStore {
    fn stage_upload(&self, contents: &[u8]) -> Result<StagedUpload, StoreError> {
        fs::create_dir_all(&self.upload_dir)?;
        let path = self.upload_dir.join(format!("upload_{}.csv", Uuid::new_v4()));
        let upload = StagedUpload::new(path);
        fs::write(upload.path(), contents)?;
        Ok(upload)
    }

    fn save_result(&self, contents: &str) -> Result<String, StoreError> {
        fs::create_dir_all(&self.results_dir)?;
        let file_name = result_file_name(Uuid::new_v4());
        fs::write(self.results_dir.join(&file_name), contents)?;
        Ok(file_name)
    }

    fn load_result(&self, file_name: &str) -> Result<Vec<u8>, StoreError> {
        if !is_result_file_name(file_name) {
            return Err(StoreError::InvalidName(file_name.to_string()));
        }

        match fs::read(self.results_dir.join(file_name)) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

pub(crate) fn result_file_name(id: Uuid) -> String {
    format!("{RESULT_PREFIX}{id}{RESULT_SUFFIX}")
}

/// Accepts only names this store generates, which rules out path traversal.
pub(crate) fn is_result_file_name(file_name: &str) -> bool {
    file_name
        .strip_prefix(RESULT_PREFIX)
        .and_then(|rest| rest.strip_suffix(RESULT_SUFFIX))
        .map(|id| Uuid::parse_str(id).is_ok())
        .unwrap_or(false)
}
