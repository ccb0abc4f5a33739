use credit_risk::config::ScoringConfig;
use credit_risk::scoring::{BatchScoringService, FileSystemResultStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) started_at: Instant,
}

pub(crate) fn filesystem_scoring_service(
    config: &ScoringConfig,
) -> Arc<BatchScoringService<FileSystemResultStore>> {
    let store = FileSystemResultStore::new(config.upload_dir.clone(), config.results_dir.clone());
    Arc::new(BatchScoringService::new(Arc::new(store), config))
}
