use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::ApplicantFeatures;
use super::parser::ParseError;
use super::serializer::SerializeError;
use super::service::{BatchScoringService, BatchServiceError};
use super::store::{ResultStore, StoreError};

pub const MODEL_VERSION: &str = "credit_risk_v1";
const MODEL_USED: &str = "rule_based";

/// Router builder exposing batch scoring, result download and prediction.
pub fn scoring_router<S>(service: Arc<BatchScoringService<S>>, max_upload_bytes: usize) -> Router
where
    S: ResultStore + 'static,
{
    Router::new()
        .route("/api/batch-score", post(batch_score_handler::<S>))
        .route("/api/results/:file_name", get(download_handler::<S>))
        .route("/api/predict", post(predict_handler::<S>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub applicants: Vec<ApplicantFeatures>,
}

#[derive(Debug, Serialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub applicant: ApplicantFeatures,
    pub score: f64,
    pub risk_level: String,
    pub decision: &'static str,
    pub explanation: String,
    pub model_used: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<Prediction>,
    pub model_version: &'static str,
    pub processing_time: f64,
    pub total_applicants: usize,
}

pub(crate) async fn batch_score_handler<S>(
    State(service): State<Arc<BatchScoringService<S>>>,
    body: Bytes,
) -> Response
where
    S: ResultStore + 'static,
{
    if body.is_empty() {
        let payload = json!({
            "error": "No file uploaded",
        });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    match service.score_upload(&body).await {
        Ok(outcome) => {
            let payload = json!({
                "status": "success",
                "rows_processed": outcome.summary.rows_processed,
                "high_risk": outcome.summary.high_risk,
                "medium_risk": outcome.summary.medium_risk,
                "low_risk": outcome.summary.low_risk,
                "download_link": format!("/api/results/{}", outcome.result_file),
                "results": outcome.results,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn download_handler<S>(
    State(service): State<Arc<BatchScoringService<S>>>,
    Path(file_name): Path<String>,
) -> Response
where
    S: ResultStore + 'static,
{
    match service.load_result(&file_name) {
        Ok(contents) => {
            let disposition = format!("attachment; filename=\"{file_name}\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                contents,
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn predict_handler<S>(
    State(service): State<Arc<BatchScoringService<S>>>,
    Json(request): Json<PredictRequest>,
) -> Response
where
    S: ResultStore + 'static,
{
    let started = Instant::now();
    let scored = match service.score_applicants(request.applicants) {
        Ok(scored) => scored,
        Err(error) => return error_response(error),
    };

    let predictions = scored
        .iter()
        .map(|applicant| Prediction {
            applicant: applicant.record.features,
            score: applicant.score,
            risk_level: applicant.risk_label.label().to_ascii_lowercase(),
            decision: applicant.decision.label(),
            explanation: applicant.explanation_summary(),
            model_used: MODEL_USED,
        })
        .collect::<Vec<_>>();

    let response = PredictResponse {
        total_applicants: predictions.len(),
        predictions,
        model_version: MODEL_VERSION,
        processing_time: started.elapsed().as_secs_f64(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) fn status_for(error: &BatchServiceError) -> StatusCode {
    match error {
        BatchServiceError::Parse(ParseError::BatchTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        BatchServiceError::Parse(_)
        | BatchServiceError::Scoring(_)
        | BatchServiceError::EmptyRequest => StatusCode::BAD_REQUEST,
        BatchServiceError::Serialize(SerializeError::EmptyDataset) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BatchServiceError::Store(StoreError::NotFound | StoreError::InvalidName(_)) => {
            StatusCode::NOT_FOUND
        }
        BatchServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BatchServiceError::Serialize(_)
        | BatchServiceError::Store(_)
        | BatchServiceError::Io(_)
        | BatchServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: BatchServiceError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        warn!(error = %error, "batch scoring failed");
    } else {
        warn!(error = %error, status = status.as_u16(), "batch scoring rejected");
    }

    let columns = match &error {
        BatchServiceError::Parse(parse_error) => parse_error.columns(),
        _ => Vec::new(),
    };
    let payload = json!({
        "error": "Processing failed",
        "details": error.to_string(),
        "columns": columns,
    });
    (status, Json(payload)).into_response()
}
