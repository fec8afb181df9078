//! API Server Module
//!
//! REST surface over the flush orchestrator. Every handler delegates to the
//! shared [`Batching`] instance; nothing here touches the queue directly.
//!
//! # Endpoints
//! - `POST /jobs` — submit a job request, returns the created job
//! - `GET /jobs/{id}` — look up a queued job
//! - `GET/PUT /config/frequency` — read or change the flush frequency;
//!   PUT restarts the schedule so the change takes effect immediately
//! - `GET/PUT /config/batch-size` — read or change the batch size
//! - `PUT /preprocessing` — enable or disable preprocessing

use crate::{
    batch::Batching,
    config::ApiConfig,
    BatchFrequency, BatchSize, EngineError, Job, JobRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// The API server
///
/// Holds the listen configuration and the shared orchestrator handle.
pub struct Server {
    config: ApiConfig,
    engine: Arc<Batching>,
}

/// Error body returned for failed requests
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Body for `PUT /preprocessing`
#[derive(Debug, Deserialize)]
struct PreprocessingToggle {
    enabled: bool,
}

impl Server {
    /// Creates a new API server over the given orchestrator
    pub fn new(config: ApiConfig, engine: Arc<Batching>) -> Self {
        Self { config, engine }
    }

    /// Bind to the configured address and serve until shutdown
    pub async fn start(self) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/jobs", post(submit_job))
            .route("/jobs/:id", get(job_info))
            .route("/config/frequency", get(get_frequency).put(set_frequency))
            .route("/config/batch-size", get(get_batch_size).put(set_batch_size))
            .route("/preprocessing", put(set_preprocessing))
            .with_state(self.engine);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

fn error_body(message: impl Into<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: message.into(),
    })
}

/// `POST /jobs` — accept a job request and return the queued job
async fn submit_job(
    State(engine): State<Arc<Batching>>,
    Json(request): Json<JobRequest>,
) -> (StatusCode, Json<Job>) {
    let job = engine.submit(request).await;
    info!("Accepted job {} ({})", job.id, job.job_type);
    (StatusCode::CREATED, Json(job))
}

/// `GET /jobs/{id}` — look up a queued job by id
async fn job_info(
    State(engine): State<Arc<Batching>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, (StatusCode, Json<ErrorResponse>)> {
    match engine.job_info(id).await {
        Ok(job) => Ok(Json(job)),
        Err(e @ EngineError::JobNotFound(_)) => {
            Err((StatusCode::NOT_FOUND, error_body(e.to_string())))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(e.to_string()),
        )),
    }
}

/// `GET /config/frequency`
async fn get_frequency(State(engine): State<Arc<Batching>>) -> Json<BatchFrequency> {
    Json(engine.get_frequency().await)
}

/// `PUT /config/frequency` — update the frequency and restart the schedule
///
/// A frequency change only reaches the timer through a restart, so the
/// handler performs both steps; callers observe the new interval right
/// away.
async fn set_frequency(
    State(engine): State<Arc<Batching>>,
    Json(frequency): Json<BatchFrequency>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    engine
        .set_frequency(frequency)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, error_body(e.to_string())))?;

    if let Err(e) = engine.restart().await {
        warn!("Failed to restart flush schedule: {}", e);
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body(e.to_string()),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /config/batch-size`
async fn get_batch_size(State(engine): State<Arc<Batching>>) -> Json<BatchSize> {
    Json(engine.get_batch_size().await)
}

/// `PUT /config/batch-size` — takes effect on the next flush, no restart
async fn set_batch_size(
    State(engine): State<Arc<Batching>>,
    Json(batch_size): Json<BatchSize>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    engine
        .set_batch_size(batch_size)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, error_body(e.to_string())))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /preprocessing` — toggle the preprocessing pipeline
async fn set_preprocessing(
    State(engine): State<Arc<Batching>>,
    Json(toggle): Json<PreprocessingToggle>,
) -> StatusCode {
    engine.set_preprocessing(toggle.enabled).await;
    StatusCode::NO_CONTENT
}
