use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// A unit of work accepted by the engine
///
/// Created by the orchestrator from a [`JobRequest`]; carries a fresh id and
/// starts in [`JobStatus::Queued`]. Ownership sits with the queue while the
/// job is pending and transfers to the batch processor on dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    #[serde(rename = "type")]
    pub job_type: String,
    pub name: String,
    pub params: HashMap<String, Value>,
    pub submitted_at: DateTime<Utc>,
}

/// Job lifecycle states
///
/// The engine only ever holds `Queued` jobs; it stamps `Dispatched` at the
/// moment a batch is handed to the batch processor. `Completed` and `Failed`
/// are for the downstream capability to assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Dispatched,
    Completed,
    Failed,
}

/// Caller-supplied job submission, consumed to construct a [`Job`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(rename = "type")]
    pub job_type: String,
    pub name: String,
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

/// Flush interval in seconds, as exposed at the configuration boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchFrequency {
    pub frequency: u64,
}

/// Maximum number of jobs dispatched in a single flush
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchSize {
    #[serde(rename = "batchSize")]
    pub batch_size: usize,
}

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// The id is not among the currently queued jobs. Jobs become
    /// unfindable once a flush dequeues them for dispatch.
    #[error("job {0} not found")]
    JobNotFound(Uuid),

    /// Rejected configuration value; frequency and batch size must be
    /// positive.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure to create, register, or tear down the periodic flush timer.
    /// Fatal at startup, not retried.
    #[error("scheduler error: {0}")]
    Scheduler(String),
}
