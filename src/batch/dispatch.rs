//! Batch Dispatch Boundary
//!
//! The engine hands each flushed batch to an external batch-processing
//! capability. The capability is opaque to the orchestrator: invocation is
//! fire-and-forget, failures are not retried, and the capability must not
//! retain references to jobs beyond the call.

use crate::Job;
use async_trait::async_trait;
use tracing::info;

/// External batch-processing capability
///
/// Receives ownership of the dispatched jobs. Blocking here blocks the
/// flush cycle (flushes are single-flight), so slow implementations delay
/// subsequent flushes rather than overlapping them.
#[async_trait]
pub trait BatchProcessor: Send + Sync {
    async fn process(&self, jobs: Vec<Job>);
}

/// Default processor binding for the binary: logs each dispatched batch
pub struct LogBatchProcessor;

#[async_trait]
impl BatchProcessor for LogBatchProcessor {
    async fn process(&self, jobs: Vec<Job>) {
        info!("Dispatching batch of {} jobs", jobs.len());
        for job in &jobs {
            info!("  {} {} ({})", job.id, job.name, job.job_type);
        }
    }
}
