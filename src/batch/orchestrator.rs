//! Flush Orchestrator Module
//!
//! This module implements the orchestration layer that connects the engine
//! components together: the job queue, the optional preprocessing pipeline,
//! the periodic flush scheduler, and the external batch processor.
//!
//! # Flow
//! 1. Callers submit job requests; each becomes a queued `Job` immediately
//! 2. The scheduler ticks at the configured frequency
//! 3. Each tick runs one flush cycle: optional full-queue preprocessing,
//!    then dispatch of up to `batch_size` oldest jobs
//!
//! Flushes are single-flight (the scheduler awaits each cycle), so the
//! queue is never mutated by two concurrent flushes. Submissions landing
//! while a flush runs are picked up by that flush or the next one; they are
//! never dropped or double-dispatched.

use crate::{
    batch::BatchProcessor,
    config::RunConfig,
    preprocess::{
        BalanceUpdateCoalescer, JobPipeline, PassthroughProcessor, BALANCE_UPDATE,
        UPDATE_USER_INFO,
    },
    queue::JobQueue,
    scheduler::FlushScheduler,
    BatchFrequency, BatchSize, EngineError, Job, JobRequest, JobStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Flush orchestrator
///
/// Owns the runtime configuration, the job queue, the optional
/// preprocessing pipeline, and the binding to the batch-processing
/// capability. Constructed explicitly and shared via `Arc`; there is no
/// process-wide instance.
pub struct Batching {
    /// Live configuration, mutable through the setters
    config: RwLock<RunConfig>,
    /// Pending jobs, exclusively owned by this orchestrator
    queue: JobQueue,
    /// External capability that executes dispatched batches
    batch_processor: Arc<dyn BatchProcessor>,
    /// Preprocessing pipeline; `None` means preprocessing is disabled
    pre_process: RwLock<Option<JobPipeline>>,
    /// Handle to the running flush schedule, if any
    scheduler: Mutex<Option<FlushScheduler>>,
}

impl Batching {
    /// Creates a new orchestrator bound to a batch processor
    ///
    /// The scheduler is not started; call [`Batching::start`] to begin
    /// flushing. Preprocessing starts disabled.
    pub fn new(config: RunConfig, batch_processor: Arc<dyn BatchProcessor>) -> Self {
        Self {
            config: RwLock::new(config),
            queue: JobQueue::new(),
            batch_processor,
            pre_process: RwLock::new(None),
            scheduler: Mutex::new(None),
        }
    }

    /// Start the periodic flush schedule at the configured frequency
    ///
    /// # Returns
    /// * `Ok(())` once the schedule is installed
    /// * `Err(EngineError::Scheduler)` if a schedule is already running or
    ///   the timer cannot be created; fatal, not retried
    pub async fn start(self: Arc<Self>) -> Result<(), EngineError> {
        let mut guard = self.scheduler.lock().await;
        if guard.is_some() {
            return Err(EngineError::Scheduler(
                "flush schedule already running".to_string(),
            ));
        }

        let config = self.config.read().await.clone();
        info!(
            "Starting flush schedule: frequency={}s, batch_size={}",
            config.frequency_secs, config.batch_size
        );

        let engine = Arc::clone(&self);
        let scheduler = FlushScheduler::start(
            Duration::from_secs(config.frequency_secs),
            move || {
                let engine = Arc::clone(&engine);
                async move { engine.flush().await }
            },
        )?;

        *guard = Some(scheduler);
        Ok(())
    }

    /// Stop the current schedule and start a fresh one
    ///
    /// Used after a frequency change. Waits for any in-flight flush to
    /// finish before the new schedule is installed; queued jobs survive
    /// untouched.
    pub async fn restart(self: Arc<Self>) -> Result<(), EngineError> {
        self.shutdown().await?;
        self.start().await
    }

    /// Stop the flush schedule, waiting for any in-flight flush
    ///
    /// A no-op if no schedule is running.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let scheduler = self.scheduler.lock().await.take();
        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await?;
            info!("Flush schedule stopped");
        }
        Ok(())
    }

    /// Accept a job request and queue the resulting job
    ///
    /// Builds a `Job` with a fresh id and `QUEUED` status, enqueues it, and
    /// returns it synchronously. Never blocks on batch processing and never
    /// fails.
    pub async fn submit(&self, request: JobRequest) -> Job {
        let job = Job {
            id: Uuid::new_v4(),
            status: JobStatus::Queued,
            job_type: request.job_type,
            name: request.name,
            params: request.params,
            submitted_at: chrono::Utc::now(),
        };

        self.queue.enqueue(job.clone()).await;
        debug!("Queued job {} ({})", job.id, job.job_type);

        job
    }

    /// Look up a queued job by id
    ///
    /// Jobs are findable only while pending; once a flush dequeues a job
    /// for dispatch this returns `JobNotFound`.
    pub async fn job_info(&self, id: Uuid) -> Result<Job, EngineError> {
        self.queue.find(id).await
    }

    /// Current flush frequency
    pub async fn get_frequency(&self) -> BatchFrequency {
        BatchFrequency {
            frequency: self.config.read().await.frequency_secs,
        }
    }

    /// Update the flush frequency
    ///
    /// Takes effect on the timer only after an explicit [`Batching::restart`].
    pub async fn set_frequency(&self, frequency: BatchFrequency) -> Result<(), EngineError> {
        if frequency.frequency == 0 {
            return Err(EngineError::InvalidConfig(
                "frequency must be positive".to_string(),
            ));
        }
        self.config.write().await.frequency_secs = frequency.frequency;
        Ok(())
    }

    /// Current maximum batch size
    pub async fn get_batch_size(&self) -> BatchSize {
        BatchSize {
            batch_size: self.config.read().await.batch_size,
        }
    }

    /// Update the maximum batch size
    ///
    /// Takes effect on the next flush cycle; no restart needed.
    pub async fn set_batch_size(&self, batch_size: BatchSize) -> Result<(), EngineError> {
        if batch_size.batch_size == 0 {
            return Err(EngineError::InvalidConfig(
                "batch size must be positive".to_string(),
            ));
        }
        self.config.write().await.batch_size = batch_size.batch_size;
        Ok(())
    }

    /// Enable or disable preprocessing
    ///
    /// Enabling installs the fixed set of type registrations; enabling
    /// while already enabled is a logged no-op. Disabling discards the
    /// pipeline, so subsequent flushes skip preprocessing entirely.
    pub async fn set_preprocessing(&self, on: bool) {
        let mut pre_process = self.pre_process.write().await;
        if on {
            if pre_process.is_some() {
                info!("Preprocessing is already enabled");
                return;
            }

            let mut pipeline = JobPipeline::new();
            pipeline.register(UPDATE_USER_INFO, Box::new(PassthroughProcessor));
            pipeline.register(BALANCE_UPDATE, Box::new(BalanceUpdateCoalescer));
            *pre_process = Some(pipeline);
            info!("Preprocessing enabled");
        } else {
            *pre_process = None;
            info!("Preprocessing disabled");
        }
    }

    /// Whether preprocessing is currently enabled
    pub async fn preprocessing_enabled(&self) -> bool {
        self.pre_process.read().await.is_some()
    }

    /// Number of currently queued jobs
    pub async fn job_count(&self) -> usize {
        self.queue.size().await
    }

    /// Run one flush cycle
    ///
    /// Invoked by each scheduler tick. An empty queue is a no-op. With
    /// preprocessing enabled, the entire queue is drained through the
    /// pipeline and re-enqueued first; full-queue context is deliberate so
    /// processors can coalesce across everything pending, not just the next
    /// batch. Then up to `batch_size` oldest jobs are dequeued, stamped
    /// `DISPATCHED`, and handed to the batch processor. A short batch is
    /// dispatched as-is; the cycle never waits to fill one.
    pub(crate) async fn flush(&self) {
        let pending = self.queue.size().await;
        if pending == 0 {
            debug!("No jobs to flush");
            return;
        }

        {
            let pre_process = self.pre_process.read().await;
            if let Some(pipeline) = pre_process.as_ref() {
                let drained = self.queue.dequeue(pending).await;
                let processed = pipeline.process(drained);
                debug!("Preprocessed {} jobs into {}", pending, processed.len());
                self.queue.enqueue_many(processed).await;
            }
        }

        let batch_size = self.config.read().await.batch_size;
        let mut jobs = self.queue.dequeue(batch_size).await;
        if jobs.is_empty() {
            // A pipeline may legitimately drop everything that was pending
            debug!("Queue empty after preprocessing, nothing to dispatch");
            return;
        }

        for job in &mut jobs {
            job.status = JobStatus::Dispatched;
        }

        info!(
            "Flushing batch of {} jobs ({} still queued)",
            jobs.len(),
            self.queue.size().await
        );
        self.batch_processor.process(jobs).await;
    }
}
