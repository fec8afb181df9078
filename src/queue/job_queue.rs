//! Job Queue
//!
//! An ordered, concurrency-safe buffer of pending jobs. Jobs are stored in a
//! VecDeque for efficient insertion at the back and removal from the front,
//! protected by an RwLock: submission and the flush cycle run concurrently
//! by design, and every operation serializes behind the lock.

use crate::{EngineError, Job};
use std::collections::VecDeque;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Concurrency-safe FIFO buffer of queued jobs
pub struct JobQueue {
    jobs: RwLock<VecDeque<Job>>,
}

impl JobQueue {
    /// Creates a new empty queue
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(VecDeque::new()),
        }
    }

    /// Append one job to the tail of the queue
    pub async fn enqueue(&self, job: Job) {
        let mut jobs = self.jobs.write().await;
        jobs.push_back(job);
    }

    /// Append a sequence of jobs to the tail, preserving relative order
    pub async fn enqueue_many(&self, batch: Vec<Job>) {
        let mut jobs = self.jobs.write().await;
        jobs.extend(batch);
    }

    /// Remove and return up to `n` jobs from the head, in FIFO order
    ///
    /// If `n` exceeds the current size, all available jobs are returned;
    /// clamping, not failure. Removed jobs leave the queue entirely.
    pub async fn dequeue(&self, n: usize) -> Vec<Job> {
        let mut jobs = self.jobs.write().await;
        let len = jobs.len();
        jobs.drain(..n.min(len)).collect()
    }

    /// Look up a job by id among the currently queued jobs
    ///
    /// # Returns
    /// * `Ok(Job)` if the id is present in the queue
    /// * `Err(EngineError::JobNotFound)` otherwise, including for jobs that
    ///   have already been dequeued for dispatch
    pub async fn find(&self, id: Uuid) -> Result<Job, EngineError> {
        let jobs = self.jobs.read().await;
        jobs.iter()
            .find(|job| job.id == id)
            .cloned()
            .ok_or(EngineError::JobNotFound(id))
    }

    /// Current number of queued jobs
    pub async fn size(&self) -> usize {
        let jobs = self.jobs.read().await;
        jobs.len()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
