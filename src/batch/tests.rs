//! Tests for the flush orchestrator
//!
//! Uses a recording batch processor to observe exactly what each flush
//! cycle dispatches.

use crate::{
    batch::{BatchProcessor, Batching},
    config::RunConfig,
    EngineError, Job, JobRequest, JobStatus,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Batch processor that records every batch it receives
struct RecordingProcessor {
    batches: Mutex<Vec<Vec<Job>>>,
}

impl RecordingProcessor {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(Vec::new()),
        })
    }

    fn batches(&self) -> Vec<Vec<Job>> {
        self.batches.lock().unwrap().clone()
    }

    fn dispatched_ids(&self) -> Vec<Uuid> {
        self.batches()
            .into_iter()
            .flatten()
            .map(|job| job.id)
            .collect()
    }
}

#[async_trait]
impl BatchProcessor for RecordingProcessor {
    async fn process(&self, jobs: Vec<Job>) {
        self.batches.lock().unwrap().push(jobs);
    }
}

/// Helper to build an engine with the given config and a recording processor
fn test_engine(frequency_secs: u64, batch_size: usize) -> (Arc<Batching>, Arc<RecordingProcessor>) {
    let processor = RecordingProcessor::new();
    let engine = Arc::new(Batching::new(
        RunConfig {
            frequency_secs,
            batch_size,
        },
        processor.clone(),
    ));
    (engine, processor)
}

/// Helper to build a plain job request
fn request(job_type: &str, name: &str) -> JobRequest {
    JobRequest {
        job_type: job_type.to_string(),
        name: name.to_string(),
        params: HashMap::new(),
    }
}

/// Helper to build a balance-update request for an account
fn balance_request(user: &str, amount: f64) -> JobRequest {
    let mut req = request("BALANCE_UPDATE", "balance");
    req.params.insert("userId".to_string(), json!(user));
    req.params.insert("amount".to_string(), json!(amount));
    req
}

#[tokio::test]
async fn submit_returns_queued_job_immediately() {
    let (engine, _) = test_engine(5, 10);

    let job = engine.submit(request("A", "first")).await;

    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.job_type, "A");

    let found = engine.job_info(job.id).await.unwrap();
    assert_eq!(found.id, job.id);
}

#[tokio::test]
async fn job_info_unknown_id_is_not_found() {
    let (engine, _) = test_engine(5, 10);

    let result = engine.job_info(Uuid::new_v4()).await;
    assert!(matches!(result, Err(EngineError::JobNotFound(_))));
}

#[tokio::test]
async fn flush_dispatches_up_to_batch_size() {
    let (engine, processor) = test_engine(5, 2);

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(engine.submit(request("A", &format!("job-{i}"))).await.id);
    }

    engine.flush().await;

    let batches = processor.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    // Oldest first
    assert_eq!(batches[0][0].id, ids[0]);
    assert_eq!(batches[0][1].id, ids[1]);
    // Three jobs remain queued and findable
    for id in &ids[2..] {
        assert!(engine.job_info(*id).await.is_ok());
    }
}

#[tokio::test]
async fn flush_on_empty_queue_is_a_no_op() {
    let (engine, processor) = test_engine(5, 2);

    engine.flush().await;

    assert!(processor.batches().is_empty());
}

#[tokio::test]
async fn short_batch_dispatches_without_waiting() {
    let (engine, processor) = test_engine(5, 10);

    engine.submit(request("A", "only")).await;
    engine.flush().await;

    let batches = processor.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
}

#[tokio::test]
async fn dispatched_jobs_are_stamped_and_unfindable() {
    let (engine, processor) = test_engine(5, 10);

    let id = engine.submit(request("A", "first")).await.id;
    engine.flush().await;

    let batches = processor.batches();
    assert_eq!(batches[0][0].status, JobStatus::Dispatched);
    assert!(matches!(
        engine.job_info(id).await,
        Err(EngineError::JobNotFound(_))
    ));
}

#[tokio::test]
async fn preprocessing_coalesces_across_whole_queue() {
    let (engine, processor) = test_engine(5, 10);
    engine.set_preprocessing(true).await;

    engine.submit(balance_request("alice", 10.0)).await;
    engine.submit(balance_request("bob", 2.0)).await;
    engine.submit(balance_request("alice", -4.0)).await;
    engine.submit(balance_request("alice", 1.0)).await;

    engine.flush().await;

    let batch = &processor.batches()[0];
    assert_eq!(batch.len(), 2);

    let by_user: HashMap<&str, f64> = batch
        .iter()
        .map(|job| {
            (
                job.params["userId"].as_str().unwrap(),
                job.params["amount"].as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(by_user["alice"], 7.0);
    assert_eq!(by_user["bob"], 2.0);
}

#[tokio::test]
async fn preprocessing_toggle_is_idempotent_and_reversible() {
    let (engine, processor) = test_engine(5, 10);

    engine.set_preprocessing(true).await;
    engine.set_preprocessing(true).await;
    assert!(engine.preprocessing_enabled().await);

    engine.set_preprocessing(false).await;
    assert!(!engine.preprocessing_enabled().await);

    // With preprocessing off, duplicate balance updates are not merged
    engine.submit(balance_request("alice", 1.0)).await;
    engine.submit(balance_request("alice", 2.0)).await;
    engine.flush().await;

    assert_eq!(processor.batches()[0].len(), 2);
}

#[tokio::test]
async fn setters_reject_zero_values() {
    let (engine, _) = test_engine(5, 10);

    assert!(matches!(
        engine
            .set_frequency(crate::BatchFrequency { frequency: 0 })
            .await,
        Err(EngineError::InvalidConfig(_))
    ));
    assert!(matches!(
        engine
            .set_batch_size(crate::BatchSize { batch_size: 0 })
            .await,
        Err(EngineError::InvalidConfig(_))
    ));

    // Rejected values leave the config untouched
    assert_eq!(engine.get_frequency().await.frequency, 5);
    assert_eq!(engine.get_batch_size().await.batch_size, 10);
}

#[tokio::test]
async fn batch_size_change_applies_on_next_flush() {
    let (engine, processor) = test_engine(5, 1);

    for i in 0..4 {
        engine.submit(request("A", &format!("job-{i}"))).await;
    }

    engine.flush().await;
    engine
        .set_batch_size(crate::BatchSize { batch_size: 3 })
        .await
        .unwrap();
    engine.flush().await;

    let batches = processor.batches();
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[1].len(), 3);
}

#[tokio::test]
async fn start_twice_is_an_error() {
    let (engine, _) = test_engine(60, 10);

    engine.clone().start().await.unwrap();
    assert!(matches!(
        engine.clone().start().await,
        Err(EngineError::Scheduler(_))
    ));
    engine.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn restart_applies_new_frequency_and_keeps_queued_jobs() {
    let (engine, processor) = test_engine(3600, 10);

    engine.clone().start().await.unwrap();
    let id = engine.submit(request("A", "survivor")).await.id;

    // Nothing flushes at the old hour-long frequency
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(processor.batches().is_empty());

    engine
        .set_frequency(crate::BatchFrequency { frequency: 1 })
        .await
        .unwrap();
    engine.clone().restart().await.unwrap();

    // The queued job survived the restart
    assert!(engine.job_info(id).await.is_ok());

    tokio::time::sleep(Duration::from_millis(1100)).await;
    engine.shutdown().await.unwrap();

    let dispatched = processor.dispatched_ids();
    assert_eq!(dispatched, vec![id]);
}

#[tokio::test]
async fn concurrent_submits_are_never_lost_or_double_dispatched() {
    let (engine, processor) = test_engine(5, 7);

    let mut handles = Vec::new();
    for task in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                engine
                    .submit(request("A", &format!("job-{task}-{i}")))
                    .await;
            }
        }));
    }

    // Flush concurrently with the submitters
    for _ in 0..5 {
        engine.flush().await;
        tokio::task::yield_now().await;
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Drain whatever is left
    while engine.job_count().await > 0 {
        engine.flush().await;
    }

    let dispatched = processor.dispatched_ids();
    let unique: HashSet<Uuid> = dispatched.iter().copied().collect();
    assert_eq!(dispatched.len(), 100, "no job may be dropped");
    assert_eq!(unique.len(), 100, "no job may be double-dispatched");
}
