//! Job Pipeline
//!
//! Chain-of-responsibility over job types. Processors are registered per
//! type key; `process` partitions the input by type, feeds each partition
//! through its chain stage by stage, and recombines the results.

use crate::Job;
use std::collections::HashMap;

/// A single preprocessing stage
///
/// A pure transformation over a sequence of same-type jobs: given a
/// partition, return a (possibly different length) partition. A processor
/// may filter, transform, merge, reorder, or drop jobs; it must not retain
/// references to them beyond the call.
pub trait JobProcessor: Send + Sync {
    fn process(&self, jobs: Vec<Job>) -> Vec<Job>;
}

/// Registry of per-type processor chains
///
/// A type may have any number of processors, including zero (identity).
/// Registration order is application order: each stage consumes the
/// previous stage's output.
pub struct JobPipeline {
    chains: HashMap<String, Vec<Box<dyn JobProcessor>>>,
}

impl JobPipeline {
    /// Creates a pipeline with no registrations
    pub fn new() -> Self {
        Self {
            chains: HashMap::new(),
        }
    }

    /// Append `processor` to the chain registered for `job_type`
    pub fn register(&mut self, job_type: impl Into<String>, processor: Box<dyn JobProcessor>) {
        self.chains.entry(job_type.into()).or_default().push(processor);
    }

    /// Run the full pipeline over a mixed-type job sequence
    ///
    /// Partitions by type (stable within a type), applies each type's chain
    /// to its partition, and returns the union of all partitions' results.
    /// Partitions for unregistered types pass through unmodified. The
    /// relative order of jobs across different types in the output is
    /// unspecified.
    pub fn process(&self, jobs: Vec<Job>) -> Vec<Job> {
        let mut result = Vec::with_capacity(jobs.len());

        for (job_type, mut partition) in split_by_type(jobs) {
            if let Some(chain) = self.chains.get(&job_type) {
                for processor in chain {
                    partition = processor.process(partition);
                }
            }
            result.extend(partition);
        }

        result
    }
}

impl Default for JobPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition jobs by their type key
///
/// Stable within each partition: jobs of the same type keep their relative
/// submission order.
pub fn split_by_type(jobs: Vec<Job>) -> HashMap<String, Vec<Job>> {
    let mut partitions: HashMap<String, Vec<Job>> = HashMap::new();
    for job in jobs {
        partitions.entry(job.job_type.clone()).or_default().push(job);
    }
    partitions
}
