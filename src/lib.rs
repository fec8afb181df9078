//! This crate implements a micro-batching engine: jobs are submitted at
//! arbitrary rates, buffered in a concurrency-safe queue, optionally run
//! through a type-keyed preprocessing pipeline, and handed to an external
//! batch-processing capability in bounded batches on a periodic schedule.

pub mod types; // Common data structures: jobs, requests, boundary types, errors.
pub mod api; // HTTP surface over the orchestrator.
pub mod queue; // Concurrency-safe FIFO buffer of pending jobs.
pub mod preprocess; // Type-keyed preprocessing pipeline and built-in processors.
pub mod scheduler; // Periodic flush timer with clean shutdown.
pub mod batch; // Flush orchestration and the batch dispatch boundary.
pub mod config; // Defines and loads system configuration.

// Re-export commonly used types for easier access.
pub use types::*;
pub use config::Config;
pub use batch::{BatchProcessor, Batching};
