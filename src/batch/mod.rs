//! Batching Module
//!
//! This module implements batch dispatch and orchestration:
//! - `BatchProcessor`: the external capability that executes a batch
//! - `Batching`: the flush orchestrator tying queue, pipeline, scheduler,
//!   and batch processor together

mod dispatch;
pub mod orchestrator;

#[cfg(test)]
mod tests;

pub use dispatch::{BatchProcessor, LogBatchProcessor};
pub use orchestrator::Batching;
