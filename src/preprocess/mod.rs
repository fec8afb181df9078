//! Preprocessing Module
//!
//! This module implements the type-keyed preprocessing pipeline applied to
//! queued jobs before batching:
//! - `JobProcessor`: the pluggable transformation capability
//! - `JobPipeline`: registry mapping a job type to an ordered processor chain
//! - Concrete processors for the built-in job types
//!
//! Jobs are partitioned by type, each partition runs through its registered
//! chain (identity when none is registered), and the partitions are
//! recombined. Order within a type is preserved unless a processor reorders;
//! order across types is unspecified.

mod pipeline;
mod processors;


pub use pipeline::{split_by_type, JobPipeline, JobProcessor};
pub use processors::{
    BalanceUpdateCoalescer, PassthroughProcessor, BALANCE_UPDATE, UPDATE_USER_INFO,
};
