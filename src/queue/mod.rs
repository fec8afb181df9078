//! Job Queue Module
//!
//! This module manages the buffer of pending jobs:
//! - FIFO ordering from submission through dispatch
//! - Safe under concurrent submits and flush cycles

mod job_queue;

pub use job_queue::JobQueue;
