//! Flush Scheduling Module
//!
//! This module implements the periodic timer that drives flush cycles:
//! - Fires a task every N seconds on a background tokio task
//! - Single-flight: each tick's task is awaited to completion before the
//!   next tick is honored, so two flushes never run concurrently
//! - Supports clean shutdown so a fresh schedule can be installed afterward

mod ticker;

pub use ticker::FlushScheduler;
