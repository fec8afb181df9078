//! API Module
//!
//! This module exposes the engine over HTTP. It provides the endpoints
//! clients use to submit jobs, query them, and adjust the batching
//! configuration at runtime.

mod server;

pub use server::Server;
