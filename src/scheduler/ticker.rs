//! Flush Scheduler
//!
//! A periodic driver for the orchestrator's flush cycle. Owns a background
//! tokio task running a `tokio::time::interval`; on each tick the provided
//! task future is awaited to completion before the loop looks at the next
//! tick or the shutdown signal, which is what makes flushes single-flight.
//! Ticks missed behind a slow flush are delayed rather than fired in a
//! burst.

use crate::EngineError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Handle to a running periodic flush task
pub struct FlushScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl FlushScheduler {
    /// Spawn a background task invoking `task` every `period`
    ///
    /// # Arguments
    /// * `period` - Interval between invocations; must be non-zero
    /// * `task` - Factory producing the future to run on each tick
    ///
    /// # Returns
    /// * `Ok(FlushScheduler)` handle for shutting the schedule down
    /// * `Err(EngineError::Scheduler)` if the period is zero
    pub fn start<F, Fut>(period: Duration, mut task: F) -> Result<Self, EngineError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(EngineError::Scheduler(
                "flush period must be non-zero".to_string(),
            ));
        }

        let (shutdown, mut signal) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            // A tick delayed behind a slow flush must not trigger a burst
            // of catch-up flushes.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // the first flush happens one full period after start.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Awaited to completion: the shutdown signal is not
                        // observed until the in-flight flush finishes.
                        task().await;
                    }
                    _ = signal.changed() => {
                        debug!("Flush scheduler shutting down");
                        break;
                    }
                }
            }
        });

        Ok(Self { shutdown, handle })
    }

    /// Stop the schedule, waiting for any in-flight flush to finish
    pub async fn shutdown(self) -> Result<(), EngineError> {
        // Receiver outlives us inside the spawned task; send only fails if
        // the task already exited.
        let _ = self.shutdown.send(true);
        self.handle
            .await
            .map_err(|e| EngineError::Scheduler(format!("flush task panicked: {e}")))
    }
}
