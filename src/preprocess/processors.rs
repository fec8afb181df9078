//! Built-in Processors
//!
//! Concrete `JobProcessor` implementations installed when preprocessing is
//! enabled, keyed by the well-known job types below.

use super::JobProcessor;
use crate::Job;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Job type for account balance adjustments
pub const BALANCE_UPDATE: &str = "BALANCE_UPDATE";
/// Job type for user profile updates
pub const UPDATE_USER_INFO: &str = "UPDATE_USER_INFO";

/// Identity processor, forwards its partition unchanged
pub struct PassthroughProcessor;

impl JobProcessor for PassthroughProcessor {
    fn process(&self, jobs: Vec<Job>) -> Vec<Job> {
        jobs
    }
}

/// Merges balance-update jobs targeting the same account
///
/// Balance updates commute, so N pending deltas for one account collapse
/// into a single job whose `amount` is their sum. The first job per account
/// survives and carries the merged amount; jobs without a `userId` param
/// are forwarded untouched at the end of the partition.
pub struct BalanceUpdateCoalescer;

impl JobProcessor for BalanceUpdateCoalescer {
    fn process(&self, jobs: Vec<Job>) -> Vec<Job> {
        let before = jobs.len();

        let mut order: Vec<String> = Vec::new();
        let mut merged: HashMap<String, Job> = HashMap::new();
        let mut unkeyed: Vec<Job> = Vec::new();

        for job in jobs {
            let Some(user) = job
                .params
                .get("userId")
                .and_then(Value::as_str)
                .map(str::to_owned)
            else {
                unkeyed.push(job);
                continue;
            };

            let delta = amount_of(&job);
            match merged.get_mut(&user) {
                Some(existing) => {
                    let total = amount_of(existing) + delta;
                    existing.params.insert("amount".to_string(), json!(total));
                }
                None => {
                    order.push(user.clone());
                    merged.insert(user, job);
                }
            }
        }

        let mut result: Vec<Job> = order
            .into_iter()
            .filter_map(|user| merged.remove(&user))
            .collect();
        result.extend(unkeyed);

        if result.len() < before {
            debug!(
                "Coalesced {} balance updates into {}",
                before,
                result.len()
            );
        }
        result
    }
}

fn amount_of(job: &Job) -> f64 {
    job.params
        .get("amount")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}
