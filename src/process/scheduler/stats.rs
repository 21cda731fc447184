/*!
 * Scheduler Statistics
 * Track and report scheduler activity counters
 */

use super::Scheduler;
use crate::process::types::SchedulingPolicy;
use serde::{Deserialize, Serialize};

/// Snapshot of scheduler activity for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    pub policy: SchedulingPolicy,
    /// Processes handed the CPU, counting continuations
    pub total_scheduled: u64,
    /// Picks that changed the running process
    pub context_switches: u64,
    /// Runnable processes that lost the CPU to another pick
    pub preemptions: u64,
    /// Failed acquires
    pub blocked: u64,
    /// Waiters moved back to the ready queue by a release
    pub wakeups: u64,
    pub acquisitions: u64,
    pub releases: u64,
    /// Priority raises by the ceiling or inheritance protocol
    pub priority_boosts: u64,
    pub created: u64,
    pub terminated: u64,
}

impl SchedulerStats {
    pub fn new(policy: SchedulingPolicy) -> Self {
        Self {
            policy,
            total_scheduled: 0,
            context_switches: 0,
            preemptions: 0,
            blocked: 0,
            wakeups: 0,
            acquisitions: 0,
            releases: 0,
            priority_boosts: 0,
            created: 0,
            terminated: 0,
        }
    }
}

impl Scheduler {
    /// Get scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        self.ctx.stats
    }
}
