/*!
 * Process Scheduler
 * Discrete-time scheduler with pluggable policies and resource protocols
 */

use crate::core::config::SchedulerConfig;
use crate::core::errors::SchedResult;
use crate::process::types::SchedulingPolicy;
use tracing::info;

mod context;
mod invariants;
mod operations;
mod policy;
mod protocol;
mod stats;
mod traits;

pub use context::SchedContext;
pub use stats::SchedulerStats;
pub use traits::PolicyOps;

/// Process scheduler
///
/// Owns the process table, ready queue and resource table of one run and
/// routes every decision through its [`SchedulingPolicy`]. The driver calls
/// [`schedule`](Scheduler::schedule), then [`acquire`](Scheduler::acquire) /
/// [`release`](Scheduler::release) on behalf of the running process, then
/// [`tick`](Scheduler::tick), once per simulated tick.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    policy: SchedulingPolicy,
    ctx: SchedContext,
    initialized: bool,
}

impl Scheduler {
    /// Create new scheduler with policy and default limits
    pub fn new(policy: SchedulingPolicy) -> Self {
        let config = SchedulerConfig::with_policy(policy);
        Self::build(config)
    }

    /// Create scheduler from a validated configuration
    pub fn with_config(config: SchedulerConfig) -> SchedResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SchedulerConfig) -> Self {
        info!(
            policy = %config.policy,
            resources = config.nr_resources,
            max_prio = config.max_prio,
            restore_priority = config.restore_priority_on_release,
            "Scheduler created"
        );
        Self {
            policy: config.policy,
            ctx: SchedContext::new(&config),
            config,
            initialized: false,
        }
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Read-only view of the whole run state
    pub fn context(&self) -> &SchedContext {
        &self.ctx
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulingPolicy::default())
    }
}
