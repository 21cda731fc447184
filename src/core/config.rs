/*!
 * Simulator Configuration
 *
 * Runtime configuration for a single simulation run, loaded from defaults,
 * serde sources, or `SCHED_*` environment variables
 */

use super::errors::{SchedResult, SchedulerError};
use super::limits::{DEFAULT_MAX_TICKS, MAX_PRIO, NR_RESOURCES};
use super::types::{Priority, Tick};
use crate::process::SchedulingPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Per-run scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Scheduling policy, fixed for the whole run
    pub policy: SchedulingPolicy,
    /// Size of the resource table
    pub nr_resources: usize,
    /// Priority ceiling, exclusive bound for assigned priorities
    pub max_prio: Priority,
    /// Reset a PCP/PIP owner to its base priority when it releases its last
    /// resource. Off by default, so a released owner keeps its elevation.
    pub restore_priority_on_release: bool,
    /// Verify queue and ownership invariants after every tick
    pub check_invariants: bool,
    /// Hard stop for the driver loop
    pub max_ticks: Tick,
    /// Suppress the per-event trace dump
    pub quiet: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: SchedulingPolicy::Fcfs,
            nr_resources: NR_RESOURCES,
            max_prio: MAX_PRIO,
            restore_priority_on_release: false,
            check_invariants: cfg!(debug_assertions),
            max_ticks: DEFAULT_MAX_TICKS,
            quiet: false,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration running the given policy
    pub fn with_policy(policy: SchedulingPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Load configuration from the process environment
    ///
    /// Environment variables:
    /// - SCHED_POLICY: policy name (default: fcfs)
    /// - SCHED_NR_RESOURCES: resource table size (default: 32)
    /// - SCHED_MAX_PRIO: priority ceiling (default: 100)
    /// - SCHED_RESTORE_PRIO: restore owner priority on release (default: false)
    /// - SCHED_CHECK_INVARIANTS: per-tick invariant checks (default: debug builds)
    /// - SCHED_MAX_TICKS: tick limit (default: 100000)
    /// - SCHED_QUIET: suppress the trace dump (default: false)
    pub fn from_env() -> SchedResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SchedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("SCHED_POLICY") {
            config.policy = value.parse()?;
        }
        if let Some(value) = lookup("SCHED_NR_RESOURCES") {
            config.nr_resources = parse_number("SCHED_NR_RESOURCES", &value)?;
        }
        if let Some(value) = lookup("SCHED_MAX_PRIO") {
            config.max_prio = parse_number("SCHED_MAX_PRIO", &value)?;
        }
        if let Some(value) = lookup("SCHED_RESTORE_PRIO") {
            config.restore_priority_on_release = parse_flag("SCHED_RESTORE_PRIO", &value)?;
        }
        if let Some(value) = lookup("SCHED_CHECK_INVARIANTS") {
            config.check_invariants = parse_flag("SCHED_CHECK_INVARIANTS", &value)?;
        }
        if let Some(value) = lookup("SCHED_MAX_TICKS") {
            config.max_ticks = parse_number("SCHED_MAX_TICKS", &value)?;
        }
        if let Some(value) = lookup("SCHED_QUIET") {
            config.quiet = parse_flag("SCHED_QUIET", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scheduler cannot run with
    pub fn validate(&self) -> SchedResult<()> {
        if self.nr_resources == 0 {
            return Err(SchedulerError::Config(
                "nr_resources must be at least 1".to_string(),
            ));
        }
        if self.max_prio == 0 {
            return Err(SchedulerError::Config(
                "max_prio must be at least 1".to_string(),
            ));
        }
        if self.max_ticks == 0 {
            return Err(SchedulerError::Config(
                "max_ticks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> SchedResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SchedulerError::Config(format!("{key}: expected a number, got {value:?}")))
}

fn parse_flag(key: &str, value: &str) -> SchedResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SchedulerError::Config(format!(
            "{key}: expected a boolean, got {value:?}"
        ))),
    }
}
