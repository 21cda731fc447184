/*!
 * Process Types
 * Common types for process management
 */

use crate::core::errors::SchedulerError;
use crate::core::types::{Pid, Priority, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Process is in the ready queue
    Ready,
    /// Process owns the CPU for this tick
    Running,
    /// Process is parked on exactly one resource wait list
    Blocked,
    /// Process has used up its lifespan
    Terminated,
}

/// Scheduling policy
///
/// A closed set: each variant bundles a pick rule with an acquire/release
/// protocol, see [`PolicyOps`](crate::process::scheduler::PolicyOps).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// First-come first-served, non-preemptive
    #[default]
    Fcfs,
    /// Shortest job (lifespan) first, non-preemptive
    Sjf,
    /// Shortest time-to-complete first, preemptive
    Stcf,
    /// Round-robin with a one tick quantum
    RoundRobin,
    /// Highest priority first
    Priority,
    /// Highest priority first with aging of waiting processes
    PriorityAging,
    /// Priority scheduling with the priority-ceiling protocol
    PriorityCeiling,
    /// Priority scheduling with the priority-inheritance protocol
    PriorityInheritance,
}

impl SchedulingPolicy {
    pub const ALL: [SchedulingPolicy; 8] = [
        SchedulingPolicy::Fcfs,
        SchedulingPolicy::Sjf,
        SchedulingPolicy::Stcf,
        SchedulingPolicy::RoundRobin,
        SchedulingPolicy::Priority,
        SchedulingPolicy::PriorityAging,
        SchedulingPolicy::PriorityCeiling,
        SchedulingPolicy::PriorityInheritance,
    ];

    /// Short identifier accepted by `SCHED_POLICY`
    pub const fn short_name(self) -> &'static str {
        match self {
            SchedulingPolicy::Fcfs => "fcfs",
            SchedulingPolicy::Sjf => "sjf",
            SchedulingPolicy::Stcf => "stcf",
            SchedulingPolicy::RoundRobin => "rr",
            SchedulingPolicy::Priority => "prio",
            SchedulingPolicy::PriorityAging => "pa",
            SchedulingPolicy::PriorityCeiling => "pcp",
            SchedulingPolicy::PriorityInheritance => "pip",
        }
    }

    /// Whether the policy ever moves `priority` away from `base_priority`
    pub const fn mutates_priority(self) -> bool {
        matches!(
            self,
            SchedulingPolicy::PriorityAging
                | SchedulingPolicy::PriorityCeiling
                | SchedulingPolicy::PriorityInheritance
        )
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulingPolicy::Fcfs => "FCFS",
            SchedulingPolicy::Sjf => "Shortest-Job First",
            SchedulingPolicy::Stcf => "Shortest Time-to-Complete First",
            SchedulingPolicy::RoundRobin => "Round-Robin",
            SchedulingPolicy::Priority => "Priority",
            SchedulingPolicy::PriorityAging => "Priority + aging",
            SchedulingPolicy::PriorityCeiling => "Priority + PCP Protocol",
            SchedulingPolicy::PriorityInheritance => "Priority + PIP Protocol",
        };
        f.write_str(name)
    }
}

impl FromStr for SchedulingPolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let policy = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fcfs" => SchedulingPolicy::Fcfs,
            "sjf" => SchedulingPolicy::Sjf,
            "stcf" => SchedulingPolicy::Stcf,
            "rr" | "round_robin" => SchedulingPolicy::RoundRobin,
            "prio" | "priority" => SchedulingPolicy::Priority,
            "pa" | "priority_aging" => SchedulingPolicy::PriorityAging,
            "pcp" | "priority_ceiling" => SchedulingPolicy::PriorityCeiling,
            "pip" | "priority_inheritance" => SchedulingPolicy::PriorityInheritance,
            _ => return Err(SchedulerError::InvalidPolicy(s.to_string())),
        };
        Ok(policy)
    }
}

/// A simulated process
///
/// Only the scheduler mutates a process; callers see it through shared
/// references and snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Process {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    /// Ticks executed so far
    pub age: Tick,
    /// Ticks required to complete
    pub lifespan: Tick,
    /// Effective priority, moved by aging and the inversion protocols
    pub priority: Priority,
    /// Assigned priority, the value `priority` is restored to
    pub base_priority: Priority,
}

impl Process {
    #[inline]
    #[must_use]
    pub(crate) fn new(pid: Pid, name: String, lifespan: Tick, priority: Priority) -> Self {
        Self {
            pid,
            name,
            state: ProcessState::Ready,
            age: 0,
            lifespan,
            priority,
            base_priority: priority,
        }
    }

    /// Ticks still needed to complete
    #[inline(always)]
    #[must_use]
    pub const fn remaining(&self) -> Tick {
        self.lifespan.saturating_sub(self.age)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.age >= self.lifespan
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, ProcessState::Running)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self.state, ProcessState::Blocked)
    }

    /// Whether the priority currently differs from the assigned one
    #[inline(always)]
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        self.priority != self.base_priority
    }

    #[inline]
    pub(crate) fn reset_priority(&mut self) {
        self.priority = self.base_priority;
    }
}
