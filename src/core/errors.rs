/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Pid, Priority, ResourceId, Tick};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler-related errors with serialization support
///
/// Every variant is fatal for the run that produced it: the core reports
/// expected outcomes (a busy resource, an idle CPU) through `bool` and
/// `Option` returns, never through this type.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("No running process to {operation}")]
    #[diagnostic(
        code(scheduler::no_current_process),
        help("acquire/release/tick are only valid on behalf of the process returned by schedule().")
    )]
    NoCurrentProcess { operation: String },

    #[error("Process {0} not found in scheduler")]
    #[diagnostic(
        code(scheduler::process_not_found),
        help("Process may have terminated or never existed. Check PID validity.")
    )]
    ProcessNotFound(Pid),

    #[error("Resource {resource} out of range (system has {limit} resources)")]
    #[diagnostic(
        code(scheduler::resource_out_of_range),
        help("Resource ids index a fixed table; raise SCHED_NR_RESOURCES if more are needed.")
    )]
    ResourceOutOfRange { resource: ResourceId, limit: usize },

    #[error("Process {caller} released resource {resource} owned by {owner:?}")]
    #[diagnostic(
        code(scheduler::not_owner),
        help("Only the current owner may release a resource.")
    )]
    NotOwner {
        resource: ResourceId,
        caller: Pid,
        owner: Option<Pid>,
    },

    #[error("Process {pid} still holds resources {resources:?}")]
    #[diagnostic(
        code(scheduler::still_holding_resources),
        help("Release every held resource before the process is reaped.")
    )]
    StillHoldingResources {
        pid: Pid,
        resources: Vec<ResourceId>,
    },

    #[error("Process {pid} ran past its lifespan of {lifespan} ticks")]
    #[diagnostic(
        code(scheduler::lifespan_exceeded),
        help("A finished process must not be scheduled again.")
    )]
    LifespanExceeded { pid: Pid, lifespan: Tick },

    #[error("Priority {priority} out of range (must be below {max})")]
    #[diagnostic(
        code(scheduler::invalid_priority),
        help("Assigned priorities must be below MAX_PRIO; the ceiling value is reserved.")
    )]
    InvalidPriority { priority: Priority, max: Priority },

    #[error("Invariant violation: {0}")]
    #[diagnostic(
        code(scheduler::invariant_violation),
        help("Scheduler bookkeeping is inconsistent. This is a policy bug, not a workload problem.")
    )]
    InvariantViolation(String),

    #[error("Invalid scheduling policy: {0}")]
    #[diagnostic(
        code(scheduler::invalid_policy),
        help("Use one of fcfs, sjf, stcf, rr, prio, pa, pcp, pip.")
    )]
    InvalidPolicy(String),

    #[error("Invalid workload: {0}")]
    #[diagnostic(
        code(scheduler::invalid_workload),
        help("Check lifespans, priorities and that every request fits inside its process lifespan.")
    )]
    InvalidWorkload(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(scheduler::configuration_error),
        help("Invalid configuration. Review SCHED_* environment variables.")
    )]
    Config(String),
}

/// Result type for scheduler operations
pub type SchedResult<T> = Result<T, SchedulerError>;
