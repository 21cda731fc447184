/*!
 * Scheduler Simulator Library
 * Discrete-time process scheduling with priority-inversion protocols
 */

pub mod core;
pub mod monitoring;
pub mod process;
pub mod simulation;

// Re-exports
pub use crate::core::config::SchedulerConfig;
pub use crate::core::errors::{SchedResult, SchedulerError};
pub use crate::core::types::{Pid, Priority, ResourceId, Tick};
pub use monitoring::init_tracing;
pub use process::{
    PolicyOps, Process, ProcessState, Scheduler, SchedulerStats, SchedulingPolicy,
};
pub use simulation::{
    ProcessSpec, ResourceRequest, RunOutcome, RunReport, Simulator, Trace, TraceEvent,
    TraceKind, Workload,
};
