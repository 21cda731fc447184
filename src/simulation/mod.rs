/*!
 * Simulation
 * Workload loading, the tick-driven engine and its event trace
 */

mod engine;
mod trace;
mod workload;

pub use engine::{RunOutcome, RunReport, Simulator};
pub use trace::{Trace, TraceEvent, TraceKind};
pub use workload::{ProcessSpec, ResourceRequest, Workload};
