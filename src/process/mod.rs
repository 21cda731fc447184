/*!
 * Process Module
 * Process records, queues, resources and scheduling
 */

pub mod queue;
pub mod resources;
pub mod scheduler;
pub mod table;
pub mod types;

// Re-export for convenience
pub use queue::ProcessQueue;
pub use resources::{Resource, ResourceTable};
pub use scheduler::{PolicyOps, SchedContext, Scheduler, SchedulerStats};
pub use table::ProcessTable;
pub use types::{Process, ProcessState, SchedulingPolicy};
