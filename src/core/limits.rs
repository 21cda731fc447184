/*!
 * System Limits and Constants
 *
 * Default values for the simulated machine. Each can be overridden per run
 * through `SchedulerConfig`.
 */

use super::types::{Pid, Priority, Tick};

// =============================================================================
// RESOURCES
// =============================================================================

/// Size of the resource table (`NR_RESOURCES`)
pub const NR_RESOURCES: usize = 32;

// =============================================================================
// PRIORITIES
// =============================================================================

/// Priority ceiling (`MAX_PRIO`)
/// Exclusive upper bound for assigned priorities. The priority-ceiling
/// protocol raises holders to exactly this value.
pub const MAX_PRIO: Priority = 100;

// =============================================================================
// SIMULATION
// =============================================================================

/// Hard stop for a single simulation run
pub const DEFAULT_MAX_TICKS: Tick = 100_000;

/// First PID handed out by a fresh process table
pub const FIRST_PID: Pid = 1;
