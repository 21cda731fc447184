/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
///
/// Assigned monotonically by the process table and never reused within a run.
pub type Pid = u32;

/// Priority level (higher is more important)
pub type Priority = u32;

/// Index into the fixed resource table
pub type ResourceId = usize;

/// Discrete simulation time, also used for process ages and lifespans
pub type Tick = u64;
