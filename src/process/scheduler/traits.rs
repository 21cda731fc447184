/*!
 * Scheduling Policy Traits
 * Interface definitions for scheduling policies
 */

use super::context::SchedContext;
use crate::core::errors::SchedResult;
use crate::core::types::{Pid, ResourceId};

/// Callbacks a scheduling policy provides to the simulation driver
///
/// Policies are stateless rule sets; all run state lives in the
/// [`SchedContext`] they are handed.
pub trait PolicyOps {
    /// Human-readable policy name
    fn name(&self) -> String;

    /// One-time setup before the first tick
    fn initialize(&self, ctx: &mut SchedContext) -> SchedResult<()>;

    /// Teardown after the last tick
    fn finalize(&self, ctx: &mut SchedContext);

    /// Pick the process to run this tick, or `None` when nothing is runnable
    fn schedule(&self, ctx: &mut SchedContext) -> Option<Pid>;

    /// Request `resource` for the running process
    ///
    /// `Ok(false)` means the caller is now BLOCKED on the resource's wait
    /// list and the driver must schedule again instead of retrying.
    fn acquire(&self, ctx: &mut SchedContext, resource: ResourceId) -> SchedResult<bool>;

    /// Give up `resource`, held by the running process
    ///
    /// Returns the waiter moved back to the ready queue, if any. Ownership is
    /// not handed to it; it re-acquires when next scheduled.
    fn release(&self, ctx: &mut SchedContext, resource: ResourceId) -> SchedResult<Option<Pid>>;
}
