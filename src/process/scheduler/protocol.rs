/*!
 * Resource Protocols
 * Acquire/release rules: default FIFO hand-off, priority-aware hand-off,
 * priority ceiling and priority inheritance
 */

use super::context::SchedContext;
use crate::core::errors::SchedResult;
use crate::core::types::{Pid, ResourceId};
use tracing::debug;

/// Free resource: caller owns it. Taken: caller blocks at the wait-list tail.
pub(super) fn default_acquire(ctx: &mut SchedContext, resource: ResourceId) -> SchedResult<bool> {
    let pid = ctx.running_pid("acquire")?;
    if ctx.resources.get(resource)?.is_free() {
        ctx.grant(resource, pid)?;
        return Ok(true);
    }
    ctx.block_on(pid, resource)?;
    Ok(false)
}

/// Wake the earliest waiter without handing it ownership
pub(super) fn default_release(
    ctx: &mut SchedContext,
    resource: ResourceId,
) -> SchedResult<Option<Pid>> {
    ctx.disown(resource)?;
    let Some(waiter) = ctx.take_first_waiter(resource)? else {
        return Ok(None);
    };
    ctx.wake(waiter)?;
    Ok(Some(waiter))
}

/// Wake the highest-priority waiter (earliest among equals)
pub(super) fn priority_release(
    ctx: &mut SchedContext,
    resource: ResourceId,
) -> SchedResult<Option<Pid>> {
    ctx.disown(resource)?;
    let Some(waiter) = ctx.take_top_waiter(resource)? else {
        return Ok(None);
    };
    ctx.wake(waiter)?;
    Ok(Some(waiter))
}

/// Priority ceiling: a successful acquire lifts the holder to `MAX_PRIO`
/// for as long as it holds the resource
pub(super) fn ceiling_acquire(ctx: &mut SchedContext, resource: ResourceId) -> SchedResult<bool> {
    let pid = ctx.running_pid("acquire")?;
    if ctx.resources.get(resource)?.is_free() {
        ctx.grant(resource, pid)?;
        let ceiling = ctx.max_prio;
        ctx.elevate(pid, ceiling)?;
        debug!(pid, resource, ceiling, "Holder raised to priority ceiling");
        return Ok(true);
    }
    ctx.block_on(pid, resource)?;
    Ok(false)
}

/// Priority inheritance: a blocked caller lends its priority to the owner
/// when it outranks it
pub(super) fn inheritance_acquire(
    ctx: &mut SchedContext,
    resource: ResourceId,
) -> SchedResult<bool> {
    let pid = ctx.running_pid("acquire")?;
    let Some(owner) = ctx.resources.get(resource)?.owner else {
        ctx.grant(resource, pid)?;
        return Ok(true);
    };

    let blocker_priority = ctx.priority_of(pid);
    if blocker_priority > ctx.priority_of(owner) {
        ctx.elevate(owner, blocker_priority)?;
        debug!(
            owner,
            blocker = pid,
            resource,
            inherited = blocker_priority,
            "Owner inherits blocker priority"
        );
    }
    ctx.block_on(pid, resource)?;
    Ok(false)
}

/// Release under the priority ceiling protocol
pub(super) fn ceiling_release(
    ctx: &mut SchedContext,
    resource: ResourceId,
) -> SchedResult<Option<Pid>> {
    release_resetting_waiter(ctx, resource)
}

/// Release under the priority inheritance protocol
pub(super) fn inheritance_release(
    ctx: &mut SchedContext,
    resource: ResourceId,
) -> SchedResult<Option<Pid>> {
    release_resetting_waiter(ctx, resource)
}

/// Shared PCP/PIP release. The promoted waiter drops back to its base
/// priority. The releasing owner keeps whatever elevation it has unless
/// `restore_priority_on_release` is set and this was its last resource.
fn release_resetting_waiter(
    ctx: &mut SchedContext,
    resource: ResourceId,
) -> SchedResult<Option<Pid>> {
    let owner = ctx.disown(resource)?;

    if ctx.restore_priority_on_release {
        if ctx.resources.held_by(owner).is_empty() {
            ctx.reset_priority(owner)?;
        }
    } else if ctx.process(owner).is_some_and(|p| p.is_elevated()) {
        debug!(owner, resource, "Owner keeps elevated priority after release");
    }

    let Some(waiter) = ctx.take_top_waiter(resource)? else {
        return Ok(None);
    };
    ctx.reset_priority(waiter)?;
    ctx.wake(waiter)?;
    Ok(Some(waiter))
}
