/*!
 * Scheduling Policies
 * Pick rules for the eight policies and their callback dispatch
 */

use super::context::SchedContext;
use super::protocol;
use super::traits::PolicyOps;
use crate::core::errors::SchedResult;
use crate::core::types::{Pid, ResourceId};
use crate::process::types::SchedulingPolicy;
use tracing::{debug, info};

impl PolicyOps for SchedulingPolicy {
    fn name(&self) -> String {
        self.to_string()
    }

    fn initialize(&self, ctx: &mut SchedContext) -> SchedResult<()> {
        info!(
            policy = %self,
            resources = ctx.resources().len(),
            max_prio = ctx.max_prio(),
            "Scheduling policy initialized"
        );
        Ok(())
    }

    fn finalize(&self, ctx: &mut SchedContext) {
        info!(
            policy = %self,
            remaining = ctx.processes().len(),
            "Scheduling policy finalized"
        );
    }

    fn schedule(&self, ctx: &mut SchedContext) -> Option<Pid> {
        match self {
            SchedulingPolicy::Fcfs => fcfs(ctx),
            SchedulingPolicy::Sjf => sjf(ctx),
            SchedulingPolicy::Stcf => stcf(ctx),
            SchedulingPolicy::RoundRobin => round_robin(ctx),
            SchedulingPolicy::Priority
            | SchedulingPolicy::PriorityCeiling
            | SchedulingPolicy::PriorityInheritance => priority(ctx),
            SchedulingPolicy::PriorityAging => priority_aging(ctx),
        }
    }

    fn acquire(&self, ctx: &mut SchedContext, resource: ResourceId) -> SchedResult<bool> {
        match self {
            SchedulingPolicy::PriorityCeiling => protocol::ceiling_acquire(ctx, resource),
            SchedulingPolicy::PriorityInheritance => protocol::inheritance_acquire(ctx, resource),
            _ => protocol::default_acquire(ctx, resource),
        }
    }

    fn release(&self, ctx: &mut SchedContext, resource: ResourceId) -> SchedResult<Option<Pid>> {
        match self {
            SchedulingPolicy::Fcfs
            | SchedulingPolicy::Sjf
            | SchedulingPolicy::Stcf
            | SchedulingPolicy::RoundRobin => protocol::default_release(ctx, resource),
            SchedulingPolicy::Priority | SchedulingPolicy::PriorityAging => {
                protocol::priority_release(ctx, resource)
            }
            SchedulingPolicy::PriorityCeiling => protocol::ceiling_release(ctx, resource),
            SchedulingPolicy::PriorityInheritance => protocol::inheritance_release(ctx, resource),
        }
    }
}

/// Keep the previous process until it blocks or finishes, then take the
/// ready-queue head
fn fcfs(ctx: &mut SchedContext) -> Option<Pid> {
    if let Some(pid) = ctx.runnable_current() {
        return Some(pid);
    }
    ctx.ready.pop_front()
}

/// Non-preemptive; a new pick takes the shortest lifespan
fn sjf(ctx: &mut SchedContext) -> Option<Pid> {
    if let Some(pid) = ctx.runnable_current() {
        return Some(pid);
    }
    let processes = &ctx.processes;
    let index = ctx
        .ready
        .min_position_by_key(|pid| processes.get(pid).map_or(u64::MAX, |p| p.lifespan))?;
    ctx.take_ready(index)
}

/// Preemptive shortest remaining time. The ready queue is rescanned on
/// every call so processes forked since the last tick are considered.
fn stcf(ctx: &mut SchedContext) -> Option<Pid> {
    let processes = &ctx.processes;
    let remaining = |pid: Pid| processes.get(pid).map_or(u64::MAX, |p| p.remaining());
    let shortest = ctx.ready.min_position_by_key(remaining);

    match (ctx.runnable_current(), shortest) {
        (Some(current), Some(index)) => {
            let candidate = ctx.ready.get(index)?;
            let current_left = ctx.process(current).map_or(0, |p| p.remaining());
            let candidate_left = ctx.process(candidate).map_or(u64::MAX, |p| p.remaining());
            if candidate_left < current_left {
                debug!(
                    preempted = current,
                    next = candidate,
                    current_left,
                    candidate_left,
                    "Shorter job preempts running process"
                );
                let next = ctx.take_ready(index);
                ctx.requeue(current);
                next
            } else {
                Some(current)
            }
        }
        (Some(current), None) => Some(current),
        (None, Some(index)) => ctx.take_ready(index),
        (None, None) => None,
    }
}

/// One tick quantum: requeue the previous process, take the head
fn round_robin(ctx: &mut SchedContext) -> Option<Pid> {
    if let Some(pid) = ctx.runnable_current() {
        ctx.requeue(pid);
    }
    ctx.ready.pop_front()
}

/// Requeue the previous process, take the first highest priority
fn priority(ctx: &mut SchedContext) -> Option<Pid> {
    if let Some(pid) = ctx.runnable_current() {
        ctx.requeue(pid);
    }
    take_highest_priority(ctx)
}

/// Priority with aging: everyone waiting gains one level (saturating below
/// the ceiling) before the pick, and the winner spends its credit
fn priority_aging(ctx: &mut SchedContext) -> Option<Pid> {
    if let Some(pid) = ctx.runnable_current() {
        ctx.requeue(pid);
    }

    let limit = ctx.max_prio.saturating_sub(1);
    for pid in ctx.ready.iter() {
        if let Some(process) = ctx.processes.get_mut(pid) {
            if process.priority < limit {
                process.priority += 1;
            }
        }
    }

    let next = take_highest_priority(ctx)?;
    if let Some(process) = ctx.processes.get_mut(next) {
        process.reset_priority();
    }
    Some(next)
}

fn take_highest_priority(ctx: &mut SchedContext) -> Option<Pid> {
    let processes = &ctx.processes;
    let index = ctx
        .ready
        .max_position_by_key(|pid| processes.get(pid).map_or(0, |p| p.priority))?;
    ctx.take_ready(index)
}
