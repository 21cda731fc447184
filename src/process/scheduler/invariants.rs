/*!
 * Invariant Checker
 * Cross-structure consistency checks run between ticks
 */

use super::Scheduler;
use crate::core::errors::{SchedResult, SchedulerError};
use crate::core::types::Pid;
use crate::process::types::ProcessState;
use ahash::AHashMap;

/// Where a PID was found while walking the queues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Ready,
    Waiting(usize),
}

fn violation(message: String) -> SchedulerError {
    SchedulerError::InvariantViolation(message)
}

impl Scheduler {
    /// Verify that queues, states and ownership agree
    ///
    /// Every live process is in at most one of the ready queue and the wait
    /// lists, its state matches where it sits, at most one process is
    /// running, and every owner is a live process.
    pub fn check_invariants(&self) -> SchedResult<()> {
        let ctx = &self.ctx;
        let mut seen: AHashMap<Pid, Membership> = AHashMap::with_capacity(ctx.processes.len());

        let mut record = |pid: Pid, at: Membership| -> SchedResult<()> {
            match seen.insert(pid, at) {
                Some(previous) => Err(violation(format!(
                    "process {pid} queued twice ({previous:?} and {at:?})"
                ))),
                None => Ok(()),
            }
        };
        for pid in ctx.ready.iter() {
            record(pid, Membership::Ready)?;
        }
        for resource in ctx.resources.iter() {
            for pid in resource.waitqueue.iter() {
                record(pid, Membership::Waiting(resource.id))?;
            }
        }

        let mut running = 0usize;
        for process in ctx.processes.iter() {
            let pid = process.pid;
            let at = seen.remove(&pid);
            match (process.state, at) {
                (ProcessState::Ready, Some(Membership::Ready)) => {}
                (ProcessState::Blocked, Some(Membership::Waiting(_))) => {}
                (ProcessState::Running, None) => {
                    running += 1;
                    if ctx.current != Some(pid) {
                        return Err(violation(format!(
                            "process {pid} running but current is {:?}",
                            ctx.current
                        )));
                    }
                }
                (ProcessState::Terminated, None) => {}
                (state, at) => {
                    return Err(violation(format!(
                        "process {pid} is {state:?} but queued at {at:?}"
                    )));
                }
            }

            if process.age > process.lifespan {
                return Err(violation(format!(
                    "process {pid} aged {} past lifespan {}",
                    process.age, process.lifespan
                )));
            }
            if process.priority > ctx.max_prio {
                return Err(violation(format!(
                    "process {pid} priority {} above ceiling {}",
                    process.priority, ctx.max_prio
                )));
            }
            if !self.policy.mutates_priority() && process.priority != process.base_priority {
                return Err(violation(format!(
                    "process {pid} priority {} drifted from base {} under {}",
                    process.priority, process.base_priority, self.policy
                )));
            }
        }

        if running > 1 {
            return Err(violation(format!("{running} processes running at once")));
        }
        if let Some((pid, at)) = seen.into_iter().next() {
            return Err(violation(format!(
                "reaped process {pid} still queued at {at:?}"
            )));
        }

        for resource in ctx.resources.iter() {
            if let Some(owner) = resource.owner {
                if ctx.processes.get(owner).is_none() {
                    return Err(violation(format!(
                        "resource {} owned by reaped process {owner}",
                        resource.id
                    )));
                }
            }
        }
        Ok(())
    }
}
